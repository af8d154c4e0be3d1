//! Purchase history.

use std::collections::BTreeMap;
use std::sync::Arc;

use vestia_core::{Price, Uid};

use crate::models::Bill;
use crate::store::{DocumentStore, StoreError, collections};

/// One day of a user's purchase history.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDay {
    /// Day in `YYYY-MM-DD`.
    pub date: String,
    /// Sum of line totals for the day.
    pub day_total: Price,
    /// Bills for the day, newest first.
    pub bills: Vec<Bill>,
}

/// Read-side view over the `Bill` collection.
#[derive(Clone)]
pub struct PurchaseHistory {
    store: Arc<dyn DocumentStore>,
}

impl PurchaseHistory {
    /// Create a history reader over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// A user's bills grouped by calendar day, newest day first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails or a bill is malformed.
    pub async fn history(&self, uid: &Uid) -> Result<Vec<PurchaseDay>, StoreError> {
        let docs = self
            .store
            .query_eq(
                collections::BILL,
                "userId",
                serde_json::Value::String(uid.as_str().to_owned()),
            )
            .await?;

        let mut days: BTreeMap<String, Vec<Bill>> = BTreeMap::new();
        for doc in &docs {
            let bill = Bill::from_document(doc)?;
            let date = bill.timestamp.format("%Y-%m-%d").to_string();
            days.entry(date).or_default().push(bill);
        }

        Ok(days
            .into_iter()
            .rev()
            .map(|(date, mut bills)| {
                bills.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                let day_total = Price::sum(bills.iter().map(|b| b.total_price));
                PurchaseDay {
                    date,
                    day_total,
                    bills,
                }
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use crate::store::MemoryStore;

    use super::*;

    async fn seed_bill(store: &MemoryStore, uid: &str, total: &str, timestamp: &str) {
        store
            .create(
                collections::BILL,
                json!({
                    "userId": uid,
                    "username": "Ana",
                    "phone": "555-0101",
                    "address": "12 Elm St",
                    "productId": "p1",
                    "productName": "Shirt",
                    "price": "100",
                    "quantity": 1,
                    "totalPrice": total,
                    "batchTotal": total,
                    "timestamp": timestamp,
                }),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_history_groups_by_day_newest_first() {
        let store = Arc::new(MemoryStore::new());
        seed_bill(&store, "u1", "100", "2024-03-01T10:00:00Z").await;
        seed_bill(&store, "u1", "200", "2024-03-01T15:00:00Z").await;
        seed_bill(&store, "u1", "300", "2024-03-05T09:00:00Z").await;
        seed_bill(&store, "u2", "999", "2024-03-05T09:00:00Z").await;

        let history = PurchaseHistory::new(store).history(&Uid::new("u1")).await.unwrap();
        assert_eq!(history.len(), 2);

        let newest = history.first().unwrap();
        assert_eq!(newest.date, "2024-03-05");
        assert_eq!(newest.bills.len(), 1);

        let older = history.get(1).unwrap();
        assert_eq!(older.date, "2024-03-01");
        assert_eq!(older.day_total, Price::parse("300").unwrap());
        // Newest bill first within the day.
        assert_eq!(
            older.bills.first().unwrap().timestamp,
            Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_history_empty_for_new_user() {
        let store = Arc::new(MemoryStore::new());
        let history = PurchaseHistory::new(store).history(&Uid::new("u1")).await.unwrap();
        assert!(history.is_empty());
    }
}
