//! Checkout: turning pending cart lines into bills.
//!
//! Checkout is a two-step flow. [`CheckoutDraft::collect`] gathers the
//! user's pending lines and prefills the recipient from their profile; the
//! caller may then edit the recipient before calling
//! [`CheckoutDraft::confirm`], which writes one bill per line and deletes
//! the lines afterwards.
//!
//! Confirmation is sequential with no rollback: every bill is created
//! before any line is deleted, so a failure part-way leaves already-written
//! bills and the full cart in place rather than losing lines. Re-running
//! checkout after a partial failure can duplicate bills; support resolves
//! those from the shared batch timestamp.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use vestia_core::{Price, Uid};

use crate::models::{Bill, PendingOrder, Recipient, UserProfile};
use crate::store::{DocumentStore, StoreError, collections};

/// Errors returned by checkout operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// The cart has no pending lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// No profile exists for the user, so there is no default recipient.
    #[error("No profile found for this account")]
    ProfileNotFound,

    /// A requested line does not belong to this user's cart.
    #[error("Order not in cart: {0}")]
    OrderNotInCart(String),

    /// The recipient is missing required details.
    #[error("Recipient needs a name, phone, and address")]
    IncompleteRecipient,

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Receipt for a confirmed checkout.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    /// Ids of the created bills.
    pub bill_ids: Vec<String>,
    /// Number of lines billed.
    pub line_count: usize,
    /// Total across the batch.
    pub batch_total: Price,
    /// Shared batch timestamp.
    pub timestamp: DateTime<Utc>,
}

/// A checkout in progress: the lines being bought plus the recipient.
#[derive(Debug, Clone)]
pub struct CheckoutDraft {
    uid: Uid,
    orders: Vec<PendingOrder>,
    recipient: Recipient,
    batch_total: Price,
}

impl CheckoutDraft {
    /// Gather a user's pending lines into a draft.
    ///
    /// With `order_ids = None` the whole cart is collected; otherwise only
    /// the named lines, which must all be in the cart. The recipient is
    /// prefilled from the user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if nothing is collected,
    /// [`CheckoutError::ProfileNotFound`] if the user has no profile, and
    /// [`CheckoutError::OrderNotInCart`] for an id outside the cart.
    pub async fn collect(
        store: &Arc<dyn DocumentStore>,
        uid: &Uid,
        order_ids: Option<&[String]>,
    ) -> Result<Self, CheckoutError> {
        let docs = store
            .query_eq(
                collections::ORDER,
                "userId",
                serde_json::Value::String(uid.as_str().to_owned()),
            )
            .await?;
        let mut orders = docs
            .iter()
            .map(PendingOrder::from_document)
            .collect::<Result<Vec<_>, _>>()?;
        orders.retain(|o| o.status.is_pending());

        if let Some(ids) = order_ids {
            for id in ids {
                if !orders.iter().any(|o| &o.id == id) {
                    return Err(CheckoutError::OrderNotInCart(id.clone()));
                }
            }
            orders.retain(|o| ids.contains(&o.id));
        }

        if orders.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let profile = load_profile(store, uid)
            .await?
            .ok_or(CheckoutError::ProfileNotFound)?;
        let recipient = Recipient {
            username: profile.username,
            phone: profile.phone,
            address: profile.address,
        };

        let batch_total = Price::sum(orders.iter().map(|o| o.total_price));

        Ok(Self {
            uid: uid.clone(),
            orders,
            recipient,
            batch_total,
        })
    }

    /// The lines in this draft.
    #[must_use]
    pub fn orders(&self) -> &[PendingOrder] {
        &self.orders
    }

    /// The current recipient.
    #[must_use]
    pub const fn recipient(&self) -> &Recipient {
        &self.recipient
    }

    /// Total across the draft.
    #[must_use]
    pub const fn batch_total(&self) -> Price {
        self.batch_total
    }

    /// Replace the recipient with delivery details for this batch only.
    /// The stored profile is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::IncompleteRecipient`] if any field is blank.
    pub fn edit_recipient(&mut self, recipient: Recipient) -> Result<(), CheckoutError> {
        if recipient.username.trim().is_empty()
            || recipient.phone.trim().is_empty()
            || recipient.address.trim().is_empty()
        {
            return Err(CheckoutError::IncompleteRecipient);
        }
        self.recipient = recipient;
        Ok(())
    }

    /// Confirm the checkout: write one bill per line, then delete the lines.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::IncompleteRecipient`] if the recipient was
    /// never filled in, and [`CheckoutError::Store`] on the first failed
    /// write or delete. No rollback is attempted.
    pub async fn confirm(
        self,
        store: &Arc<dyn DocumentStore>,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        if self.recipient.username.trim().is_empty()
            || self.recipient.phone.trim().is_empty()
            || self.recipient.address.trim().is_empty()
        {
            return Err(CheckoutError::IncompleteRecipient);
        }

        let timestamp = Utc::now();
        let mut bill_ids = Vec::with_capacity(self.orders.len());

        for order in &self.orders {
            let bill = Bill::from_order(order, &self.recipient, self.batch_total, timestamp);
            let id = store
                .create(
                    collections::BILL,
                    serde_json::to_value(&bill).map_err(StoreError::Decode)?,
                )
                .await?;
            bill_ids.push(id);
        }

        for order in &self.orders {
            store.delete(collections::ORDER, &order.id).await?;
        }

        tracing::info!(
            uid = %self.uid,
            lines = self.orders.len(),
            total = %self.batch_total,
            "Checkout confirmed"
        );

        Ok(CheckoutReceipt {
            line_count: bill_ids.len(),
            bill_ids,
            batch_total: self.batch_total,
            timestamp,
        })
    }
}

async fn load_profile(
    store: &Arc<dyn DocumentStore>,
    uid: &Uid,
) -> Result<Option<UserProfile>, StoreError> {
    let docs = store
        .query_eq(
            collections::USER,
            "uid",
            serde_json::Value::String(uid.as_str().to_owned()),
        )
        .await?;
    docs.first().map(|doc| doc.decode()).transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use crate::services::orders::OrderService;
    use crate::store::{Document, MemoryStore, Subscription};

    use super::*;

    async fn seeded(uid: &Uid) -> (Arc<dyn DocumentStore>, OrderService) {
        let memory = Arc::new(MemoryStore::new());
        memory
            .set(
                collections::PRODUCT,
                "p1",
                json!({ "productName": "Shirt", "price": "100000", "priceUnit": "VND" }),
            )
            .await
            .unwrap();
        memory
            .set(
                collections::USER,
                "1",
                json!({
                    "uid": uid.as_str(),
                    "username": "Ana",
                    "email": "ana@example.com",
                    "phone": "555-0101",
                    "address": "12 Elm St",
                    "createdAt": "2024-03-01T10:00:00Z",
                }),
            )
            .await
            .unwrap();

        let store: Arc<dyn DocumentStore> = memory;
        let orders = OrderService::new(store.clone());
        (store, orders)
    }

    #[tokio::test]
    async fn test_collect_prefills_recipient_and_total() {
        let uid = Uid::new("u1");
        let (store, orders) = seeded(&uid).await;
        orders.add_to_cart(&uid, "p1", "M", 2).await.unwrap();

        let draft = CheckoutDraft::collect(&store, &uid, None).await.unwrap();
        assert_eq!(draft.recipient().username, "Ana");
        assert_eq!(draft.batch_total(), Price::parse("200000").unwrap());
        assert_eq!(draft.orders().len(), 1);
    }

    #[tokio::test]
    async fn test_collect_empty_cart_fails() {
        let uid = Uid::new("u1");
        let (store, _orders) = seeded(&uid).await;
        assert!(matches!(
            CheckoutDraft::collect(&store, &uid, None).await,
            Err(CheckoutError::EmptyCart)
        ));
    }

    #[tokio::test]
    async fn test_collect_without_profile_fails() {
        let uid = Uid::new("u1");
        let (store, orders) = seeded(&uid).await;
        orders.add_to_cart(&uid, "p1", "M", 1).await.unwrap();
        store.delete(collections::USER, "1").await.unwrap();

        assert!(matches!(
            CheckoutDraft::collect(&store, &uid, None).await,
            Err(CheckoutError::ProfileNotFound)
        ));
    }

    #[tokio::test]
    async fn test_collect_rejects_foreign_order_id() {
        let uid = Uid::new("u1");
        let (store, orders) = seeded(&uid).await;
        orders.add_to_cart(&uid, "p1", "M", 1).await.unwrap();

        let ids = vec!["999".to_owned()];
        assert!(matches!(
            CheckoutDraft::collect(&store, &uid, Some(&ids)).await,
            Err(CheckoutError::OrderNotInCart(_))
        ));
    }

    #[tokio::test]
    async fn test_confirm_bills_every_line_then_empties_cart() {
        let uid = Uid::new("u1");
        let (store, orders) = seeded(&uid).await;
        orders.add_to_cart(&uid, "p1", "M", 2).await.unwrap();
        orders.add_to_cart(&uid, "p1", "S", 1).await.unwrap();

        let draft = CheckoutDraft::collect(&store, &uid, None).await.unwrap();
        let receipt = draft.confirm(&store).await.unwrap();
        assert_eq!(receipt.line_count, 2);
        assert_eq!(receipt.batch_total, Price::parse("300000").unwrap());

        let bills = store.list(collections::BILL).await.unwrap();
        assert_eq!(bills.len(), 2);
        for doc in &bills {
            let bill = Bill::from_document(doc).unwrap();
            assert_eq!(bill.batch_total, receipt.batch_total);
            assert_eq!(bill.timestamp, receipt.timestamp);
            assert_eq!(bill.username, "Ana");
        }

        assert!(orders.list_orders(&uid).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edited_recipient_stamped_on_bills_profile_untouched() {
        let uid = Uid::new("u1");
        let (store, orders) = seeded(&uid).await;
        orders.add_to_cart(&uid, "p1", "M", 1).await.unwrap();

        let mut draft = CheckoutDraft::collect(&store, &uid, None).await.unwrap();
        draft
            .edit_recipient(Recipient {
                username: "Ben".to_owned(),
                phone: "555-0202".to_owned(),
                address: "9 Oak Ave".to_owned(),
            })
            .unwrap();
        draft.confirm(&store).await.unwrap();

        let bills = store.list(collections::BILL).await.unwrap();
        let bill = Bill::from_document(bills.first().unwrap()).unwrap();
        assert_eq!(bill.username, "Ben");

        let profile = store
            .get(collections::USER, "1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.data["username"], "Ana");
    }

    #[tokio::test]
    async fn test_edit_recipient_rejects_blank_fields() {
        let uid = Uid::new("u1");
        let (store, orders) = seeded(&uid).await;
        orders.add_to_cart(&uid, "p1", "M", 1).await.unwrap();

        let mut draft = CheckoutDraft::collect(&store, &uid, None).await.unwrap();
        assert!(matches!(
            draft.edit_recipient(Recipient {
                username: "Ben".to_owned(),
                phone: " ".to_owned(),
                address: "9 Oak Ave".to_owned(),
            }),
            Err(CheckoutError::IncompleteRecipient)
        ));
    }

    /// Store wrapper that fails the k-th create.
    struct FlakyStore {
        inner: Arc<dyn DocumentStore>,
        fail_at: usize,
        creates: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl DocumentStore for FlakyStore {
        async fn get(&self, c: &str, id: &str) -> Result<Option<Document>, StoreError> {
            self.inner.get(c, id).await
        }
        async fn set(&self, c: &str, id: &str, d: serde_json::Value) -> Result<(), StoreError> {
            self.inner.set(c, id, d).await
        }
        async fn create(&self, c: &str, d: serde_json::Value) -> Result<String, StoreError> {
            let n = self
                .creates
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if n + 1 == self.fail_at {
                return Err(StoreError::Status {
                    status: 500,
                    message: "injected".to_owned(),
                });
            }
            self.inner.create(c, d).await
        }
        async fn update(&self, c: &str, id: &str, d: serde_json::Value) -> Result<(), StoreError> {
            self.inner.update(c, id, d).await
        }
        async fn delete(&self, c: &str, id: &str) -> Result<(), StoreError> {
            self.inner.delete(c, id).await
        }
        async fn list(&self, c: &str) -> Result<Vec<Document>, StoreError> {
            self.inner.list(c).await
        }
        async fn query_eq(
            &self,
            c: &str,
            f: &str,
            v: serde_json::Value,
        ) -> Result<Vec<Document>, StoreError> {
            self.inner.query_eq(c, f, v).await
        }
        async fn subscribe(
            &self,
            c: &str,
            f: &str,
            v: serde_json::Value,
        ) -> Result<Subscription, StoreError> {
            self.inner.subscribe(c, f, v).await
        }
        async fn ping(&self) -> Result<(), StoreError> {
            self.inner.ping().await
        }
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_cart_and_written_bills() {
        let uid = Uid::new("u1");
        let (store, orders) = seeded(&uid).await;
        orders.add_to_cart(&uid, "p1", "M", 1).await.unwrap();
        orders.add_to_cart(&uid, "p1", "S", 1).await.unwrap();
        orders.add_to_cart(&uid, "p1", "L", 1).await.unwrap();

        let flaky: Arc<dyn DocumentStore> = Arc::new(FlakyStore {
            inner: store.clone(),
            fail_at: 2,
            creates: std::sync::atomic::AtomicUsize::new(0),
        });

        let draft = CheckoutDraft::collect(&flaky, &uid, None).await.unwrap();
        assert!(draft.confirm(&flaky).await.is_err());

        // One bill was written before the failure; no line was deleted.
        assert_eq!(store.list(collections::BILL).await.unwrap().len(), 1);
        assert_eq!(orders.list_orders(&uid).await.unwrap().len(), 3);
    }
}
