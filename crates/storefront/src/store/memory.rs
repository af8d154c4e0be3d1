//! In-memory document store for tests.
//!
//! Mirrors the HTTP store's semantics closely enough that the services can
//! be exercised without a network: server-assigned ids, merge updates,
//! field-equality queries, and change-driven subscriptions.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use rand::Rng;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};

use super::{Document, DocumentStore, StoreError, Subscription};

const SNAPSHOT_CHANNEL_CAPACITY: usize = 16;

type Collections = HashMap<String, BTreeMap<String, Value>>;

/// In-memory [`DocumentStore`] implementation.
#[derive(Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

struct Shared {
    collections: RwLock<Collections>,
    // Carries the name of the mutated collection.
    changes: broadcast::Sender<String>,
}

impl Default for Shared {
    fn default() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            changes: broadcast::channel(64).0,
        }
    }
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Collections> {
        // Lock poisoning only happens after a panic in another test thread.
        self.shared
            .collections
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Collections> {
        self.shared
            .collections
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn notify(&self, collection: &str) {
        let _ = self.shared.changes.send(collection.to_owned());
    }

    fn query_now(&self, collection: &str, field: &str, value: &Value) -> Vec<Document> {
        self.read()
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, data)| data.get(field) == Some(value))
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn random_id() -> String {
        let mut rng = rand::rng();
        (0..20).fold(String::new(), |mut id, _| {
            let _ = write!(id, "{:x}", rng.random_range(0..16));
            id
        })
    }
}

fn merge_into(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                target.insert(key, value);
            }
        }
        (target, patch) => *target = patch,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .read()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document {
                id: id.to_owned(),
                data: data.clone(),
            }))
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        self.write()
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), data);
        self.notify(collection);
        Ok(())
    }

    async fn create(&self, collection: &str, data: Value) -> Result<String, StoreError> {
        let id = Self::random_id();
        self.write()
            .entry(collection.to_owned())
            .or_default()
            .insert(id.clone(), data);
        self.notify(collection);
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        {
            let mut collections = self.write();
            let doc = collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or(StoreError::Status {
                    status: 404,
                    message: format!("no document {collection}/{id}"),
                })?;
            merge_into(doc, data);
        }
        self.notify(collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        if let Some(docs) = self.write().get_mut(collection) {
            docs.remove(id);
        }
        self.notify(collection);
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .read()
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> Result<Vec<Document>, StoreError> {
        Ok(self.query_now(collection, field, &value))
    }

    async fn subscribe(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> Result<Subscription, StoreError> {
        let (tx, rx) = mpsc::channel(SNAPSHOT_CHANNEL_CAPACITY);
        let store = self.clone();
        let mut changes = self.shared.changes.subscribe();
        let collection = collection.to_owned();
        let field = field.to_owned();

        let task = tokio::spawn(async move {
            let mut last = store.query_now(&collection, &field, &value);
            if tx.send(last.clone()).await.is_err() {
                return;
            }

            loop {
                match changes.recv().await {
                    Ok(changed) if changed == collection => {
                        let docs = store.query_now(&collection, &field, &value);
                        if docs != last {
                            last = docs.clone();
                            if tx.send(docs).await.is_err() {
                                return;
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => {
                        // Missed notifications; re-query to catch up.
                        let docs = store.query_now(&collection, &field, &value);
                        if docs != last {
                            last = docs.clone();
                            if tx.send(docs).await.is_err() {
                                return;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                }
            }
        });

        Ok(Subscription::new(rx, task))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryStore::new();
        store
            .set("Product", "p1", json!({"productName": "Shirt"}))
            .await
            .unwrap();

        let doc = store.get("Product", "p1").await.unwrap().unwrap();
        assert_eq!(doc.data["productName"], "Shirt");

        store.delete("Product", "p1").await.unwrap();
        assert!(store.get("Product", "p1").await.unwrap().is_none());

        // Deleting again is not an error.
        store.delete("Product", "p1").await.unwrap();
    }

    #[tokio::test]
    async fn test_create_assigns_distinct_ids() {
        let store = MemoryStore::new();
        let a = store.create("Bill", json!({"n": 1})).await.unwrap();
        let b = store.create("Bill", json!({"n": 2})).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.list("Bill").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryStore::new();
        store
            .set("Order", "o1", json!({"quantity": 1, "status": "pending"}))
            .await
            .unwrap();
        store
            .update("Order", "o1", json!({"quantity": 3}))
            .await
            .unwrap();

        let doc = store.get("Order", "o1").await.unwrap().unwrap();
        assert_eq!(doc.data["quantity"], 3);
        assert_eq!(doc.data["status"], "pending");
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let store = MemoryStore::new();
        let err = store.update("Order", "nope", json!({})).await.unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_query_eq_filters_by_field() {
        let store = MemoryStore::new();
        store
            .set("Order", "o1", json!({"userId": "u1"}))
            .await
            .unwrap();
        store
            .set("Order", "o2", json!({"userId": "u2"}))
            .await
            .unwrap();

        let docs = store
            .query_eq("Order", "userId", json!("u1"))
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs.first().map(|d| d.id.as_str()), Some("o1"));
    }

    #[tokio::test]
    async fn test_subscription_emits_initial_and_change() {
        let store = MemoryStore::new();
        let mut sub = store
            .subscribe("Order", "userId", json!("u1"))
            .await
            .unwrap();

        let initial = sub.recv().await.unwrap();
        assert!(initial.is_empty());

        store
            .set("Order", "o1", json!({"userId": "u1"}))
            .await
            .unwrap();
        let next = sub.recv().await.unwrap();
        assert_eq!(next.len(), 1);
    }
}
