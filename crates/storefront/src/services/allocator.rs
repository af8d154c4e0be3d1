//! Sequential display-id allocation.
//!
//! Users and cart lines carry small human-readable integer ids minted from
//! counter documents in the store. Allocation is read-increment-write with
//! no transaction, matching the store's capabilities: two concurrent
//! allocations against the same counter can observe the same value and mint
//! a duplicate. Callers treat these ids as display identifiers, not
//! uniqueness guarantees.

use std::sync::Arc;

use serde_json::json;

use crate::store::{DocumentStore, StoreError, collections};

/// Location of a counter document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterRef {
    /// Collection holding the counter document.
    pub collection: &'static str,
    /// Counter document id.
    pub id: &'static str,
}

/// Counter for user display ids.
pub const USER_COUNTER: CounterRef = CounterRef {
    collection: collections::COUNTERS,
    id: "UserCounter",
};

/// Counter for cart line display ids. Lives alongside the cart lines
/// themselves, a layout inherited from the original data.
pub const ORDER_COUNTER: CounterRef = CounterRef {
    collection: collections::ORDER,
    id: "metadata",
};

const CURRENT_ID: &str = "currentId";

/// Allocates sequential ids from counter documents.
#[derive(Clone)]
pub struct SequentialIdAllocator {
    store: Arc<dyn DocumentStore>,
}

impl SequentialIdAllocator {
    /// Create an allocator over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Allocate the next id from a counter.
    ///
    /// A missing counter document is initialized to 1 and 1 is returned;
    /// otherwise the stored value is incremented and written back.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the counter document cannot be read or
    /// written, or holds a non-integer `currentId`.
    pub async fn allocate(&self, counter: CounterRef) -> Result<i64, StoreError> {
        let existing = self.store.get(counter.collection, counter.id).await?;

        let next = match existing {
            None => 1,
            Some(doc) => {
                let current = doc
                    .data
                    .get(CURRENT_ID)
                    .and_then(serde_json::Value::as_i64)
                    .ok_or_else(|| StoreError::Decode(serde::de::Error::custom(format!(
                        "counter {}/{} has no integer {CURRENT_ID}",
                        counter.collection, counter.id
                    ))))?;
                current + 1
            }
        };

        self.store
            .set(counter.collection, counter.id, json!({ CURRENT_ID: next }))
            .await?;

        Ok(next)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::store::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_missing_counter_initializes_to_one() {
        let store = Arc::new(MemoryStore::new());
        let allocator = SequentialIdAllocator::new(store.clone());

        assert_eq!(allocator.allocate(USER_COUNTER).await.unwrap(), 1);

        let doc = store
            .get(USER_COUNTER.collection, USER_COUNTER.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.data["currentId"], 1);
    }

    #[tokio::test]
    async fn test_allocations_increment() {
        let allocator = SequentialIdAllocator::new(Arc::new(MemoryStore::new()));

        assert_eq!(allocator.allocate(ORDER_COUNTER).await.unwrap(), 1);
        assert_eq!(allocator.allocate(ORDER_COUNTER).await.unwrap(), 2);
        assert_eq!(allocator.allocate(ORDER_COUNTER).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_counters_are_independent() {
        let allocator = SequentialIdAllocator::new(Arc::new(MemoryStore::new()));

        assert_eq!(allocator.allocate(USER_COUNTER).await.unwrap(), 1);
        assert_eq!(allocator.allocate(ORDER_COUNTER).await.unwrap(), 1);
        assert_eq!(allocator.allocate(USER_COUNTER).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_non_integer_counter_is_an_error() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                USER_COUNTER.collection,
                USER_COUNTER.id,
                serde_json::json!({ "currentId": "seven" }),
            )
            .await
            .unwrap();

        let allocator = SequentialIdAllocator::new(store);
        assert!(allocator.allocate(USER_COUNTER).await.is_err());
    }
}
