//! Document store access.
//!
//! The catalog, carts, user profiles, and bills all live in a hosted
//! document database exposed over HTTP. [`DocumentStore`] is the seam:
//! production uses [`HttpStore`], tests use [`MemoryStore`].

mod http;
mod memory;

pub use http::HttpStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Well-known collection names.
pub mod collections {
    /// Catalog products.
    pub const PRODUCT: &str = "Product";
    /// Catalog categories.
    pub const CATEGORY: &str = "Category";
    /// User profiles, keyed by sequential display id.
    pub const USER: &str = "User";
    /// Pending cart lines (plus the order counter document).
    pub const ORDER: &str = "Order";
    /// Finalized bills.
    pub const BILL: &str = "Bill";
    /// Counter documents for sequential id allocation.
    pub const COUNTERS: &str = "Counters";
}

/// A document fetched from the store: its id within the collection plus its
/// JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document id within its collection.
    pub id: String,
    /// Document body.
    pub data: Value,
}

impl Document {
    /// Deserialize the document body into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] if the body does not match `T`.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(self.data.clone()).map_err(StoreError::Decode)
    }
}

/// Errors returned by document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// HTTP transport error.
    #[error("Store HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the request.
    #[error("Store returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        message: String,
    },

    /// Rate limited. Contains the suggested retry delay in seconds.
    #[error("Store rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// A document body could not be decoded.
    #[error("Failed to decode store document: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Handle to a live collection subscription.
///
/// Each message is the full current result set for the subscribed query.
/// Dropping the handle tears down the underlying watch task, so the store
/// stops polling or listening as soon as the consumer goes away.
pub struct Subscription {
    rx: mpsc::Receiver<Vec<Document>>,
    _guard: AbortOnDrop,
}

impl Subscription {
    pub(crate) fn new(rx: mpsc::Receiver<Vec<Document>>, task: JoinHandle<()>) -> Self {
        Self {
            rx,
            _guard: AbortOnDrop(task),
        }
    }

    /// Wait for the next snapshot. Returns `None` once the store side closes.
    pub async fn recv(&mut self) -> Option<Vec<Document>> {
        self.rx.recv().await
    }
}

struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Backend-agnostic document store interface.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a single document, or `None` if it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Create or fully replace a document at a caller-chosen id.
    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError>;

    /// Create a document with a store-assigned id. Returns the new id.
    async fn create(&self, collection: &str, data: Value) -> Result<String, StoreError>;

    /// Merge fields into an existing document.
    async fn update(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError>;

    /// Delete a document. Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// List every document in a collection.
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Fetch documents whose `field` equals `value`.
    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> Result<Vec<Document>, StoreError>;

    /// Subscribe to an equality query. The subscription emits the current
    /// result set immediately and again after every observed change.
    async fn subscribe(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> Result<Subscription, StoreError>;

    /// Connectivity check, used by the readiness probe.
    async fn ping(&self) -> Result<(), StoreError>;
}
