//! HTTP client for the hosted document store.
//!
//! The store exposes a small document-oriented REST API:
//!
//! - `GET    /v1/{collection}` - list a collection
//! - `GET    /v1/{collection}/{id}` - fetch one document
//! - `PUT    /v1/{collection}/{id}` - create or replace
//! - `POST   /v1/{collection}` - create with a server-assigned id
//! - `PATCH  /v1/{collection}/{id}` - merge fields
//! - `DELETE /v1/{collection}/{id}` - delete
//! - `POST   /v1/{collection}:query` - field-equality query
//! - `GET    /v1/ping` - connectivity check
//!
//! The store has no push channel, so [`DocumentStore::subscribe`] is
//! implemented as a polling loop that re-runs the query and emits a snapshot
//! whenever the result set changes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::mpsc;

use crate::config::StoreConfig;

use super::{Document, DocumentStore, StoreError, Subscription};

const POLL_INTERVAL: Duration = Duration::from_secs(2);
const SNAPSHOT_CHANNEL_CAPACITY: usize = 16;

/// Client for the hosted document store.
#[derive(Clone)]
pub struct HttpStore {
    inner: Arc<HttpStoreInner>,
}

struct HttpStoreInner {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Deserialize)]
struct StoredDocument {
    id: String,
    data: Value,
}

#[derive(Deserialize)]
struct CreatedDocument {
    id: String,
}

impl From<StoredDocument> for Document {
    fn from(doc: StoredDocument) -> Self {
        Self {
            id: doc.id,
            data: doc.data,
        }
    }
}

impl HttpStore {
    /// Create a new store client.
    #[must_use]
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            inner: Arc::new(HttpStoreInner {
                client: reqwest::Client::new(),
                endpoint: config.endpoint.trim_end_matches('/').to_owned(),
                api_key: config.api_key.expose_secret().to_owned(),
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.inner.endpoint)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.inner
            .client
            .request(method, self.url(path))
            .bearer_auth(&self.inner.api_key)
    }

    /// Send a request and decode the response body, with shared handling for
    /// rate limits and non-success statuses.
    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, StoreError> {
        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(StoreError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Document store returned non-success status"
            );
            return Err(StoreError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(StoreError::Decode)
    }

    /// Like [`Self::execute`] but for endpoints with no response body.
    async fn execute_empty(&self, request: reqwest::RequestBuilder) -> Result<(), StoreError> {
        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(StoreError::RateLimited(retry_after));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Document store returned non-success status"
            );
            return Err(StoreError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for HttpStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let response = self
            .request(reqwest::Method::GET, &format!("{collection}/{id}"))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let doc: StoredDocument = serde_json::from_str(&body)?;
        Ok(Some(doc.into()))
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        self.execute_empty(
            self.request(reqwest::Method::PUT, &format!("{collection}/{id}"))
                .json(&data),
        )
        .await
    }

    async fn create(&self, collection: &str, data: Value) -> Result<String, StoreError> {
        let created: CreatedDocument = self
            .execute(self.request(reqwest::Method::POST, collection).json(&data))
            .await?;
        Ok(created.id)
    }

    async fn update(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        self.execute_empty(
            self.request(reqwest::Method::PATCH, &format!("{collection}/{id}"))
                .json(&data),
        )
        .await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.execute_empty(self.request(reqwest::Method::DELETE, &format!("{collection}/{id}")))
            .await
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let docs: Vec<StoredDocument> = self
            .execute(self.request(reqwest::Method::GET, collection))
            .await?;
        Ok(docs.into_iter().map(Into::into).collect())
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> Result<Vec<Document>, StoreError> {
        let docs: Vec<StoredDocument> = self
            .execute(
                self.request(reqwest::Method::POST, &format!("{collection}:query"))
                    .json(&json!({ "field": field, "equals": value })),
            )
            .await?;
        Ok(docs.into_iter().map(Into::into).collect())
    }

    async fn subscribe(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> Result<Subscription, StoreError> {
        let (tx, rx) = mpsc::channel(SNAPSHOT_CHANNEL_CAPACITY);
        let store = self.clone();
        let collection = collection.to_owned();
        let field = field.to_owned();

        let task = tokio::spawn(async move {
            let mut last: Option<Vec<Document>> = None;
            loop {
                match store.query_eq(&collection, &field, value.clone()).await {
                    Ok(docs) => {
                        if last.as_ref() != Some(&docs) {
                            last = Some(docs.clone());
                            if tx.send(docs).await.is_err() {
                                return;
                            }
                        }
                    }
                    Err(err) => {
                        // Transient store errors keep the subscription alive.
                        tracing::warn!(error = %err, collection, "Subscription poll failed");
                    }
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        });

        Ok(Subscription::new(rx, task))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.execute_empty(self.request(reqwest::Method::GET, "ping"))
            .await
    }
}
