//! Address autocomplete via a hosted places search.
//!
//! Suggestions are a typing convenience, so this client is infallible:
//! missing configuration, transport failures, and malformed responses all
//! degrade to an empty suggestion list with a warning in the logs. The
//! address field stays free-form either way.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;

use crate::config::PlacesConfig;

/// Client for the places search API.
#[derive(Clone)]
pub struct PlacesClient {
    inner: Arc<PlacesClientInner>,
}

struct PlacesClientInner {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    places: Vec<Place>,
}

#[derive(Deserialize)]
struct Place {
    title: String,
}

impl PlacesClient {
    /// Create a places client. Without an API key the client is disabled
    /// and every query returns no suggestions.
    #[must_use]
    pub fn new(config: &PlacesConfig) -> Self {
        Self {
            inner: Arc::new(PlacesClientInner {
                client: reqwest::Client::new(),
                endpoint: config.endpoint.clone(),
                api_key: config
                    .api_key
                    .as_ref()
                    .map(|key| key.expose_secret().to_owned()),
            }),
        }
    }

    /// Suggest addresses for a partial query. Never fails.
    pub async fn suggest(&self, query: &str) -> Vec<String> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let Some(api_key) = &self.inner.api_key else {
            tracing::debug!("Places API key not configured, skipping suggestions");
            return Vec::new();
        };

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header("X-API-KEY", api_key)
            .json(&json!({ "q": query }))
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(error = %err, "Places request failed");
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Places API returned non-success status");
            return Vec::new();
        }

        match response.json::<PlacesResponse>().await {
            Ok(body) => body.places.into_iter().map(|p| p.title).collect(),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to parse places response");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled_client() -> PlacesClient {
        PlacesClient::new(&PlacesConfig {
            endpoint: "https://places.invalid/search".to_owned(),
            api_key: None,
        })
    }

    #[tokio::test]
    async fn test_blank_query_returns_nothing() {
        assert!(disabled_client().suggest("   ").await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_api_key_disables_suggestions() {
        assert!(disabled_client().suggest("12 Elm").await.is_empty());
    }

    #[test]
    fn test_parses_place_titles() {
        let body: PlacesResponse = serde_json::from_str(
            r#"{"places": [{"title": "12 Elm St", "rating": 4.5}, {"title": "12 Elmwood Ave"}]}"#,
        )
        .unwrap_or_else(|_| PlacesResponse { places: vec![] });
        let titles: Vec<String> = body.places.into_iter().map(|p| p.title).collect();
        assert_eq!(titles, ["12 Elm St", "12 Elmwood Ave"]);
    }
}
