//! HTTP client for the hosted identity service.
//!
//! The service exposes a REST API keyed by an API key query parameter:
//!
//! - `POST /v1/accounts:signUp` - `{ email, password }` -> `{ localId }`
//! - `POST /v1/accounts:signInWithPassword` - same shape
//! - `POST /v1/accounts:sendOobCode` - `{ requestType: "PASSWORD_RESET", email }`
//!
//! Failures carry a machine-readable error code in the body, mapped here to
//! [`IdentityError`] variants.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use vestia_core::{Email, Uid};

use crate::config::IdentityConfig;

use super::{IdentityError, IdentityProvider};

/// Client for the hosted identity service.
#[derive(Clone)]
pub struct HttpIdentity {
    inner: Arc<HttpIdentityInner>,
}

struct HttpIdentityInner {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl HttpIdentity {
    /// Create a new identity client.
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            inner: Arc::new(HttpIdentityInner {
                client: reqwest::Client::new(),
                endpoint: config.endpoint.trim_end_matches('/').to_owned(),
                api_key: config.api_key.expose_secret().to_owned(),
            }),
        }
    }

    async fn call(
        &self,
        operation: &str,
        body: serde_json::Value,
    ) -> Result<Option<AccountResponse>, IdentityError> {
        let url = format!(
            "{}/v1/accounts:{operation}?key={}",
            self.inner.endpoint, self.inner.api_key
        );

        let response = self.inner.client.post(url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let code = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}"));
            return Err(map_error_code(&code));
        }

        Ok(serde_json::from_str(&text).ok())
    }
}

/// Map the provider's error codes onto domain errors. Unknown codes are
/// passed through for the error layer to treat as server-class.
fn map_error_code(code: &str) -> IdentityError {
    // Codes may carry a suffix, e.g. "WEAK_PASSWORD : Password should be ...".
    let (head, detail) = match code.split_once(':') {
        Some((head, detail)) => (head.trim(), detail.trim()),
        None => (code.trim(), ""),
    };

    match head {
        "EMAIL_EXISTS" => IdentityError::EmailInUse,
        "EMAIL_NOT_FOUND" => IdentityError::UserNotFound,
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => IdentityError::InvalidCredentials,
        "WEAK_PASSWORD" => IdentityError::WeakPassword(if detail.is_empty() {
            "Password is too weak".to_owned()
        } else {
            detail.to_owned()
        }),
        _ => IdentityError::Provider(code.to_owned()),
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentity {
    async fn sign_up(&self, email: &Email, password: &str) -> Result<Uid, IdentityError> {
        let response = self
            .call(
                "signUp",
                json!({ "email": email.as_str(), "password": password }),
            )
            .await?
            .ok_or_else(|| IdentityError::Provider("missing signUp response body".to_owned()))?;
        Ok(Uid::new(response.local_id))
    }

    async fn sign_in(&self, email: &Email, password: &str) -> Result<Uid, IdentityError> {
        let response = self
            .call(
                "signInWithPassword",
                json!({ "email": email.as_str(), "password": password }),
            )
            .await?
            .ok_or_else(|| IdentityError::Provider("missing signIn response body".to_owned()))?;
        Ok(Uid::new(response.local_id))
    }

    async fn send_password_reset(&self, email: &Email) -> Result<(), IdentityError> {
        self.call(
            "sendOobCode",
            json!({ "requestType": "PASSWORD_RESET", "email": email.as_str() }),
        )
        .await?;
        Ok(())
    }
}
