//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::identity::IdentityError;
use crate::services::{AccountError, CheckoutError, OrderError};
use crate::store::StoreError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Document store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Identity provider operation failed.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Account operation failed.
    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    /// Cart operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Checkout operation failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn is_server_class(&self) -> bool {
        match self {
            Self::Internal(_) => true,
            Self::Store(err) => store_is_server_class(err),
            Self::Identity(err) => identity_is_server_class(err),
            Self::Account(err) => match err {
                AccountError::Store(e) => store_is_server_class(e),
                AccountError::Identity(e) => identity_is_server_class(e),
                _ => false,
            },
            Self::Order(err) => match err {
                OrderError::Store(e) => store_is_server_class(e),
                _ => false,
            },
            Self::Checkout(err) => match err {
                CheckoutError::Store(e) => store_is_server_class(e),
                _ => false,
            },
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(err) => store_status(err),
            Self::Identity(err) => identity_status(err),
            Self::Account(err) => match err {
                AccountError::UsernameRequired
                | AccountError::InvalidEmail(_)
                | AccountError::PasswordMismatch => StatusCode::BAD_REQUEST,
                AccountError::ProfileNotFound => StatusCode::NOT_FOUND,
                AccountError::BiometricNotEnrolled | AccountError::BiometricDenied => {
                    StatusCode::UNAUTHORIZED
                }
                AccountError::Identity(e) => identity_status(e),
                AccountError::Store(e) => store_status(e),
            },
            Self::Order(err) => match err {
                OrderError::SizeRequired | OrderError::InvalidQuantity => StatusCode::BAD_REQUEST,
                OrderError::ProductNotFound(_) | OrderError::OrderNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                OrderError::Store(e) => store_status(e),
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart
                | CheckoutError::IncompleteRecipient
                | CheckoutError::OrderNotInCart(_) => StatusCode::BAD_REQUEST,
                CheckoutError::ProfileNotFound => StatusCode::NOT_FOUND,
                CheckoutError::Store(e) => store_status(e),
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message. Internal details stay in the logs.
    fn message(&self) -> String {
        if let Self::Store(err) = self {
            return store_message(err);
        }
        if self.is_server_class() {
            return "Internal server error".to_string();
        }
        match self {
            Self::Identity(err) => identity_message(err),
            Self::Account(AccountError::Identity(err)) => identity_message(err),
            Self::Account(err) => err.to_string(),
            Self::Order(err) => err.to_string(),
            Self::Checkout(err) => err.to_string(),
            _ => self.to_string(),
        }
    }
}

fn store_is_server_class(err: &StoreError) -> bool {
    !matches!(err, StoreError::RateLimited(_))
}

fn store_message(err: &StoreError) -> String {
    match err {
        StoreError::RateLimited(_) => "Please try again shortly".to_string(),
        StoreError::Http(_) | StoreError::Status { .. } => "External service error".to_string(),
        StoreError::Decode(_) => "Internal server error".to_string(),
    }
}

const fn identity_is_server_class(err: &IdentityError) -> bool {
    matches!(err, IdentityError::Http(_) | IdentityError::Provider(_))
}

const fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        StoreError::Http(_) | StoreError::Status { .. } => StatusCode::BAD_GATEWAY,
        StoreError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

const fn identity_status(err: &IdentityError) -> StatusCode {
    match err {
        IdentityError::InvalidCredentials | IdentityError::UserNotFound => {
            StatusCode::UNAUTHORIZED
        }
        IdentityError::EmailInUse => StatusCode::CONFLICT,
        IdentityError::WeakPassword(_) => StatusCode::BAD_REQUEST,
        IdentityError::Http(_) | IdentityError::Provider(_) => StatusCode::BAD_GATEWAY,
    }
}

fn identity_message(err: &IdentityError) -> String {
    match err {
        // Same message for both so sign-in does not reveal which emails
        // have accounts.
        IdentityError::InvalidCredentials | IdentityError::UserNotFound => {
            "Invalid credentials".to_string()
        }
        IdentityError::EmailInUse => "An account with this email already exists".to_string(),
        IdentityError::WeakPassword(msg) => msg.clone(),
        IdentityError::Http(_) | IdentityError::Provider(_) => {
            "Authentication service error".to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_class() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = Json(json!({ "error": self.message() }));
        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a uid.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_errors_are_bad_request() {
        assert_eq!(
            get_status(AppError::Order(OrderError::SizeRequired)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::EmptyCart)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Account(AccountError::PasswordMismatch)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_credential_errors_are_unauthorized() {
        assert_eq!(
            get_status(AppError::Identity(IdentityError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Identity(IdentityError::UserNotFound)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Identity(IdentityError::EmailInUse)),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_sign_in_errors_share_a_message() {
        assert_eq!(
            identity_message(&IdentityError::InvalidCredentials),
            identity_message(&IdentityError::UserNotFound)
        );
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn test_store_transport_message_hides_internals() {
        let response = AppError::Store(StoreError::Status {
            status: 500,
            message: "backend stack trace".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "External service error");
    }

    #[test]
    fn test_store_transport_is_bad_gateway() {
        assert_eq!(
            get_status(AppError::Store(StoreError::Status {
                status: 500,
                message: "boom".to_string(),
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Store(StoreError::RateLimited(2))),
            StatusCode::TOO_MANY_REQUESTS
        );
    }
}
