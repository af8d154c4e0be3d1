//! Identity provider access.
//!
//! Credential storage and verification are delegated to a hosted identity
//! service. The provider owns passwords and mints opaque stable uids; this
//! service never sees a password hash. [`IdentityProvider`] is the seam:
//! production uses [`HttpIdentity`], tests use [`MemoryIdentity`].

mod http;
mod memory;

pub use http::HttpIdentity;
pub use memory::MemoryIdentity;

use async_trait::async_trait;
use vestia_core::{Email, Uid};

/// Errors returned by identity provider operations.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The email/password pair did not verify.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No account exists for the email.
    #[error("No account for this email")]
    UserNotFound,

    /// An account already exists for the email.
    #[error("An account with this email already exists")]
    EmailInUse,

    /// The provider rejected the password as too weak.
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// HTTP transport error.
    #[error("Identity HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned an error this service does not recognize.
    #[error("Identity provider error: {0}")]
    Provider(String),
}

/// Backend-agnostic identity provider interface.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new account. Returns the provider-assigned uid.
    async fn sign_up(&self, email: &Email, password: &str) -> Result<Uid, IdentityError>;

    /// Verify credentials. Returns the uid on success.
    async fn sign_in(&self, email: &Email, password: &str) -> Result<Uid, IdentityError>;

    /// Ask the provider to send a password reset email.
    async fn send_password_reset(&self, email: &Email) -> Result<(), IdentityError>;
}
