//! Session middleware configuration.
//!
//! Sets up in-memory sessions using tower-sessions. Session loss on restart
//! only signs users out; carts and profiles live in the document store.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "vestia_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer.
#[must_use]
pub fn create_session_layer(config: &Config) -> SessionManagerLayer<MemoryStore> {
    let store = MemoryStore::default();

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
