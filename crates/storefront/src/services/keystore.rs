//! Device-local secure storage.
//!
//! Remember-me credentials and the biometric marker live in a secure store
//! on the client device, never in the document store. [`SecureStore`] is the
//! seam; the service ships with [`MemoryKeystore`], and platform builds can
//! provide a keychain-backed implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

/// Well-known keystore entries.
pub mod keys {
    /// Email remembered for pre-filling the sign-in form.
    pub const REMEMBERED_EMAIL: &str = "remembered_email";
    /// Password remembered for biometric sign-in.
    pub const REMEMBERED_PASSWORD: &str = "remembered_password";
    /// Uid of the account enrolled for biometric unlock.
    pub const BIOMETRIC_USER: &str = "biometric_user";
}

/// Device-local secure key/value storage.
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Read a value, or `None` if absent.
    async fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    async fn set(&self, key: &str, value: &str);

    /// Remove a value. Removing a missing key is a no-op.
    async fn remove(&self, key: &str);
}

/// In-memory [`SecureStore`] implementation.
#[derive(Clone, Default)]
pub struct MemoryKeystore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKeystore {
    /// Create an empty keystore.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl SecureStore for MemoryKeystore {
    async fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) {
        self.lock().insert(key.to_owned(), value.to_owned());
    }

    async fn remove(&self, key: &str) {
        self.lock().remove(key);
    }
}
