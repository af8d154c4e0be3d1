//! In-memory identity provider for tests.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::Rng;
use vestia_core::{Email, Uid};

use super::{IdentityError, IdentityProvider};

struct Account {
    password: String,
    uid: Uid,
}

/// In-memory [`IdentityProvider`] implementation.
#[derive(Clone, Default)]
pub struct MemoryIdentity {
    accounts: Arc<Mutex<HashMap<String, Account>>>,
}

impl MemoryIdentity {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn mint_uid() -> Uid {
        let mut rng = rand::rng();
        let id = (0..28).fold(String::from("uid-"), |mut id, _| {
            let _ = write!(id, "{:x}", rng.random_range(0..16));
            id
        });
        Uid::new(id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Account>> {
        self.accounts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn sign_up(&self, email: &Email, password: &str) -> Result<Uid, IdentityError> {
        let mut accounts = self.lock();
        if accounts.contains_key(email.as_str()) {
            return Err(IdentityError::EmailInUse);
        }
        if password.len() < 6 {
            return Err(IdentityError::WeakPassword(
                "Password should be at least 6 characters".to_owned(),
            ));
        }

        let uid = Self::mint_uid();
        accounts.insert(
            email.as_str().to_owned(),
            Account {
                password: password.to_owned(),
                uid: uid.clone(),
            },
        );
        Ok(uid)
    }

    async fn sign_in(&self, email: &Email, password: &str) -> Result<Uid, IdentityError> {
        let accounts = self.lock();
        let account = accounts
            .get(email.as_str())
            .ok_or(IdentityError::UserNotFound)?;
        if account.password != password {
            return Err(IdentityError::InvalidCredentials);
        }
        Ok(account.uid.clone())
    }

    async fn send_password_reset(&self, _email: &Email) -> Result<(), IdentityError> {
        // The hosted provider accepts reset requests for unknown addresses
        // without revealing whether the account exists. Match that.
        Ok(())
    }
}
