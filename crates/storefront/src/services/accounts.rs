//! Account management: registration, sign-in, biometric unlock, profiles.

use std::sync::Arc;

use chrono::Utc;
use vestia_core::{Email, EmailError, Uid, UserNo};

use crate::identity::{IdentityError, IdentityProvider};
use crate::models::{CurrentUser, UserProfile};
use crate::store::{DocumentStore, StoreError, collections};

use super::allocator::{SequentialIdAllocator, USER_COUNTER};
use super::biometric::BiometricPrompt;
use super::keystore::{SecureStore, keys};

const BIOMETRIC_PROMPT_MESSAGE: &str = "Sign in to Vestia";

/// Errors returned by account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Display name is blank.
    #[error("Please choose a username")]
    UsernameRequired,

    /// Email failed validation.
    #[error(transparent)]
    InvalidEmail(#[from] EmailError),

    /// Password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// No profile document exists for the user.
    #[error("No profile found for this account")]
    ProfileNotFound,

    /// Biometric sign-in attempted without enrollment.
    #[error("Biometric sign-in is not set up on this device")]
    BiometricNotEnrolled,

    /// The device prompt denied the attempt.
    #[error("Biometric verification failed")]
    BiometricDenied,

    /// Identity provider operation failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Profile fields a user may edit.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// New display name.
    pub username: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New address.
    pub address: Option<String>,
    /// New avatar URL.
    pub avatar: Option<String>,
}

/// Account operations over the identity provider, document store, and
/// device keystore.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    keystore: Arc<dyn SecureStore>,
    prompt: Arc<dyn BiometricPrompt>,
    allocator: SequentialIdAllocator,
}

impl AccountService {
    /// Create an account service.
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        keystore: Arc<dyn SecureStore>,
        prompt: Arc<dyn BiometricPrompt>,
    ) -> Self {
        let allocator = SequentialIdAllocator::new(store.clone());
        Self {
            store,
            identity,
            keystore,
            prompt,
            allocator,
        }
    }

    /// Register a new account and create its profile document.
    ///
    /// The profile is keyed by a sequential display id minted from the user
    /// counter, with the provider uid stored as a field.
    ///
    /// # Errors
    ///
    /// Returns validation errors for a blank username, malformed email, or
    /// mismatched confirmation, [`AccountError::Identity`] if the provider
    /// rejects the registration, and [`AccountError::Store`] if the profile
    /// write fails.
    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<CurrentUser, AccountError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AccountError::UsernameRequired);
        }
        let email = Email::parse(email)?;
        if password != confirm {
            return Err(AccountError::PasswordMismatch);
        }

        let uid = self.identity.sign_up(&email, password).await?;

        let display_id = UserNo::new(self.allocator.allocate(USER_COUNTER).await?);
        let profile = UserProfile {
            uid: uid.clone(),
            username: username.to_owned(),
            email: email.clone(),
            phone: String::new(),
            address: String::new(),
            avatar: None,
            biometric_enabled: false,
            created_at: Utc::now(),
        };
        self.store
            .set(
                collections::USER,
                &display_id.to_string(),
                serde_json::to_value(&profile).map_err(StoreError::Decode)?,
            )
            .await?;

        tracing::info!(%uid, %display_id, "Account created");
        Ok(CurrentUser { uid, email })
    }

    /// Verify credentials and, with `remember` set, stash them in the
    /// device keystore for pre-fill and biometric sign-in. Without
    /// `remember` any stashed credentials are cleared.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Identity`] if the credentials do not verify.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
        remember: bool,
    ) -> Result<CurrentUser, AccountError> {
        let email = Email::parse(email)?;
        let uid = self.identity.sign_in(&email, password).await?;

        if remember {
            self.keystore.set(keys::REMEMBERED_EMAIL, email.as_str()).await;
            self.keystore.set(keys::REMEMBERED_PASSWORD, password).await;
        } else {
            self.keystore.remove(keys::REMEMBERED_EMAIL).await;
            self.keystore.remove(keys::REMEMBERED_PASSWORD).await;
        }

        Ok(CurrentUser { uid, email })
    }

    /// Sign in with the device biometric prompt.
    ///
    /// Requires prior enrollment: remembered credentials in the keystore,
    /// the enrolled uid marker, and the profile's biometric flag.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::BiometricNotEnrolled`] when any piece of the
    /// enrollment is missing, [`AccountError::BiometricDenied`] when the
    /// prompt fails, and [`AccountError::Identity`] when the remembered
    /// credentials no longer verify (e.g. after a password change).
    pub async fn biometric_sign_in(&self) -> Result<CurrentUser, AccountError> {
        let enrolled_uid = self
            .keystore
            .get(keys::BIOMETRIC_USER)
            .await
            .ok_or(AccountError::BiometricNotEnrolled)?;
        let email = self
            .keystore
            .get(keys::REMEMBERED_EMAIL)
            .await
            .ok_or(AccountError::BiometricNotEnrolled)?;
        let password = self
            .keystore
            .get(keys::REMEMBERED_PASSWORD)
            .await
            .ok_or(AccountError::BiometricNotEnrolled)?;

        let profile = self.profile(&Uid::new(enrolled_uid.clone())).await?;
        if !profile.biometric_enabled {
            return Err(AccountError::BiometricNotEnrolled);
        }

        if !self.prompt.prompt(BIOMETRIC_PROMPT_MESSAGE).await {
            return Err(AccountError::BiometricDenied);
        }

        let email = Email::parse(&email)?;
        let uid = self.identity.sign_in(&email, &password).await?;
        if uid.as_str() != enrolled_uid {
            // Stale enrollment from a previous account on this device.
            return Err(AccountError::BiometricNotEnrolled);
        }

        Ok(CurrentUser { uid, email })
    }

    /// Enable biometric unlock for the user.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::BiometricNotEnrolled`] if no credentials are
    /// remembered on this device, and store errors from the profile update.
    pub async fn enable_biometric(&self, uid: &Uid) -> Result<(), AccountError> {
        if self.keystore.get(keys::REMEMBERED_PASSWORD).await.is_none() {
            return Err(AccountError::BiometricNotEnrolled);
        }

        let (doc_id, _) = self.profile_document(uid).await?;
        self.keystore.set(keys::BIOMETRIC_USER, uid.as_str()).await;
        self.store
            .update(
                collections::USER,
                &doc_id,
                serde_json::json!({ "biometricEnabled": true }),
            )
            .await?;
        Ok(())
    }

    /// Disable biometric unlock and drop the enrollment marker.
    ///
    /// # Errors
    ///
    /// Returns store errors from the profile update.
    pub async fn disable_biometric(&self, uid: &Uid) -> Result<(), AccountError> {
        let (doc_id, _) = self.profile_document(uid).await?;
        self.keystore.remove(keys::BIOMETRIC_USER).await;
        self.store
            .update(
                collections::USER,
                &doc_id,
                serde_json::json!({ "biometricEnabled": false }),
            )
            .await?;
        Ok(())
    }

    /// Ask the identity provider to send a password reset email.
    ///
    /// Reports success whether or not an account exists for the address, so
    /// the endpoint does not reveal registered emails.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidEmail`] for a malformed address and
    /// transport-level identity errors.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AccountError> {
        let email = Email::parse(email)?;
        match self.identity.send_password_reset(&email).await {
            Ok(()) | Err(IdentityError::UserNotFound) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Fetch the user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::ProfileNotFound`] if no profile document
    /// carries this uid.
    pub async fn profile(&self, uid: &Uid) -> Result<UserProfile, AccountError> {
        self.profile_document(uid).await.map(|(_, profile)| profile)
    }

    /// Apply profile edits and return the updated profile.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::UsernameRequired`] for a blank username and
    /// [`AccountError::ProfileNotFound`] if the profile is missing.
    pub async fn update_profile(
        &self,
        uid: &Uid,
        update: ProfileUpdate,
    ) -> Result<UserProfile, AccountError> {
        let (doc_id, mut profile) = self.profile_document(uid).await?;

        if let Some(username) = update.username {
            let username = username.trim().to_owned();
            if username.is_empty() {
                return Err(AccountError::UsernameRequired);
            }
            profile.username = username;
        }
        if let Some(phone) = update.phone {
            profile.phone = phone;
        }
        if let Some(address) = update.address {
            profile.address = address;
        }
        if let Some(avatar) = update.avatar {
            profile.avatar = Some(avatar);
        }

        self.store
            .set(
                collections::USER,
                &doc_id,
                serde_json::to_value(&profile).map_err(StoreError::Decode)?,
            )
            .await?;
        Ok(profile)
    }

    async fn profile_document(&self, uid: &Uid) -> Result<(String, UserProfile), AccountError> {
        let docs = self
            .store
            .query_eq(
                collections::USER,
                "uid",
                serde_json::Value::String(uid.as_str().to_owned()),
            )
            .await?;
        let doc = docs.first().ok_or(AccountError::ProfileNotFound)?;
        let profile = doc.decode()?;
        Ok((doc.id.clone(), profile))
    }
}
