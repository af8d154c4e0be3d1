//! User profile model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vestia_core::{Email, Uid};

/// A user profile document.
///
/// Profiles live in the `User` collection keyed by sequential display id,
/// with the provider uid stored as a field. Lookups therefore go through a
/// `uid` equality query, not a direct document fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Provider-assigned uid.
    pub uid: Uid,
    /// Display name.
    pub username: String,
    /// Email address.
    pub email: Email,
    /// Phone number, free-form.
    #[serde(default)]
    pub phone: String,
    /// Shipping address, free-form.
    #[serde(default)]
    pub address: String,
    /// Avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Whether biometric unlock is enabled for this account.
    #[serde(default)]
    pub biometric_enabled: bool,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
}
