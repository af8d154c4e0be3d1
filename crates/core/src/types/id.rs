//! Newtype ids for type-safe entity references.
//!
//! Two id families exist in the store: opaque string identifiers assigned by
//! the identity provider ([`Uid`]) and human-readable sequential integers
//! minted from shared counter documents (via `define_seq_id!`).

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe sequential id wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>` and `Into<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use vestia_core::define_seq_id;
/// define_seq_id!(UserNo);
/// define_seq_id!(OrderNo);
///
/// let user = UserNo::new(1);
/// let order = OrderNo::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: UserNo = order;
/// ```
#[macro_export]
macro_rules! define_seq_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new id from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Sequential display ids, minted by the counter allocator.
define_seq_id!(UserNo);
define_seq_id!(OrderNo);

/// Opaque user identifier assigned by the identity provider.
///
/// The provider guarantees stability across sessions; nothing else about the
/// format may be assumed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    /// Wrap a provider-assigned identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Uid` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for Uid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Uid {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for Uid {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_id_roundtrip() {
        let id = OrderNo::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(OrderNo::from(42), id);
        assert_eq!(format!("{id}"), "42");
    }

    #[test]
    fn test_seq_id_serde_transparent() {
        let id = UserNo::new(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
        let back: UserNo = serde_json::from_str("7").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_uid_serde_transparent() {
        let uid = Uid::new("a1b2c3");
        assert_eq!(serde_json::to_string(&uid).unwrap(), "\"a1b2c3\"");
        let back: Uid = serde_json::from_str("\"a1b2c3\"").unwrap();
        assert_eq!(back, uid);
    }
}
