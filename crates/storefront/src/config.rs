//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `VESTIA_BASE_URL` - Public URL for the storefront
//! - `STORE_API_URL` - Document store endpoint
//! - `STORE_API_KEY` - Document store API key
//! - `IDENTITY_API_URL` - Identity service endpoint
//! - `IDENTITY_API_KEY` - Identity service API key
//!
//! ## Optional
//! - `VESTIA_HOST` - Bind address (default: 127.0.0.1)
//! - `VESTIA_PORT` - Listen port (default: 3000)
//! - `PLACES_API_URL` - Places search endpoint (default: serper places)
//! - `PLACES_API_KEY` - Places search API key; suggestions are disabled
//!   when unset
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_PLACES_ENDPOINT: &str = "https://google.serper.dev/places";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// IP address to bind the server to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Public base URL for the storefront.
    pub base_url: String,
    /// Document store configuration.
    pub store: StoreConfig,
    /// Identity service configuration.
    pub identity: IdentityConfig,
    /// Places search configuration.
    pub places: PlacesConfig,
    /// Sentry DSN for error tracking.
    pub sentry_dsn: Option<String>,
}

/// Document store configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct StoreConfig {
    /// Store endpoint.
    pub endpoint: String,
    /// Store API key.
    pub api_key: SecretString,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Identity service configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Identity service endpoint.
    pub endpoint: String,
    /// Identity service API key.
    pub api_key: SecretString,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Places search configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct PlacesConfig {
    /// Places search endpoint.
    pub endpoint: String,
    /// Places API key; `None` disables suggestions.
    pub api_key: Option<SecretString>,
}

impl std::fmt::Debug for PlacesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesConfig")
            .field("endpoint", &self.endpoint)
            .field(
                "api_key",
                &self.api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("VESTIA_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("VESTIA_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("VESTIA_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("VESTIA_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("VESTIA_BASE_URL")?;

        let store = StoreConfig {
            endpoint: get_required_env("STORE_API_URL")?,
            api_key: get_required_secret("STORE_API_KEY")?,
        };
        let identity = IdentityConfig {
            endpoint: get_required_env("IDENTITY_API_URL")?,
            api_key: get_required_secret("IDENTITY_API_KEY")?,
        };
        let places = PlacesConfig {
            endpoint: get_env_or_default("PLACES_API_URL", DEFAULT_PLACES_ENDPOINT),
            api_key: get_optional_env("PLACES_API_KEY").map(SecretString::from),
        };
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            base_url,
            store,
            identity,
            places,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the public base URL is served over HTTPS.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        Config {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            store: StoreConfig {
                endpoint: "https://store.example".to_string(),
                api_key: SecretString::from("store-key"),
            },
            identity: IdentityConfig {
                endpoint: "https://identity.example".to_string(),
                api_key: SecretString::from("identity-key"),
            },
            places: PlacesConfig {
                endpoint: DEFAULT_PLACES_ENDPOINT.to_string(),
                api_key: None,
            },
            sentry_dsn: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = sample_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_https() {
        let mut config = sample_config();
        assert!(!config.is_https());
        config.base_url = "https://shop.example".to_string();
        assert!(config.is_https());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = sample_config();
        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("https://store.example"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("store-key"));
        assert!(!debug_output.contains("identity-key"));
    }
}
