//! Biometric prompt seam.
//!
//! The actual fingerprint/face check happens on the device. The service
//! only needs a yes/no answer, so the seam is a single method; headless
//! deployments use [`DenyingPrompt`], which refuses every attempt.

use async_trait::async_trait;

/// Asks the device to verify the user's biometrics.
#[async_trait]
pub trait BiometricPrompt: Send + Sync {
    /// Show a prompt with the given message. Returns whether the user
    /// passed verification.
    async fn prompt(&self, message: &str) -> bool;
}

/// A [`BiometricPrompt`] that always denies.
///
/// Used when no device prompt is attached, so biometric sign-in degrades to
/// a failed attempt instead of a silent bypass.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyingPrompt;

#[async_trait]
impl BiometricPrompt for DenyingPrompt {
    async fn prompt(&self, _message: &str) -> bool {
        false
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// A prompt with a fixed answer, for tests.
    pub struct FixedPrompt(pub bool);

    #[async_trait]
    impl BiometricPrompt for FixedPrompt {
        async fn prompt(&self, _message: &str) -> bool {
            self.0
        }
    }
}
