//! Authentication error types.

use thiserror::Error;
use tollgate_store::StoreError;

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur while issuing or verifying credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed, expired, revoked or superseded credential.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// The principal exists but may not authenticate (deactivated).
    #[error("authentication failed: {0}")]
    AuthenticationFailure(String),

    /// Token signing failed.
    #[error("failed to sign token: {0}")]
    Signing(String),

    /// System clock is before the Unix epoch.
    #[error("time error: {0}")]
    Clock(String),

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidCredential(reason.into())
    }
}
