//! Error types for the Tollgate service.

use thiserror::Error;
use tollgate_auth::AuthError;
use tollgate_config::ConfigError;
use tollgate_rbac::{EnforcementError, PolicyError};
use tollgate_store::StoreError;

/// Result type for Tollgate operations.
pub type Result<T> = std::result::Result<T, TollgateError>;

/// Errors surfaced by the [`Tollgate`](crate::Tollgate) service.
#[derive(Debug, Error)]
pub enum TollgateError {
    /// The request was denied. Deliberately carries no hint of which
    /// permission was missing.
    #[error("forbidden")]
    Forbidden,

    /// No principal, or the principal is deactivated.
    #[error("authentication failed: {0}")]
    AuthenticationFailure(String),

    /// Malformed, expired or revoked credential.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// The target entity does not exist.
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    /// A uniqueness constraint was violated, or the target is still referenced.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A field failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The request itself is malformed (unknown action, missing resource).
    #[error("malformed request: {0}")]
    Malformed(#[from] EnforcementError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Store failure not attributable to the request (I/O, poisoned lock).
    #[error("store error: {0}")]
    Store(StoreError),

    /// Credential machinery failure (signing, clock).
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for TollgateError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { entity, key } => Self::NotFound { entity, key },
            StoreError::Invalid { .. } => Self::Validation(e.to_string()),
            StoreError::Conflict { .. }
            | StoreError::RoleInUse { .. }
            | StoreError::Policy(PolicyError::DuplicateRule { .. } | PolicyError::DuplicateRuleId(_)) => {
                Self::Conflict(e.to_string())
            }
            other => Self::Store(other),
        }
    }
}

impl From<AuthError> for TollgateError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredential(reason) => Self::InvalidCredential(reason),
            AuthError::AuthenticationFailure(reason) => Self::AuthenticationFailure(reason),
            AuthError::Store(store) => store.into(),
            other @ (AuthError::Signing(_) | AuthError::Clock(_)) => {
                Self::Internal(other.to_string())
            }
        }
    }
}
