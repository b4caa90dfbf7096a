//! Error types for keywarden-core

use thiserror::Error;

/// Result type alias for credential operations
pub type Result<T> = std::result::Result<T, KeywardenError>;

/// Credential manager error types
///
/// A missing secret is never an error: `load` reports it as `Ok(None)` and
/// presence queries report it as `false`.
#[derive(Error, Debug)]
pub enum KeywardenError {
    #[error("no secret store backend is available")]
    NoBackendAvailable,

    #[error("secret store access failed: {0}")]
    BackendAccess(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
