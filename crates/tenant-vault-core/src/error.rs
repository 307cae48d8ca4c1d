//! Error types for tenant vault operations.
//!
//! Errors are descriptive at the core level; the CLI (or any service
//! boundary) maps them to user-facing messages. The one distinction callers
//! must always be able to make is between [`VaultError::AuthenticationFailure`]
//! (ask for another password) and storage/filesystem failures (an outage).

use thiserror::Error;

/// Result type alias for vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;

/// One tenant that could not be closed during [`crate::TenantManager::close_all`].
#[derive(Debug)]
pub struct TenantFailure {
    pub tenant_id: String,
    pub error: VaultError,
}

/// Core error type for vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Missing or malformed configuration / arguments
    #[error("Validation error: {0}")]
    Validation(String),

    /// Encrypted blob is shorter than salt + nonce + tag
    #[error("Encrypted data too short: {len} bytes")]
    TooShort { len: usize },

    /// Wrong password or tampered/corrupted ciphertext
    #[error("Authentication failed: wrong password or corrupted data")]
    AuthenticationFailure,

    /// Randomness or cipher setup failure
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Local filesystem error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Remote object store error (including "not found")
    #[error("Storage error: {0}")]
    Storage(String),

    /// Baseline schema could not be applied to a new tenant database
    #[error("Schema error: {0}")]
    Schema(String),

    /// SQLite connection error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// Operation requires a cached tenant that is not loaded
    #[error("Tenant not loaded: {0}")]
    TenantNotLoaded(String),

    /// Handle was used after its tenant was closed
    #[error("Tenant closed: {0}")]
    TenantClosed(String),

    /// A lock was poisoned by a panicking thread
    #[error("Internal error: {0}")]
    Internal(String),

    /// Aggregate of per-tenant failures from a best-effort shutdown
    #[error("{} tenant(s) failed to close: {}", .failures.len(), summarize(.failures))]
    CloseAll { failures: Vec<TenantFailure> },
}

impl VaultError {
    /// True when the caller should retry with a different password.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, VaultError::AuthenticationFailure)
    }

    /// True for failures of the remote store or the local disk.
    pub fn is_outage(&self) -> bool {
        matches!(self, VaultError::Storage(_) | VaultError::Io { .. })
    }
}

fn summarize(failures: &[TenantFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("{}: {}", failure.tenant_id, failure.error))
        .collect::<Vec<_>>()
        .join("; ")
}
