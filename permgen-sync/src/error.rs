//! Error types for permission store access and reconciliation

use thiserror::Error;

/// Permission store error types.
///
/// Store errors are per-item: the reconciler collects them and keeps going.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Referential check failed
    #[error("Constraint violation on '{table}': {reason}")]
    ConstraintViolation {
        /// Relation the check failed on.
        table: String,
        /// What was still referenced.
        reason: String,
    },

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Snapshot could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend rejected the operation
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Reconciliation error types.
///
/// Every variant aborts the sync.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Permission list could not be loaded
    #[error("Could not load permissions: {0}")]
    Source(String),

    /// Guard is not one of the configured guards
    #[error("Guard '{0}' not found in the configuration.")]
    GuardNotConfigured(String),

    /// Fresh wipe failed; constraint checks were restored
    #[error("Error deleting permissions: {0}")]
    Wipe(#[source] StoreError),

    /// Store failure outside per-item processing
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for reconciliation.
pub type SyncResult<T> = Result<T, SyncError>;

impl SyncError {
    /// Get error code for operator-facing reports.
    pub fn error_code(&self) -> &'static str {
        match self {
            SyncError::Source(_) => "SOURCE_UNAVAILABLE",
            SyncError::GuardNotConfigured(_) => "GUARD_NOT_CONFIGURED",
            SyncError::Wipe(_) => "WIPE_FAILED",
            SyncError::Store(_) => "STORE_ERROR",
        }
    }
}

#[cfg(feature = "json-file")]
impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
