//! Error types for the permgen command line

use thiserror::Error;

use crate::config::ConfigError;
use permgen_codegen::ArtifactError;
use permgen_sync::{StoreError, SyncError};

/// Command error types.
///
/// Every variant maps to exit code 1.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration missing or invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Enum generation or loading failed
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// Reconciliation aborted
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Permission store could not be opened
    #[error("Could not open the permission store: {0}")]
    Store(#[from] StoreError),
}

/// Result type for commands.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get error code for operator-facing reports.
    pub fn error_code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "CONFIG_ERROR",
            CliError::Artifact(e) => e.error_code(),
            CliError::Sync(e) => e.error_code(),
            CliError::Store(_) => "STORE_ERROR",
        }
    }
}
