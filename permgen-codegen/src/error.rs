//! Error types for artifact generation
//!
//! This module defines the errors that can occur while resolving templates,
//! writing the generated enum, and reading it back.

use std::path::PathBuf;
use thiserror::Error;

/// Artifact error types.
///
/// Every variant is fatal for the generate stage.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Template file does not exist
    #[error("Template file not found at: {}", .0.display())]
    TemplateNotFound(PathBuf),

    /// Template file exists but could not be read
    #[error("Could not read template [{}]: {source}", .path.display())]
    TemplateRead {
        /// Template path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Output directory could not be created
    #[error("Could not create directory: {} ({source})", .path.display())]
    CreateDirectory {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Artifact could not be written
    #[error("Could not write to file [{}]: {source}", .path.display())]
    Write {
        /// Artifact path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Artifact could not be read back
    #[error("Could not read generated enum [{}]: {source}", .path.display())]
    Read {
        /// Artifact path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Artifact exists but does not look like a generated permission enum
    #[error("The generated enum '{type_name}' is missing required accessors: {reason}")]
    Unloadable {
        /// Expected type name.
        type_name: String,
        /// What is missing.
        reason: String,
    },
}

/// Result type for artifact operations.
pub type ArtifactResult<T> = Result<T, ArtifactError>;

impl ArtifactError {
    /// Get error code for operator-facing reports.
    pub fn error_code(&self) -> &'static str {
        match self {
            ArtifactError::TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            ArtifactError::TemplateRead { .. } => "TEMPLATE_READ",
            ArtifactError::CreateDirectory { .. } => "CREATE_DIRECTORY",
            ArtifactError::Write { .. } => "WRITE_FAILED",
            ArtifactError::Read { .. } => "READ_FAILED",
            ArtifactError::Unloadable { .. } => "UNLOADABLE_ENUM",
        }
    }
}
