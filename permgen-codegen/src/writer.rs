//! Writes rendered artifacts to disk.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{ArtifactError, ArtifactResult};

/// Result of a write attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The artifact was written.
    Written {
        /// Artifact path.
        path: PathBuf,
        /// Whether an existing file was replaced.
        overwritten: bool,
    },
    /// The file existed and the operator declined to overwrite it.
    Declined,
}

impl WriteOutcome {
    /// Whether the artifact is now on disk with fresh contents.
    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written { .. })
    }
}

/// Write `contents` to `path`.
///
/// Parent directories are created first. If the file already exists and
/// `force` is false, `confirm` is asked whether to overwrite; declining is
/// not an error.
///
/// # Errors
///
/// [`ArtifactError::CreateDirectory`] or [`ArtifactError::Write`] with the
/// underlying cause.
pub fn write_artifact<F>(path: &Path, contents: &str, force: bool, confirm: F) -> ArtifactResult<WriteOutcome>
where
    F: FnOnce(&Path) -> bool,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ArtifactError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let exists = path.exists();
    if exists && !force && !confirm(path) {
        warn!(path = %path.display(), "Enum generation aborted.");
        return Ok(WriteOutcome::Declined);
    }

    std::fs::write(path, contents).map_err(|source| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), overwritten = exists, "Permission enum generated");
    Ok(WriteOutcome::Written {
        path: path.to_path_buf(),
        overwritten: exists,
    })
}
