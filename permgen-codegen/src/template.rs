//! # Templates
//!
//! Locates the template the permission enum is rendered from.
//!
//! ## Resolution Order
//!
//! 1. An explicit template path (must exist)
//! 2. The project override at `stubs/vendor/permgen/permission_enum.stub`
//! 3. The template bundled with this crate

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ArtifactError, ArtifactResult};

/// Project-relative location of the override template.
pub const OVERRIDE_TEMPLATE_PATH: &str = "stubs/vendor/permgen/permission_enum.stub";

/// Template bundled with permgen.
pub const BUNDLED_TEMPLATE: &str = include_str!("../stubs/permission_enum.stub");

/// Placeholder replaced with the module path of the artifact.
pub const NAMESPACE_PLACEHOLDER: &str = "{{ namespace }}";
/// Placeholder replaced with the enum type name.
pub const CLASS_PLACEHOLDER: &str = "{{ class }}";
/// Placeholder replaced with the formatted case list.
pub const CASES_PLACEHOLDER: &str = "{{ cases }}";

/// Where a template was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateOrigin {
    /// Path given explicitly in configuration.
    Explicit(PathBuf),
    /// Project override at the conventional location.
    Override(PathBuf),
    /// Template compiled into permgen.
    Bundled,
}

/// A loaded template.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    origin: TemplateOrigin,
}

impl Template {
    /// The template bundled with permgen.
    pub fn bundled() -> Self {
        Self {
            source: BUNDLED_TEMPLATE.to_string(),
            origin: TemplateOrigin::Bundled,
        }
    }

    /// A template from in-memory source.
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            origin: TemplateOrigin::Bundled,
        }
    }

    /// Resolve the template for a project.
    ///
    /// # Arguments
    ///
    /// * `project_root` - Root of the host project
    /// * `explicit` - Template path from configuration, if any
    ///
    /// # Returns
    ///
    /// The first template found in resolution order
    ///
    /// # Errors
    ///
    /// [`ArtifactError::TemplateNotFound`] when an explicit path does not exist,
    /// [`ArtifactError::TemplateRead`] when a template file cannot be read.
    pub fn resolve(project_root: &Path, explicit: Option<&Path>) -> ArtifactResult<Self> {
        if let Some(path) = explicit {
            let path = project_root.join(path);
            if !path.is_file() {
                return Err(ArtifactError::TemplateNotFound(path));
            }
            let source = read_template(&path)?;
            debug!(path = %path.display(), "using explicit template");
            return Ok(Self {
                source,
                origin: TemplateOrigin::Explicit(path),
            });
        }

        let override_path = project_root.join(OVERRIDE_TEMPLATE_PATH);
        if override_path.is_file() {
            let source = read_template(&override_path)?;
            debug!(path = %override_path.display(), "using project override template");
            return Ok(Self {
                source,
                origin: TemplateOrigin::Override(override_path),
            });
        }

        Ok(Self::bundled())
    }

    /// Template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Where the template came from.
    pub fn origin(&self) -> &TemplateOrigin {
        &self.origin
    }
}

fn read_template(path: &Path) -> ArtifactResult<String> {
    std::fs::read_to_string(path).map_err(|source| ArtifactError::TemplateRead {
        path: path.to_path_buf(),
        source,
    })
}
