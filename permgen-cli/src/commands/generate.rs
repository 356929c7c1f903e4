//! `permgen generate-enum`

use tracing::{info, warn};

use permgen_codegen::{render, write_artifact, Template, WriteOutcome};
use permgen_rbac::expand;
use permgen_sync::OperatorPrompt;

use crate::config::GeneratorConfig;
use crate::error::CliResult;

/// Result of a generate run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    /// What the writer did
    pub outcome: WriteOutcome,
    /// Number of generated cases
    pub permissions: usize,
    /// Number of expansion warnings
    pub warnings: usize,
}

/// Expand the configuration and write the permission enum.
///
/// An existing file is only replaced with `force` or after confirmation.
pub fn generate_enum(config: &GeneratorConfig, force: bool, prompt: &dyn OperatorPrompt) -> CliResult<GenerateReport> {
    let template = Template::resolve(&config.base_dir, config.template.as_deref())?;
    let target = config.artifact_target();

    info!("Generating permissions from the permission configuration...");
    let expansion = expand(&config.resources, &config.custom_permissions);

    let source = render(&expansion.permissions, &template, &target);
    let outcome = write_artifact(&target.path, &source, force, |path| {
        prompt.confirm(
            &format!("The file [{}] already exists. Do you want to overwrite it?", path.display()),
            false,
        )
    })?;

    if outcome.is_written() {
        info!(
            path = %target.path.display(),
            type_name = %target.type_name,
            permissions = expansion.permissions.len(),
            "Successfully generated {} at [{}].",
            target.type_name,
            target.path.display()
        );
        warn!("Remember to run 'permgen sync' to update the permission store!");
    }

    Ok(GenerateReport {
        outcome,
        permissions: expansion.permissions.len(),
        warnings: expansion.warnings.len(),
    })
}
