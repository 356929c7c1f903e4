//! `permgen sync`

use std::sync::Arc;
use tracing::{error, info, warn};

use permgen_codegen::GeneratedArtifact;
use permgen_sync::{JsonFileStore, OperatorPrompt, Reconciler, SyncOptions, SyncOutcome};

use super::generate::generate_enum;
use crate::config::GeneratorConfig;
use crate::error::CliResult;

/// Sync the generated enum into the permission store.
///
/// Generates the enum first when it does not exist yet.
pub async fn sync_permissions(
    config: &GeneratorConfig,
    options: &SyncOptions,
    prompt: Arc<dyn OperatorPrompt>,
) -> CliResult<SyncOutcome> {
    let target = config.artifact_target();

    if !target.path.exists() {
        warn!(path = %target.path.display(), "The enum file does not exist at [{}].", target.path.display());
        info!("Running 'generate-enum' to create it...");
        if let Err(e) = generate_enum(config, true, prompt.as_ref()) {
            error!("Failed to generate the enum file. Please run 'permgen generate-enum' manually.");
            return Err(e);
        }
    }

    let artifact = GeneratedArtifact::load(&target.path, &target.type_name)?;
    let store = JsonFileStore::open(&config.store.path, config.store.table_names.clone()).await?;

    let reconciler = Reconciler::new(Arc::new(store), prompt, config.reconciler_settings());
    let outcome = reconciler.reconcile(&artifact.all_values(), options).await?;
    Ok(outcome)
}
