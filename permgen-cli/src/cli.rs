//! Command line definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use permgen_sync::{OperatorPrompt, RoleSync, StaleOutcome, SyncOptions, SyncOutcome, WipeOutcome};

use crate::commands::{generate_enum, sync_permissions};
use crate::config::{GeneratorConfig, DEFAULT_CONFIG_FILE};
use crate::error::CliResult;

#[derive(Debug, Parser)]
#[command(name = "permgen")]
#[command(version)]
#[command(about = "Generate a typed permission enum and sync it into the permission store", long_about = None)]
pub struct Cli {
    /// Path to the permission configuration
    #[arg(long, global = true, env = "PERMGEN_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate the permission enum from the configuration
    GenerateEnum {
        /// Overwrite an existing enum file without asking
        #[arg(long)]
        force: bool,
    },
    /// Sync permissions from the generated enum into the store
    Sync(SyncArgs),
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Authentication guard
    #[arg(long)]
    pub guard: Option<String>,

    /// Delete existing permissions and associations before syncing
    #[arg(long)]
    pub fresh: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl From<SyncArgs> for SyncOptions {
    fn from(args: SyncArgs) -> Self {
        SyncOptions {
            guard: args.guard,
            fresh: args.fresh,
            assume_yes: args.yes,
        }
    }
}

/// Run a parsed command line.
pub async fn run(cli: Cli, prompt: Arc<dyn OperatorPrompt>) -> CliResult<()> {
    let config = GeneratorConfig::load(&cli.config)?;

    match cli.command {
        Command::GenerateEnum { force } => {
            generate_enum(&config, force, prompt.as_ref())?;
        }
        Command::Sync(args) => {
            let outcome = sync_permissions(&config, &args.into(), prompt).await?;
            summarize(&outcome);
        }
    }
    Ok(())
}

fn summarize(outcome: &SyncOutcome) {
    let SyncOutcome::Synced(report) = outcome else {
        return;
    };

    if let WipeOutcome::Wiped { removed } = report.wipe {
        info!(removed, "fresh sync wiped existing rows");
    }
    if !report.failures.is_empty() {
        let failed: Vec<&str> = report.failures.iter().map(|f| f.permission.as_str()).collect();
        warn!(guard = %report.guard, "{} permissions failed: {}", failed.len(), failed.join(", "));
    }
    if let RoleSync::Synced { role, permissions } = &report.super_admin {
        info!(role = %role, permissions, "super-admin role updated");
    }
    if let StaleOutcome::Removed {
        failures, cache_error, ..
    } = &report.stale
    {
        if !failures.is_empty() {
            warn!("{} stale permissions could not be removed", failures.len());
        }
        if let Some(e) = cache_error {
            warn!(error = %e, "permission cache was not invalidated after stale removal");
        }
    }
}
