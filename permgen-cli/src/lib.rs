//! # permgen CLI
//!
//! The `permgen` command line: loads `permissions.toml`, generates the
//! permission enum and syncs it into the permission store.
//!
//! ## Commands
//!
//! - `permgen generate-enum [--force]`
//! - `permgen sync [--guard NAME] [--fresh] [--yes]`
//!
//! Both exit 0 on success, on a declined overwrite and when there is nothing
//! to sync; configuration, write, guard and wipe failures exit 1.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod prompt;

pub use cli::{run, Cli, Command, SyncArgs};
pub use config::{ConfigError, GeneratorConfig, StoreConfig};
pub use error::{CliError, CliResult};
pub use prompt::TerminalPrompt;
