//! permgen - Main Entry Point

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

use permgen_cli::{logging, run, Cli, TerminalPrompt};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(cli, Arc::new(TerminalPrompt)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.error_code(), "{e}");
            ExitCode::FAILURE
        }
    }
}
