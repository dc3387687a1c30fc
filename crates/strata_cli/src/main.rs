//! strata CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or configuration
//! - 5: IaC error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use strata_core::CoreError;
use strata_iac::IacError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const IAC_ERROR: u8 = 5;
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout is eval'ed by the shell, so logs go to stderr
    let level = if cli.verbose { "debug" } else { "info" };
    let directives =
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("warn,strata={}", level));
    let log_result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::new(directives))
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let result = commands::load_project(&cli).and_then(|project| match cli.command {
        Commands::Env(args) => commands::env::execute(args, project),
        Commands::BackendOverride(args) => commands::backend_override::execute(args, project),
    });

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if e.chain().any(|cause| cause.is::<CoreError>()) {
        ExitCodes::INVALID_ARGS
    } else if e.chain().any(|cause| cause.is::<IacError>()) {
        ExitCodes::IAC_ERROR
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
