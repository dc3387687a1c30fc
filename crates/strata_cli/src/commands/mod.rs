//! CLI command definitions.
//!
//! This module defines the command structure for the strata CLI.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use strata_core::Project;
use strata_runner::OsFileSystem;

pub mod backend_override;
pub mod env;

/// strata - terraform environment for the module you are standing in
#[derive(Parser)]
#[command(name = "strata")]
#[command(version, about = "strata - terraform environment for the current module")]
#[command(long_about = r#"
strata computes the environment terraform needs for the module in the
working directory: data dir, backend config, var files and the outputs of
the module's direct dependencies.

COMMANDS:
  env               → Print export lines for the current module
  backend-override  → Sync backend_override.tf with the configured backend

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or configuration
  5 - IaC error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Context to use (defaults to .strata/context, then "local")
    #[arg(short, long, global = true, env = "STRATA_CONTEXT")]
    pub context: Option<String>,

    /// Project root (defaults to the nearest directory with a strata.yaml)
    #[arg(long, global = true)]
    pub project_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the terraform environment for the current module
    Env(env::EnvArgs),

    /// Write or remove backend_override.tf for the configured backend
    #[command(name = "backend-override")]
    BackendOverride(backend_override::BackendOverrideArgs),
}

/// Resolve the project and context selected by the global options.
pub fn load_project(cli: &Cli) -> Result<Project> {
    let cwd = std::env::current_dir().context("failed to read working directory")?;
    let context = cli.context.as_deref();
    let fs = OsFileSystem::new();

    let project = match &cli.project_root {
        Some(root) => {
            let root = cwd.join(root);
            let discovered = Project::discover(&fs, &root, context)?;
            Project::new(root, discovered.context())?
        }
        None => Project::discover(&fs, &cwd, context)?,
    };

    debug!(
        "Using project {:?}, context {}",
        project.root(),
        project.context()
    );
    Ok(project)
}
