//! Backend override command - Sync backend_override.tf with the config.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use strata_core::Project;
use strata_iac::{OverrideAction, TerraformEnv};
use strata_runner::Shims;

#[derive(Args)]
pub struct BackendOverrideArgs {
    /// Module directory (defaults to the working directory)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
}

pub fn execute(args: BackendOverrideArgs, project: Project) -> Result<()> {
    let env = TerraformEnv::new(Shims::system(), project);
    let action = env
        .sync_backend_override(args.dir.as_deref())
        .context("failed to sync backend override")?;

    match action {
        OverrideAction::Written(path) => println!("✅ Wrote {}", path.display()),
        OverrideAction::Removed(path) => println!("🗑️  Removed {}", path.display()),
        OverrideAction::Skipped => println!("Nothing to do"),
    }

    Ok(())
}
