//! Env command - Print the terraform environment for the current module.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing::{info, warn};

use strata_core::Project;
use strata_iac::{
    managed_list, stale_vars, EnvironmentVariableSet, OverrideAction, TerraformEnv,
    MANAGED_ENV_VAR,
};
use strata_runner::Shims;

/// Shell dialect of the printed lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShellKind {
    Posix,
    Powershell,
}

#[derive(Args)]
pub struct EnvArgs {
    /// Shell syntax to print
    #[arg(long, value_enum, default_value_t = ShellKind::Posix)]
    pub shell: ShellKind,

    /// Also sync backend_override.tf in the current module (for shell hooks)
    #[arg(long)]
    pub hook: bool,
}

pub fn execute(args: EnvArgs, project: Project) -> Result<()> {
    let env = TerraformEnv::new(Shims::system(), project);
    let vars = env
        .get_env_vars()
        .context("failed to compute terraform environment")?;

    let previous = std::env::var(MANAGED_ENV_VAR).ok();
    print!("{}", render(args.shell, &vars, previous.as_deref()));

    if args.hook {
        match env.sync_backend_override(None) {
            Ok(OverrideAction::Written(path)) => info!("Synced backend override {:?}", path),
            Ok(_) => {}
            Err(e) => warn!("Failed to sync backend override: {}", e),
        }
    }

    Ok(())
}

/// Export lines for `vars` plus unset lines for names exported previously
/// that are no longer produced.
pub fn render(shell: ShellKind, vars: &EnvironmentVariableSet, previous: Option<&str>) -> String {
    let mut out = String::new();

    for name in stale_vars(previous, vars) {
        out.push_str(&unset_line(shell, &name));
    }

    if vars.is_empty() {
        if previous.is_some() {
            out.push_str(&unset_line(shell, MANAGED_ENV_VAR));
        }
        return out;
    }

    for (name, value) in vars {
        out.push_str(&export_line(shell, name, value));
    }
    out.push_str(&export_line(shell, MANAGED_ENV_VAR, &managed_list(vars)));
    out
}

fn export_line(shell: ShellKind, name: &str, value: &str) -> String {
    match shell {
        ShellKind::Posix => format!("export {}=\"{}\"\n", name, escape_posix(value)),
        ShellKind::Powershell => format!("$env:{}=\"{}\"\n", name, escape_powershell(value)),
    }
}

fn unset_line(shell: ShellKind, name: &str) -> String {
    match shell {
        ShellKind::Posix => format!("unset {}\n", name),
        ShellKind::Powershell => {
            format!("Remove-Item Env:{} -ErrorAction SilentlyContinue\n", name)
        }
    }
}

fn escape_posix(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn escape_powershell(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '$' | '`') {
            out.push('`');
        }
        out.push(c);
    }
    out
}
