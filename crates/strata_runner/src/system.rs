//! Blocking command runner backed by `std::process`.

use std::process::{Command, Stdio};

use tracing::debug;

use crate::config::CommandConfig;
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{CommandRunner, ExecutionResult};

/// Runs commands on the host with `std::process::Command`.
///
/// The child inherits the parent environment; variables from
/// [`CommandConfig::env`] are layered on top.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, config: &CommandConfig) -> RunnerResult<ExecutionResult> {
        let mut cmd = Command::new(&config.program);
        cmd.args(&config.args);
        cmd.envs(&config.env);
        cmd.stdin(Stdio::null());
        if let Some(dir) = &config.workdir {
            cmd.current_dir(dir);
        }

        debug!(
            "Executing: {} (in {:?})",
            config.display_command(),
            config.workdir
        );

        let output = cmd.output().map_err(|source| RunnerError::Spawn {
            program: config.program.clone(),
            source,
        })?;

        let result = ExecutionResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!("{} exited with {}", config.program, result.exit_code);
        Ok(result)
    }
}
