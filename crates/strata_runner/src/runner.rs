//! Command runner trait and types.

use crate::config::CommandConfig;
use crate::error::RunnerResult;

/// Result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit code of the process (-1 when terminated by a signal)
    pub exit_code: i32,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
}

impl ExecutionResult {
    /// Check if execution was successful (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Get combined output (stdout + stderr).
    pub fn combined_output(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Blocking command runner.
///
/// Implementations run the command to completion and return its captured
/// output. A non-zero exit code is not an error at this layer; only a
/// failure to start the process is.
pub trait CommandRunner: Send + Sync {
    /// Run a command and wait for it to finish.
    fn run(&self, config: &CommandConfig) -> RunnerResult<ExecutionResult>;
}
