//! Command configuration types.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Description of a single external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandConfig {
    /// Program to execute (looked up on `PATH`)
    pub program: String,
    /// Arguments passed to the program
    pub args: Vec<String>,
    /// Working directory for the child process
    pub workdir: Option<PathBuf>,
    /// Extra environment variables layered over the inherited environment
    pub env: BTreeMap<String, String>,
}

impl CommandConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            workdir: None,
            env: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Render the command line for logging.
    pub fn display_command(&self) -> String {
        let mut cmd = self.program.clone();
        for arg in &self.args {
            if arg.contains(' ') || arg.contains('=') {
                cmd.push_str(&format!(" '{}'", arg));
            } else {
                cmd.push_str(&format!(" {}", arg));
            }
        }
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_args_and_env() {
        let config = CommandConfig::new("terraform")
            .args(["output", "-json"])
            .workdir("/tmp/module")
            .env("TF_DATA_DIR", "/tmp/data");

        assert_eq!(config.args, vec!["output", "-json"]);
        assert_eq!(config.workdir, Some(PathBuf::from("/tmp/module")));
        assert_eq!(config.env.get("TF_DATA_DIR").map(String::as_str), Some("/tmp/data"));
    }

    #[test]
    fn test_display_command_quotes_assignments() {
        let config = CommandConfig::new("terraform")
            .arg("init")
            .arg("-backend-config=path=/x");

        assert_eq!(config.display_command(), "terraform init '-backend-config=path=/x'");
    }
}
