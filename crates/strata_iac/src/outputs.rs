//! Dependency output queries.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use strata_core::Component;
use strata_runner::{CommandConfig, CommandRunner};

use crate::backend::to_slash;
use crate::error::{IacError, IacResult};

/// A single output value as reported by `terraform output -json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputValue {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
    List(Vec<OutputValue>),
    Map(BTreeMap<String, OutputValue>),
    #[default]
    Null,
}

impl OutputValue {
    /// Render the value as a single environment variable string.
    ///
    /// Lists join their rendered elements with `,`; maps become compact
    /// JSON; null renders empty.
    pub fn render(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::List(items) => items
                .iter()
                .map(OutputValue::render)
                .collect::<Vec<_>>()
                .join(","),
            Self::Map(_) => serde_json::to_string(self).unwrap_or_default(),
            Self::Null => String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OutputEntry {
    #[serde(default)]
    value: OutputValue,
}

/// Parse the JSON body of `terraform output -json`.
///
/// Blank output and `{}` both mean "no outputs".
pub fn parse_outputs(
    component: &str,
    stdout: &str,
) -> IacResult<BTreeMap<String, OutputValue>> {
    if stdout.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let entries: BTreeMap<String, OutputEntry> =
        serde_json::from_str(stdout).map_err(|source| IacError::OutputParse {
            component: component.to_string(),
            source,
        })?;

    Ok(entries
        .into_iter()
        .map(|(name, entry)| (name, entry.value))
        .collect())
}

/// Runs the output query against applied dependency modules.
pub struct OutputFetcher {
    runner: Arc<dyn CommandRunner>,
    binary: String,
}

impl OutputFetcher {
    pub fn new(runner: Arc<dyn CommandRunner>, binary: impl Into<String>) -> Self {
        Self {
            runner,
            binary: binary.into(),
        }
    }

    /// Outputs of `component`, reading state from `data_dir`.
    pub fn fetch(
        &self,
        component: &Component,
        data_dir: &Path,
    ) -> IacResult<BTreeMap<String, OutputValue>> {
        let cmd = CommandConfig::new(&self.binary)
            .args(["output", "-json"])
            .workdir(&component.full_path)
            .env("TF_DATA_DIR", to_slash(data_dir));

        debug!("Querying outputs of {}: {}", component.path, cmd.display_command());
        let result = self.runner.run(&cmd)?;

        if !result.success() {
            return Err(IacError::OutputCommand {
                component: component.path.clone(),
                message: format!(
                    "exit code {}: {}",
                    result.exit_code,
                    result.combined_output().trim()
                ),
            });
        }

        let outputs = parse_outputs(&component.path, &result.stdout)?;
        debug!("{} outputs from {}", outputs.len(), component.path);
        Ok(outputs)
    }
}
