//! Context configuration models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::backend::BackendConfig;

fn default_true() -> bool {
    true
}

fn default_binary() -> String {
    "terraform".to_string()
}

/// Terraform settings of a context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerraformConfig {
    /// Whether the terraform environment is computed at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Binary used for output queries (`terraform`, `tofu`, ...)
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Backend declaration
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Default for TerraformConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            binary: default_binary(),
            backend: BackendConfig::default(),
        }
    }
}

impl TerraformConfig {
    pub fn with_backend(mut self, backend: BackendConfig) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }
}

/// Configuration of a single context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default)]
    pub terraform: TerraformConfig,
}

/// Root `strata.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RootConfig {
    /// Inline context configs, keyed by context name
    #[serde(default)]
    pub contexts: BTreeMap<String, ContextConfig>,
}
