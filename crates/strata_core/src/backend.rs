//! Terraform backend declarations.
//!
//! Each backend kind has its own attribute struct. Unset attributes are
//! skipped on serialization so only what the user declared ends up as
//! `-backend-config` arguments. Attributes without a typed field are kept
//! verbatim in `extra` and serialized alongside the typed ones.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_kind() -> String {
    "local".to_string()
}

/// The `terraform.backend` block of a context config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend kind (`local`, `s3`, `kubernetes`, `azurerm`, `none`)
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    /// Prefix prepended to every state key / path / secret suffix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Backend>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes: Option<KubernetesBackend>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azurerm: Option<AzurermBackend>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::of_kind(default_kind())
    }
}

impl BackendConfig {
    pub fn of_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            prefix: None,
            s3: None,
            kubernetes: None,
            azurerm: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_s3(mut self, s3: S3Backend) -> Self {
        self.s3 = Some(s3);
        self
    }

    pub fn with_kubernetes(mut self, kubernetes: KubernetesBackend) -> Self {
        self.kubernetes = Some(kubernetes);
        self
    }

    pub fn with_azurerm(mut self, azurerm: AzurermBackend) -> Self {
        self.azurerm = Some(azurerm);
        self
    }

    /// Prefix with an empty string treated as unset.
    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or("")
    }
}

/// Attributes of the `s3` backend. `key` is always computed, never declared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct S3Backend {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamodb_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypt: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_lockfile: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_path_style: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_credentials_validation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_region_validation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_credentials_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<S3Endpoints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assume_role: Option<AssumeRole>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Custom service endpoints for S3-compatible stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct S3Endpoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamodb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sts: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssumeRole {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Attributes of the `kubernetes` backend. `secret_suffix` is always computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KubernetesBackend {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_cluster_config: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Attributes of the `azurerm` backend. `key` is always computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AzurermBackend {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_azuread_auth: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_oidc: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
