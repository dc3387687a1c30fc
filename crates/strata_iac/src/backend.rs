//! Backend configuration arguments.
//!
//! Produces the ordered `-backend-config` payloads for `terraform init`.
//! Order matters: terraform lets later values override earlier ones, so the
//! static `backend.tfvars` file always comes first and computed keys follow.

use std::io;
use std::path::{Path, MAIN_SEPARATOR};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use strata_core::{AzurermBackend, BackendConfig, KubernetesBackend, S3Backend};
use strata_runner::FileSystem;

use crate::error::{IacError, IacResult};

/// Static backend settings file, relative to `<config-root>/terraform`.
pub const BACKEND_TFVARS: &str = "backend.tfvars";

/// Maximum length of a Kubernetes object name.
pub const K8S_NAME_MAX: usize = 63;

/// A backend kind with its own attribute set.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendSpec {
    Local,
    S3(S3Backend),
    Kubernetes(KubernetesBackend),
    Azurerm(AzurermBackend),
    None,
}

impl BackendSpec {
    /// Select the variant named by `config.kind`. Unknown kinds are an error.
    pub fn from_config(config: &BackendConfig) -> IacResult<Self> {
        match config.kind.as_str() {
            "local" => Ok(Self::Local),
            "s3" => Ok(Self::S3(config.s3.clone().unwrap_or_default())),
            "kubernetes" => Ok(Self::Kubernetes(
                config.kubernetes.clone().unwrap_or_default(),
            )),
            "azurerm" => Ok(Self::Azurerm(config.azurerm.clone().unwrap_or_default())),
            "none" => Ok(Self::None),
            other => Err(IacError::UnsupportedBackend(other.to_string())),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::S3(_) => "s3",
            Self::Kubernetes(_) => "kubernetes",
            Self::Azurerm(_) => "azurerm",
            Self::None => "none",
        }
    }
}

/// Builds backend configuration arguments for a module.
pub struct BackendConfigBuilder {
    fs: Arc<dyn FileSystem>,
}

impl BackendConfigBuilder {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Backend arguments for `module_path`, in override order.
    ///
    /// Each entry is a bare payload (`path=...`, `key=...`, or a file path);
    /// callers add the `-backend-config=` flag.
    pub fn build(
        &self,
        module_path: &str,
        config_root: &Path,
        backend: &BackendConfig,
    ) -> IacResult<Vec<String>> {
        let spec = BackendSpec::from_config(backend)?;
        let prefix = backend.prefix();
        let mut args = Vec::new();

        let tfvars = config_root.join("terraform").join(BACKEND_TFVARS);
        match self.fs.stat(&tfvars) {
            Ok(_) => args.push(to_slash(&tfvars)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(IacError::VarFileStat {
                    path: tfvars,
                    source,
                })
            }
        }

        match &spec {
            BackendSpec::Local => {
                args.push(format!(
                    "path={}/.tfstate/{}{}/terraform.tfstate",
                    to_slash(config_root),
                    prefix,
                    module_path
                ));
            }
            BackendSpec::S3(attrs) => {
                args.push(format!("key={}", state_key(prefix, module_path)));
                args.extend(flatten_backend(spec.kind(), attrs, "key")?);
            }
            BackendSpec::Kubernetes(attrs) => {
                let prefix = prefix.trim_matches('/');
                let suffix = if prefix.is_empty() {
                    module_path.to_string()
                } else {
                    format!("{}-{}", prefix, module_path)
                };
                args.push(format!("secret_suffix={}", sanitize_for_k8s(&suffix)));
                args.extend(flatten_backend(spec.kind(), attrs, "secret_suffix")?);
            }
            BackendSpec::Azurerm(attrs) => {
                args.push(format!("key={}", state_key(prefix, module_path)));
                args.extend(flatten_backend(spec.kind(), attrs, "key")?);
            }
            BackendSpec::None => {}
        }

        debug!(
            "Backend {} args for {}: {:?}",
            spec.kind(),
            module_path,
            args
        );
        Ok(args)
    }
}

/// `<prefix><module>/terraform.tfstate`. The prefix is used verbatim, so a
/// directory-style prefix must carry its own trailing `/`.
pub fn state_key(prefix: &str, module_path: &str) -> String {
    format!("{}{}/terraform.tfstate", prefix, module_path)
}

/// Path rendered with forward slashes.
pub fn to_slash(path: &Path) -> String {
    let s = path.to_string_lossy();
    if MAIN_SEPARATOR == '/' {
        s.into_owned()
    } else {
        s.replace(MAIN_SEPARATOR, "/")
    }
}

/// Flatten declared attributes, dropping `computed`, which the builder
/// always emits itself.
fn flatten_backend<T: Serialize>(
    kind: &str,
    attrs: &T,
    computed: &str,
) -> IacResult<Vec<String>> {
    let mut value =
        serde_json::to_value(attrs).map_err(|source| IacError::BackendAttributes {
            kind: kind.to_string(),
            source,
        })?;
    if let Some(declared) = value.as_object_mut().and_then(|map| map.remove(computed)) {
        warn!(
            "Ignoring declared {} backend attribute {}={}, it is computed per module",
            kind, computed, declared
        );
    }
    Ok(flatten_attributes(&value))
}

/// Flatten an attribute tree into sorted `key=value` pairs.
///
/// Nested objects join keys with `.`, arrays repeat the key once per
/// element, nulls are dropped. Pairs are sorted by key; repeated keys keep
/// their element order.
pub fn flatten_attributes(value: &Value) -> Vec<String> {
    let mut pairs = Vec::new();
    flatten_into("", value, &mut pairs);
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect()
}

fn flatten_into(key: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let child = if key.is_empty() {
                    k.clone()
                } else {
                    format!("{}.{}", key, k)
                };
                flatten_into(&child, v, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                flatten_into(key, item, out);
            }
        }
        Value::Null => {}
        _ if key.is_empty() => {}
        Value::String(s) => out.push((key.to_string(), s.clone())),
        Value::Bool(b) => out.push((key.to_string(), b.to_string())),
        Value::Number(n) => out.push((key.to_string(), n.to_string())),
    }
}

/// Make `input` usable as a Kubernetes object name.
///
/// Lowercases, maps every character outside `[a-z0-9]` to `-`, collapses
/// runs of `-`, trims `-` from both ends and truncates to 63 characters.
/// The result always matches `[a-z0-9]([a-z0-9-]*[a-z0-9])?`; input with
/// no usable characters yields `default`.
pub fn sanitize_for_k8s(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }

    out.truncate(K8S_NAME_MAX);
    while out.ends_with('-') {
        out.pop();
    }

    if out.is_empty() {
        "default".to_string()
    } else {
        out
    }
}
