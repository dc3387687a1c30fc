//! # strata_iac
//!
//! Terraform environment and dependency resolution.
//!
//! For the module the user is standing in, this crate computes everything
//! the `terraform` CLI needs: `TF_DATA_DIR`, per-subcommand `TF_CLI_ARGS_*`
//! (backend config, var files, plan file, parallelism) and one `TF_VAR_*`
//! per output of each direct dependency.
//!
//! ## Flow
//!
//! ```text
//! ProjectLocator -> ArgsAssembler (BackendConfigBuilder, var files)
//!                -> ComponentGraph::resolve -> OutputFetcher
//!                -> EnvironmentVariableSet
//! ```
//!
//! [`BackendOverrideWriter`] runs separately to keep `backend_override.tf`
//! in sync with the configured backend kind.
//!
//! All filesystem and process access goes through
//! [`strata_runner::Shims`].

pub mod args;
pub mod backend;
pub mod backend_override;
pub mod env;
pub mod error;
pub mod graph;
pub mod locator;
pub mod outputs;

#[cfg(test)]
mod test_support;

pub use args::{ArgsAssembler, TerraformArgs, TerraformCommand};
pub use backend::{sanitize_for_k8s, BackendConfigBuilder, BackendSpec};
pub use backend_override::{BackendOverrideWriter, OverrideAction, OVERRIDE_FILE};
pub use env::{
    managed_list, stale_vars, EnvironmentVariableSet, TerraformEnv, MANAGED_ENV_VAR,
};
pub use error::{IacError, IacResult};
pub use graph::ComponentGraph;
pub use locator::ProjectLocator;
pub use outputs::{OutputFetcher, OutputValue};
