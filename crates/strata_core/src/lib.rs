//! # strata_core
//!
//! Project, context and blueprint configuration for strata.
//!
//! This crate answers the questions the environment engine asks of its
//! surroundings: where the project root is, which context is active, which
//! terraform backend that context declares, and which terraform components
//! the context's blueprint contains.
//!
//! # Layout
//!
//! ```text
//! <project-root>/
//!   strata.yaml                    # optional, may hold `contexts.<name>`
//!   .strata/context                # optional, active context name
//!   terraform/<component>/*.tf
//!   contexts/<name>/
//!     strata.yaml                  # context config (wins over root entry)
//!     blueprint.yaml               # terraform components
//!     terraform/*.tfvars
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use strata_core::Project;
//! use strata_runner::OsFileSystem;
//!
//! let fs = OsFileSystem::new();
//! let project = Project::discover(&fs, &std::env::current_dir()?, None)?;
//! let config = project.load_context_config(&fs)?;
//! let blueprint = project.load_blueprint(&fs)?;
//!
//! println!("context {} uses backend {}", project.context(), config.terraform.backend.kind);
//! println!("{} components declared", blueprint.components().len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backend;
pub mod blueprint;
pub mod context;
pub mod error;
pub mod project;

pub use backend::{
    AssumeRole, AzurermBackend, BackendConfig, KubernetesBackend, S3Backend, S3Endpoints,
};
pub use blueprint::{Blueprint, Component};
pub use context::{ContextConfig, RootConfig, TerraformConfig};
pub use error::{CoreError, CoreResult};
pub use project::Project;
