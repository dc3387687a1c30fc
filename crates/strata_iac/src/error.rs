//! Error types for the terraform environment engine.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for IaC operations.
pub type IacResult<T> = Result<T, IacError>;

/// Errors that can occur while computing the terraform environment.
///
/// All of them abort the current computation; none are retried.
#[derive(Error, Debug)]
pub enum IacError {
    #[error("error resolving terraform project path: {0}")]
    ProjectPath(#[source] std::io::Error),

    #[error("error retrieving config root: {0}")]
    ConfigRoot(#[from] strata_core::CoreError),

    #[error("unsupported backend: {0}")]
    UnsupportedBackend(String),

    #[error("error processing {kind} backend config: {source}")]
    BackendAttributes {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("error checking file {path}: {source}")]
    VarFileStat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("circular dependency detected at {0}")]
    CircularDependency(String),

    #[error("dependency {dependency} of component {component} does not exist")]
    MissingDependency {
        component: String,
        dependency: String,
    },

    #[error("failed to run output query for {component}: {message}")]
    OutputCommand { component: String, message: String },

    #[error("failed to parse output for {component}: {source}")]
    OutputParse {
        component: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("error writing backend override {path}: {source}")]
    OverrideWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error removing backend override {path}: {source}")]
    OverrideRemove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error generating terraform args: {0}")]
    GenerateArgs(#[source] Box<IacError>),

    #[error("error collecting dependency outputs: {0}")]
    DependencyOutputs(#[source] Box<IacError>),

    #[error("Runner error: {0}")]
    Runner(#[from] strata_runner::RunnerError),
}

impl IacError {
    /// Wrap an argument-generation failure.
    pub fn generate_args(cause: IacError) -> Self {
        Self::GenerateArgs(Box::new(cause))
    }

    /// Wrap a dependency resolution or output query failure.
    pub fn dependency_outputs(cause: IacError) -> Self {
        Self::DependencyOutputs(Box::new(cause))
    }
}
