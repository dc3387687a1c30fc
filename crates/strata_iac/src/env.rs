//! Terraform environment printer.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tracing::{debug, info, warn};

use strata_core::{Blueprint, ContextConfig, Project};
use strata_runner::Shims;

use crate::args::{data_dir, ArgsAssembler, TerraformArgs};
use crate::backend::to_slash;
use crate::backend_override::{BackendOverrideWriter, OverrideAction};
use crate::error::{IacError, IacResult};
use crate::graph::ComponentGraph;
use crate::locator::ProjectLocator;
use crate::outputs::OutputFetcher;

/// Flat variable name to value mapping handed to the caller.
pub type EnvironmentVariableSet = BTreeMap<String, String>;

/// Prefix of variables terraform reads as input variables.
pub const TF_VAR_PREFIX: &str = "TF_VAR_";

/// Variable listing the names exported by the previous computation.
pub const MANAGED_ENV_VAR: &str = "STRATA_MANAGED_ENV";

const CONTEXT_PATH_VAR: &str = "TF_VAR_context_path";
const OS_TYPE_VAR: &str = "TF_VAR_os_type";

struct Prepared {
    config: ContextConfig,
    blueprint: Blueprint,
    args: TerraformArgs,
}

/// Computes the terraform environment for the module in a directory.
///
/// Configuration and blueprint are reloaded on every call.
pub struct TerraformEnv {
    shims: Shims,
    project: Project,
}

impl TerraformEnv {
    pub fn new(shims: Shims, project: Project) -> Self {
        Self { shims, project }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Variables for the module in the working directory.
    pub fn get_env_vars(&self) -> IacResult<EnvironmentVariableSet> {
        let cwd = self.shims.fs.current_dir().map_err(IacError::ProjectPath)?;
        self.get_env_vars_in(&cwd)
    }

    /// Variables for the module in `dir`.
    ///
    /// Empty when terraform is disabled or `dir` is not a module.
    pub fn get_env_vars_in(&self, dir: &Path) -> IacResult<EnvironmentVariableSet> {
        let Some(prepared) = self.prepare(dir)? else {
            return Ok(EnvironmentVariableSet::new());
        };
        let Prepared {
            config,
            blueprint,
            args,
        } = prepared;

        let mut vars = args.env_vars();
        vars.insert(
            CONTEXT_PATH_VAR.to_string(),
            to_slash(&self.project.config_root()),
        );
        vars.insert(OS_TYPE_VAR.to_string(), os_type().to_string());

        let outputs = self
            .dependency_outputs(&args.module_path, &config, &blueprint)
            .map_err(IacError::dependency_outputs)?;
        for (name, value) in outputs {
            let key = format!("{}{}", TF_VAR_PREFIX, name);
            if key == CONTEXT_PATH_VAR || key == OS_TYPE_VAR {
                warn!("Ignoring dependency output {:?}, the name is reserved", name);
                continue;
            }
            vars.insert(key, value);
        }

        info!(
            "Computed {} terraform variables for {}",
            vars.len(),
            args.module_path
        );
        Ok(vars)
    }

    /// Argument sets for the module in `dir`, or `None` when there is nothing
    /// to compute.
    pub fn terraform_args_in(&self, dir: &Path) -> IacResult<Option<TerraformArgs>> {
        Ok(self.prepare(dir)?.map(|p| p.args))
    }

    fn prepare(&self, dir: &Path) -> IacResult<Option<Prepared>> {
        let config = self.project.load_context_config(self.shims.fs.as_ref())?;
        if !config.terraform.enabled {
            debug!("Terraform is disabled for context {}", self.project.context());
            return Ok(None);
        }

        let module_path = ProjectLocator::new(self.shims.fs.clone()).locate_from(dir)?;
        if module_path.is_empty() {
            return Ok(None);
        }

        let blueprint = self.project.load_blueprint(self.shims.fs.as_ref())?;
        let parallelism = blueprint.get(&module_path).and_then(|c| c.parallelism);

        let args = ArgsAssembler::new(self.shims.fs.clone())
            .assemble(
                &module_path,
                &self.project.config_root(),
                &config.terraform.backend,
                parallelism,
            )
            .map_err(IacError::generate_args)?;

        Ok(Some(Prepared {
            config,
            blueprint,
            args,
        }))
    }

    /// Rendered outputs of the direct dependencies of `module_path`.
    ///
    /// Later-declared dependencies win on name collisions.
    fn dependency_outputs(
        &self,
        module_path: &str,
        config: &ContextConfig,
        blueprint: &Blueprint,
    ) -> IacResult<BTreeMap<String, String>> {
        let graph = ComponentGraph::new(blueprint.components());
        let deps = graph.resolve(module_path)?;

        let fetcher = OutputFetcher::new(self.shims.runner.clone(), &config.terraform.binary);
        let config_root = self.project.config_root();
        let mut rendered = BTreeMap::new();
        let mut origin: BTreeMap<String, &str> = BTreeMap::new();

        for dep in deps {
            let outputs = fetcher.fetch(dep, &data_dir(&config_root, &dep.path))?;
            for (name, value) in outputs {
                if let Some(previous) = origin.insert(name.clone(), dep.path.as_str()) {
                    warn!(
                        "Output {:?} of {} overrides the one from {}",
                        name, dep.path, previous
                    );
                }
                rendered.insert(name, value.render());
            }
        }

        Ok(rendered)
    }

    /// Keep `backend_override.tf` in `dir` (or the working directory) in
    /// sync with the configured backend.
    pub fn sync_backend_override(&self, dir: Option<&Path>) -> IacResult<OverrideAction> {
        let config = self.project.load_context_config(self.shims.fs.as_ref())?;
        let writer = BackendOverrideWriter::new(self.shims.fs.clone());
        match dir {
            Some(dir) => writer.sync(dir, &config.terraform.backend),
            None => writer.sync_current(&config.terraform.backend),
        }
    }
}

/// Operating system name in the form terraform modules expect.
pub fn os_type() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// Comma-separated names of `vars`, stored in [`MANAGED_ENV_VAR`].
pub fn managed_list(vars: &EnvironmentVariableSet) -> String {
    vars.keys().cloned().collect::<Vec<_>>().join(",")
}

/// Names exported previously (per `previous`, a [`managed_list`] value)
/// that the fresh computation no longer produces.
pub fn stale_vars(previous: Option<&str>, computed: &EnvironmentVariableSet) -> Vec<String> {
    let previous: BTreeSet<&str> = previous
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();

    previous
        .into_iter()
        .filter(|name| !computed.contains_key(*name))
        .map(str::to_string)
        .collect()
}
