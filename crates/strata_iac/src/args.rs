//! Terraform CLI argument assembly.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use strata_core::BackendConfig;
use strata_runner::FileSystem;

use crate::backend::{to_slash, BackendConfigBuilder};
use crate::error::{IacError, IacResult};

/// Plan file name inside a module's data directory.
pub const PLAN_FILE: &str = "terraform.tfplan";

/// Var file suffixes, in the order terraform should load them.
pub const VAR_FILE_SUFFIXES: [&str; 4] = [
    "_generated.tfvars",
    "_generated.tfvars.json",
    ".tfvars",
    ".tfvars.json",
];

/// Terraform subcommands that receive generated arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TerraformCommand {
    Init,
    Plan,
    Apply,
    Refresh,
    Import,
    Destroy,
}

impl TerraformCommand {
    pub const ALL: [TerraformCommand; 6] = [
        Self::Init,
        Self::Plan,
        Self::Apply,
        Self::Refresh,
        Self::Import,
        Self::Destroy,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Plan => "plan",
            Self::Apply => "apply",
            Self::Refresh => "refresh",
            Self::Import => "import",
            Self::Destroy => "destroy",
        }
    }

    /// `TF_CLI_ARGS_<name>`
    pub fn env_var(&self) -> String {
        format!("TF_CLI_ARGS_{}", self.name())
    }
}

/// One CLI argument, kept structured so it can be rendered raw or quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CliArg {
    Flag(&'static str),
    Value(&'static str, String),
    Positional(String),
}

impl CliArg {
    fn raw(&self) -> String {
        match self {
            Self::Flag(flag) => flag.to_string(),
            Self::Value(flag, value) => format!("{}={}", flag, value),
            Self::Positional(value) => value.clone(),
        }
    }

    fn quoted(&self) -> String {
        match self {
            Self::Flag(flag) => flag.to_string(),
            Self::Value(flag, value) if is_numeric(value) => format!("{}={}", flag, value),
            Self::Value(flag, value) => format!("{}={}", flag, quote(value)),
            Self::Positional(value) => quote(value),
        }
    }
}

fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Everything terraform needs to run against one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerraformArgs {
    pub module_path: String,
    /// `TF_DATA_DIR` for the module
    pub tf_data_dir: String,
    pub plan_file: String,
    /// Bare `-backend-config` payloads, in override order
    pub backend_config: Vec<String>,
    /// Existing var files, in load order
    pub var_files: Vec<String>,
    pub parallelism: Option<u32>,
    commands: BTreeMap<TerraformCommand, Vec<CliArg>>,
}

impl TerraformArgs {
    /// Unquoted argument list for direct invocation.
    pub fn args(&self, command: TerraformCommand) -> Vec<String> {
        self.commands
            .get(&command)
            .map(|args| args.iter().map(CliArg::raw).collect())
            .unwrap_or_default()
    }

    /// Space-joined, quoted form used for `TF_CLI_ARGS_*`.
    pub fn env_string(&self, command: TerraformCommand) -> String {
        self.commands
            .get(&command)
            .map(|args| {
                args.iter()
                    .map(CliArg::quoted)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }

    /// `TF_DATA_DIR` plus one `TF_CLI_ARGS_*` per command.
    pub fn env_vars(&self) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        vars.insert("TF_DATA_DIR".to_string(), self.tf_data_dir.clone());
        for command in TerraformCommand::ALL {
            vars.insert(command.env_var(), self.env_string(command));
        }
        vars
    }
}

/// Combines backend args, var files and parallelism into [`TerraformArgs`].
pub struct ArgsAssembler {
    fs: Arc<dyn FileSystem>,
    backend: BackendConfigBuilder,
}

impl ArgsAssembler {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            backend: BackendConfigBuilder::new(Arc::clone(&fs)),
            fs,
        }
    }

    /// Assemble arguments for `module_path`.
    ///
    /// `parallelism` must come from the module's own declaration; no flag is
    /// emitted when it is `None`.
    pub fn assemble(
        &self,
        module_path: &str,
        config_root: &Path,
        backend: &BackendConfig,
        parallelism: Option<u32>,
    ) -> IacResult<TerraformArgs> {
        let data_dir = data_dir(config_root, module_path);
        let tf_data_dir = to_slash(&data_dir);
        let plan_file = to_slash(&data_dir.join(PLAN_FILE));
        let backend_config = self.backend.build(module_path, config_root, backend)?;
        let var_files = self.var_files(module_path, config_root)?;

        let var_args = || {
            var_files
                .iter()
                .map(|f| CliArg::Value("-var-file", f.clone()))
                .collect::<Vec<_>>()
        };
        let parallelism_arg = parallelism.map(|n| CliArg::Value("-parallelism", n.to_string()));

        let mut init = vec![
            CliArg::Flag("-backend=true"),
            CliArg::Flag("-force-copy"),
            CliArg::Flag("-upgrade"),
        ];
        init.extend(
            backend_config
                .iter()
                .map(|a| CliArg::Value("-backend-config", a.clone())),
        );

        let mut plan = vec![CliArg::Value("-out", plan_file.clone())];
        plan.extend(var_args());

        let mut apply: Vec<CliArg> = parallelism_arg.iter().cloned().collect();
        apply.push(CliArg::Positional(plan_file.clone()));

        let mut destroy = var_args();
        destroy.extend(parallelism_arg.iter().cloned());
        destroy.push(CliArg::Flag("-auto-approve"));

        let commands = BTreeMap::from([
            (TerraformCommand::Init, init),
            (TerraformCommand::Plan, plan),
            (TerraformCommand::Apply, apply),
            (TerraformCommand::Refresh, var_args()),
            (TerraformCommand::Import, var_args()),
            (TerraformCommand::Destroy, destroy),
        ]);

        debug!(
            "Assembled terraform args for {} ({} var files, parallelism {:?})",
            module_path,
            var_files.len(),
            parallelism
        );

        Ok(TerraformArgs {
            module_path: module_path.to_string(),
            tf_data_dir,
            plan_file,
            backend_config,
            var_files,
            parallelism,
            commands,
        })
    }

    /// Var files under `<config-root>/terraform` that exist for the module.
    fn var_files(&self, module_path: &str, config_root: &Path) -> IacResult<Vec<String>> {
        let dir = config_root.join("terraform");
        let mut found = Vec::new();

        for suffix in VAR_FILE_SUFFIXES {
            let path = dir.join(format!("{}{}", module_path, suffix));
            match self.fs.stat(&path) {
                Ok(_) => found.push(to_slash(&path)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(IacError::VarFileStat { path, source }),
            }
        }

        Ok(found)
    }
}

/// `<config-root>/.terraform/<module>`
pub fn data_dir(config_root: &Path, module_path: &str) -> std::path::PathBuf {
    config_root.join(".terraform").join(module_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;

    use strata_runner::FileKind;

    use crate::test_support::{denied, MockFs};

    /// Filesystem where only `existing` paths exist.
    fn fs_with(existing: &[&str]) -> Arc<MockFs> {
        let existing: HashSet<PathBuf> = existing.iter().map(PathBuf::from).collect();
        let mut fs = MockFs::new();
        fs.expect_stat().returning(move |p| {
            if existing.contains(p) {
                Ok(FileKind::File)
            } else {
                Err(io::Error::from(io::ErrorKind::NotFound))
            }
        });
        Arc::new(fs)
    }

    fn assemble(existing: &[&str], parallelism: Option<u32>) -> TerraformArgs {
        ArgsAssembler::new(fs_with(existing))
            .assemble(
                "project/path",
                Path::new("/ctx"),
                &BackendConfig::default(),
                parallelism,
            )
            .unwrap()
    }

    #[test]
    fn test_paths() {
        let args = assemble(&[], None);
        assert_eq!(args.tf_data_dir, "/ctx/.terraform/project/path");
        assert_eq!(args.plan_file, "/ctx/.terraform/project/path/terraform.tfplan");
    }

    #[test]
    fn test_init_args() {
        let args = assemble(&["/ctx/terraform/backend.tfvars"], None);
        assert_eq!(
            args.args(TerraformCommand::Init),
            vec![
                "-backend=true",
                "-force-copy",
                "-upgrade",
                "-backend-config=/ctx/terraform/backend.tfvars",
                "-backend-config=path=/ctx/.tfstate/project/path/terraform.tfstate",
            ]
        );
        assert_eq!(
            args.env_string(TerraformCommand::Init),
            "-backend=true -force-copy -upgrade \
             -backend-config=\"/ctx/terraform/backend.tfvars\" \
             -backend-config=\"path=/ctx/.tfstate/project/path/terraform.tfstate\""
        );
    }

    #[test]
    fn test_var_files_in_load_order() {
        let args = assemble(
            &[
                "/ctx/terraform/project/path.tfvars.json",
                "/ctx/terraform/project/path_generated.tfvars",
                "/ctx/terraform/project/path.tfvars",
            ],
            None,
        );

        assert_eq!(
            args.var_files,
            vec![
                "/ctx/terraform/project/path_generated.tfvars",
                "/ctx/terraform/project/path.tfvars",
                "/ctx/terraform/project/path.tfvars.json",
            ]
        );
        assert_eq!(
            args.args(TerraformCommand::Plan),
            vec![
                "-out=/ctx/.terraform/project/path/terraform.tfplan",
                "-var-file=/ctx/terraform/project/path_generated.tfvars",
                "-var-file=/ctx/terraform/project/path.tfvars",
                "-var-file=/ctx/terraform/project/path.tfvars.json",
            ]
        );
        assert_eq!(
            args.args(TerraformCommand::Refresh),
            args.args(TerraformCommand::Import)
        );
        assert_eq!(args.args(TerraformCommand::Refresh).len(), 3);
    }

    #[test]
    fn test_parallelism_ordering() {
        let args = assemble(&["/ctx/terraform/project/path.tfvars"], Some(5));

        let apply = args.args(TerraformCommand::Apply);
        assert_eq!(apply.first().map(String::as_str), Some("-parallelism=5"));
        assert_eq!(apply.last(), Some(&args.plan_file));

        assert_eq!(
            args.args(TerraformCommand::Destroy),
            vec![
                "-var-file=/ctx/terraform/project/path.tfvars",
                "-parallelism=5",
                "-auto-approve",
            ]
        );
        assert_eq!(
            args.env_string(TerraformCommand::Apply),
            "-parallelism=5 \"/ctx/.terraform/project/path/terraform.tfplan\""
        );
    }

    #[test]
    fn test_no_parallelism_flag_without_hint() {
        let args = assemble(&[], None);
        for command in TerraformCommand::ALL {
            assert!(
                !args.env_string(command).contains("-parallelism"),
                "{} has a parallelism flag",
                command.name()
            );
        }
        assert_eq!(args.args(TerraformCommand::Destroy), vec!["-auto-approve"]);
        assert_eq!(
            args.args(TerraformCommand::Apply),
            vec!["/ctx/.terraform/project/path/terraform.tfplan"]
        );
    }

    #[test]
    fn test_env_vars_cover_every_command() {
        let vars = assemble(&[], None).env_vars();
        assert_eq!(vars["TF_DATA_DIR"], "/ctx/.terraform/project/path");
        for name in ["init", "plan", "apply", "refresh", "import", "destroy"] {
            assert!(vars.contains_key(&format!("TF_CLI_ARGS_{name}")), "{name}");
        }
        assert_eq!(vars["TF_CLI_ARGS_refresh"], "");
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote(r#"a "b" \c"#), r#""a \"b\" \\c""#);
    }

    #[test]
    fn test_var_file_stat_failure_is_fatal() {
        let mut fs = MockFs::new();
        fs.expect_stat().returning(|p| {
            if p.ends_with("backend.tfvars") {
                Err(io::Error::from(io::ErrorKind::NotFound))
            } else {
                Err(denied())
            }
        });

        let err = ArgsAssembler::new(Arc::new(fs))
            .assemble("vpc", Path::new("/ctx"), &BackendConfig::default(), None)
            .unwrap_err();
        assert!(
            matches!(&err, IacError::VarFileStat { path, .. } if path.ends_with("vpc_generated.tfvars"))
        );
    }
}
