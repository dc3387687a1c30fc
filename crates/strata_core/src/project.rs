//! Project root discovery and context selection.

use std::io;
use std::path::{Path, PathBuf};

use strata_runner::{FileKind, FileSystem};
use tracing::debug;

use crate::blueprint::Blueprint;
use crate::context::{ContextConfig, RootConfig};
use crate::error::{CoreError, CoreResult};

/// File names that mark a project root, in lookup order.
pub const PROJECT_FILES: [&str; 2] = ["strata.yaml", "strata.yml"];

/// Context used when nothing else selects one.
pub const DEFAULT_CONTEXT: &str = "local";

/// A project root paired with its active context.
///
/// Every lookup goes through the [`FileSystem`] handed to the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    root: PathBuf,
    context: String,
}

impl Project {
    /// Create a project for an explicit root and context.
    pub fn new(root: impl Into<PathBuf>, context: impl Into<String>) -> CoreResult<Self> {
        let context = context.into();
        validate_context_name(&context)?;
        Ok(Self {
            root: root.into(),
            context,
        })
    }

    /// Locate the project containing `start`.
    ///
    /// The root is the nearest ancestor holding a `strata.yaml`, or `start`
    /// itself when there is none. The context is `context` if given, then
    /// the `.strata/context` file, then [`DEFAULT_CONTEXT`].
    pub fn discover(fs: &dyn FileSystem, start: &Path, context: Option<&str>) -> CoreResult<Self> {
        let root = find_project_root(fs, start).unwrap_or_else(|| start.to_path_buf());
        debug!("Project root: {:?}", root);

        let context = match context.map(str::trim).filter(|c| !c.is_empty()) {
            Some(c) => c.to_string(),
            None => read_context_file(fs, &root)?.unwrap_or_else(|| DEFAULT_CONTEXT.to_string()),
        };

        Self::new(root, context)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// `<root>/contexts/<context>`
    pub fn config_root(&self) -> PathBuf {
        self.root.join("contexts").join(&self.context)
    }

    /// Load the active context's config.
    ///
    /// `contexts/<name>/strata.yaml` wins over a `contexts.<name>` entry in
    /// the root file; with neither present the defaults apply.
    pub fn load_context_config(&self, fs: &dyn FileSystem) -> CoreResult<ContextConfig> {
        for name in PROJECT_FILES {
            let path = self.config_root().join(name);
            if let Some(content) = read_optional(fs, &path)? {
                debug!("Reading context config from {:?}", path);
                return parse_yaml(&content, &path);
            }
        }

        for name in PROJECT_FILES {
            let path = self.root.join(name);
            if let Some(content) = read_optional(fs, &path)? {
                debug!("Reading root config from {:?}", path);
                let root: RootConfig = parse_yaml(&content, &path)?;
                return Ok(root.contexts.get(&self.context).cloned().unwrap_or_default());
            }
        }

        debug!("No config found for context {}, using defaults", self.context);
        Ok(ContextConfig::default())
    }

    /// Load `contexts/<name>/blueprint.yaml`; a missing file is an empty blueprint.
    pub fn load_blueprint(&self, fs: &dyn FileSystem) -> CoreResult<Blueprint> {
        let path = self.config_root().join("blueprint.yaml");
        match read_optional(fs, &path)? {
            Some(content) => {
                debug!("Reading blueprint from {:?}", path);
                Blueprint::parse(&content, &path, &self.root)
            }
            None => Ok(Blueprint::default()),
        }
    }
}

/// Nearest ancestor of `start` (inclusive) containing a project file.
pub fn find_project_root(fs: &dyn FileSystem, start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| {
            PROJECT_FILES
                .iter()
                .any(|name| matches!(fs.stat(&dir.join(name)), Ok(FileKind::File)))
        })
        .map(Path::to_path_buf)
}

fn read_context_file(fs: &dyn FileSystem, root: &Path) -> CoreResult<Option<String>> {
    let path = root.join(".strata").join("context");
    Ok(read_optional(fs, &path)?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn validate_context_name(name: &str) -> CoreResult<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.chars().any(char::is_whitespace);
    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidContext(name.to_string()))
    }
}

fn read_optional(fs: &dyn FileSystem, path: &Path) -> CoreResult<Option<String>> {
    match fs.read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(CoreError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse_yaml<T>(content: &str, path: &Path) -> CoreResult<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str(content).map_err(|source| CoreError::InvalidConfig {
        path: path.to_path_buf(),
        source,
    })
}
