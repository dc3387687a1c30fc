//! Blueprint component declarations.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A declared terraform module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Logical, slash-separated path. Unique within a blueprint.
    pub path: String,
    /// Directory holding the module's sources
    pub full_path: PathBuf,
    /// Paths of the components this one reads outputs from, in declared order
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Optional `-parallelism` hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallelism: Option<u32>,
    /// Remote module source, when the module is not vendored in the project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Component {
    pub fn new(path: impl Into<String>, full_path: impl Into<PathBuf>) -> Self {
        Self {
            path: normalize_component_path(&path.into()),
            full_path: full_path.into(),
            depends_on: Vec::new(),
            parallelism: None,
            source: None,
        }
    }

    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for dep in deps {
            let dep = normalize_component_path(&dep.into());
            if !self.depends_on.contains(&dep) {
                self.depends_on.push(dep);
            }
        }
        self
    }

    pub fn parallelism(mut self, parallelism: u32) -> Self {
        self.parallelism = Some(parallelism);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Raw component entry as written in `blueprint.yaml`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComponentDecl {
    path: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    full_path: Option<PathBuf>,
    #[serde(default)]
    depends_on: Vec<String>,
    #[serde(default)]
    parallelism: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct BlueprintFile {
    #[serde(default)]
    terraform: Vec<ComponentDecl>,
}

/// The set of terraform components declared for a context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blueprint {
    components: Vec<Component>,
}

impl Blueprint {
    /// Build a blueprint, rejecting duplicate paths and zero parallelism.
    pub fn new(components: Vec<Component>) -> CoreResult<Self> {
        validate_components(&components)?;
        Ok(Self { components })
    }

    /// Parse `blueprint.yaml` content read from `source`, resolving full
    /// paths against `project_root`.
    pub fn parse(content: &str, source: &Path, project_root: &Path) -> CoreResult<Self> {
        let file: BlueprintFile = if content.trim().is_empty() {
            BlueprintFile::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| CoreError::InvalidConfig {
                path: source.to_path_buf(),
                source: e,
            })?
        };

        let components = file
            .terraform
            .into_iter()
            .map(|decl| decl.into_component(project_root))
            .collect();

        Self::new(components)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn get(&self, path: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.path == path)
    }

    pub fn into_components(self) -> Vec<Component> {
        self.components
    }
}

impl ComponentDecl {
    fn into_component(self, project_root: &Path) -> Component {
        let path = normalize_component_path(&self.path);
        let full_path = match self.full_path {
            Some(p) if p.is_absolute() => p,
            Some(p) => project_root.join(p),
            None if self.source.is_some() => project_root
                .join(".strata")
                .join(".tf_modules")
                .join(&path),
            None => project_root.join("terraform").join(&path),
        };

        let mut component = Component::new(path, full_path).depends_on(self.depends_on);
        component.parallelism = self.parallelism;
        component.source = self.source;
        component
    }
}

fn validate_components(components: &[Component]) -> CoreResult<()> {
    let mut seen = HashSet::new();
    for component in components {
        if component.path.is_empty() {
            return Err(CoreError::InvalidComponent {
                path: component.path.clone(),
                message: "path must not be empty".to_string(),
            });
        }
        if component.parallelism == Some(0) {
            return Err(CoreError::InvalidComponent {
                path: component.path.clone(),
                message: "parallelism must be a positive integer".to_string(),
            });
        }
        if !seen.insert(component.path.as_str()) {
            return Err(CoreError::DuplicateComponent(component.path.clone()));
        }
    }
    Ok(())
}

/// Forward slashes, no leading or trailing separator.
pub fn normalize_component_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect::<Vec<_>>()
        .join("/")
}
