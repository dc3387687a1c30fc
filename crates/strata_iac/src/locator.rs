//! Current module discovery.

use std::io;
use std::path::{Component, Path};
use std::sync::Arc;

use tracing::debug;

use strata_runner::FileSystem;

use crate::error::{IacError, IacResult};

/// Directory names that root a tree of terraform modules (case-insensitive).
pub const ROOT_MARKERS: [&str; 2] = ["terraform", ".tf_modules"];

/// Finds the logical path of the terraform module in the working directory.
pub struct ProjectLocator {
    fs: Arc<dyn FileSystem>,
}

impl ProjectLocator {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Module path of the process working directory.
    pub fn locate(&self) -> IacResult<String> {
        let cwd = self.fs.current_dir().map_err(IacError::ProjectPath)?;
        self.locate_from(&cwd)
    }

    /// Module path of `dir`, e.g. `network/vpc` for `/p/terraform/network/vpc`.
    ///
    /// Returns an empty string when `dir` holds no terraform sources or is
    /// not below a root marker. Neither case is an error.
    pub fn locate_from(&self, dir: &Path) -> IacResult<String> {
        if !self.has_sources(dir)? {
            debug!("No terraform sources in {:?}", dir);
            return Ok(String::new());
        }

        let path = module_path_of(dir).unwrap_or_default();
        debug!("Resolved terraform module path {:?} for {:?}", path, dir);
        Ok(path)
    }

    /// Whether `dir` directly contains `*.tf` or `*.tf.json` files.
    pub fn has_sources(&self, dir: &Path) -> IacResult<bool> {
        match self.fs.read_dir(dir) {
            Ok(entries) => Ok(entries.iter().any(|p| is_tf_source(p))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(IacError::ProjectPath(e)),
        }
    }
}

/// Everything after the nearest root marker segment, joined with `/`.
pub fn module_path_of(dir: &Path) -> Option<String> {
    let segments: Vec<String> = dir
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let marker = segments
        .iter()
        .rposition(|s| ROOT_MARKERS.iter().any(|m| s.eq_ignore_ascii_case(m)))?;

    Some(segments[marker + 1..].join("/"))
}

fn is_tf_source(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy())
        .is_some_and(|n| n.ends_with(".tf") || n.ends_with(".tf.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use strata_runner::OsFileSystem;
    use tempfile::tempdir;

    use crate::test_support::{denied, MockFs};

    fn locator() -> ProjectLocator {
        ProjectLocator::new(Arc::new(OsFileSystem::new()))
    }

    #[test]
    fn test_module_path_of() {
        assert_eq!(
            module_path_of(Path::new("/repo/terraform/project/path")).as_deref(),
            Some("project/path")
        );
        assert_eq!(
            module_path_of(Path::new("/repo/.tf_modules/cluster/talos")).as_deref(),
            Some("cluster/talos")
        );
        assert_eq!(
            module_path_of(Path::new("/repo/Terraform/vpc")).as_deref(),
            Some("vpc")
        );
        assert_eq!(module_path_of(Path::new("/repo/modules/vpc")), None);
    }

    #[test]
    fn test_nearest_marker_wins() {
        assert_eq!(
            module_path_of(Path::new("/terraform/live/terraform/app")).as_deref(),
            Some("app")
        );
    }

    #[test]
    fn test_locate_from_module_dir() {
        let dir = tempdir().unwrap();
        let module = dir.path().join("terraform/network/vpc");
        fs::create_dir_all(&module).unwrap();
        fs::write(module.join("main.tf"), "").unwrap();

        assert_eq!(locator().locate_from(&module).unwrap(), "network/vpc");
    }

    #[test]
    fn test_locate_without_sources_is_empty() {
        let dir = tempdir().unwrap();
        let module = dir.path().join("terraform/network/vpc");
        fs::create_dir_all(&module).unwrap();
        fs::write(module.join("README.md"), "").unwrap();

        assert_eq!(locator().locate_from(&module).unwrap(), "");
    }

    #[test]
    fn test_locate_without_marker_is_empty() {
        let dir = tempdir().unwrap();
        let module = dir.path().join("modules/vpc");
        fs::create_dir_all(&module).unwrap();
        fs::write(module.join("main.tf.json"), "{}").unwrap();

        assert_eq!(locator().locate_from(&module).unwrap(), "");
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("terraform/gone");
        assert_eq!(locator().locate_from(&gone).unwrap(), "");
    }

    #[test]
    fn test_listing_failure_is_fatal() {
        let mut fs = MockFs::new();
        fs.expect_read_dir().returning(|_| Err(denied()));

        let locator = ProjectLocator::new(Arc::new(fs));
        let err = locator.locate_from(Path::new("/repo/terraform/vpc")).unwrap_err();
        assert!(matches!(err, IacError::ProjectPath(_)));
    }

    #[test]
    fn test_current_dir_failure_is_fatal() {
        let mut fs = MockFs::new();
        fs.expect_current_dir()
            .returning(|| Err(io::Error::new(io::ErrorKind::Other, "cwd removed")));

        let err = ProjectLocator::new(Arc::new(fs)).locate().unwrap_err();
        assert!(err.to_string().contains("cwd removed"));
    }
}
