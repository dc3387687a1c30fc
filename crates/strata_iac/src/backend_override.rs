//! Generated `backend_override.tf`.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use strata_core::BackendConfig;
use strata_runner::FileSystem;

use crate::backend::BackendSpec;
use crate::error::{IacError, IacResult};
use crate::locator::ProjectLocator;

/// Name of the generated override file.
pub const OVERRIDE_FILE: &str = "backend_override.tf";

/// What [`BackendOverrideWriter::sync`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideAction {
    Written(PathBuf),
    Removed(PathBuf),
    /// Nothing to do: no terraform sources, or nothing to remove.
    Skipped,
}

/// Keeps the backend override file in a module directory in sync with the
/// configured backend kind.
pub struct BackendOverrideWriter {
    fs: Arc<dyn FileSystem>,
}

impl BackendOverrideWriter {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Sync the override in the working directory.
    pub fn sync_current(&self, backend: &BackendConfig) -> IacResult<OverrideAction> {
        let cwd = self.fs.current_dir().map_err(IacError::ProjectPath)?;
        self.sync(&cwd, backend)
    }

    /// Write `backend "<kind>" {}` into `dir`, or remove the override when
    /// the kind is `none`.
    pub fn sync(&self, dir: &Path, backend: &BackendConfig) -> IacResult<OverrideAction> {
        let spec = BackendSpec::from_config(backend)?;

        let locator = ProjectLocator::new(Arc::clone(&self.fs));
        if !locator.has_sources(dir)? {
            debug!("Skipping backend override, no terraform sources in {:?}", dir);
            return Ok(OverrideAction::Skipped);
        }

        let path = dir.join(OVERRIDE_FILE);
        if spec == BackendSpec::None {
            return self.remove(path);
        }

        self.fs
            .write_atomic(&path, render_override(spec.kind()).as_bytes())
            .map_err(|source| IacError::OverrideWrite {
                path: path.clone(),
                source,
            })?;
        info!("Wrote {} backend override to {:?}", spec.kind(), path);
        Ok(OverrideAction::Written(path))
    }

    fn remove(&self, path: PathBuf) -> IacResult<OverrideAction> {
        match self.fs.remove_file(&path) {
            Ok(()) => {
                info!("Removed backend override {:?}", path);
                Ok(OverrideAction::Removed(path))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(OverrideAction::Skipped),
            Err(source) => Err(IacError::OverrideRemove { path, source }),
        }
    }
}

/// Override file content for a backend kind.
pub fn render_override(kind: &str) -> String {
    format!("terraform {{\n  backend \"{}\" {{}}\n}}\n", kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use strata_runner::OsFileSystem;
    use tempfile::tempdir;

    use crate::test_support::{denied, MockFs};

    fn writer() -> BackendOverrideWriter {
        BackendOverrideWriter::new(Arc::new(OsFileSystem::new()))
    }

    fn module_dir() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.tf"), "").unwrap();
        dir
    }

    #[test]
    fn test_render_override() {
        assert_eq!(
            render_override("s3"),
            "terraform {\n  backend \"s3\" {}\n}\n"
        );
    }

    #[test]
    fn test_writes_override_for_kind() {
        let dir = module_dir();
        let action = writer()
            .sync(dir.path(), &BackendConfig::of_kind("kubernetes"))
            .unwrap();

        let path = dir.path().join(OVERRIDE_FILE);
        assert_eq!(action, OverrideAction::Written(path.clone()));
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "terraform {\n  backend \"kubernetes\" {}\n}\n"
        );
    }

    #[test]
    fn test_rewrites_when_kind_changes() {
        let dir = module_dir();
        writer().sync(dir.path(), &BackendConfig::of_kind("s3")).unwrap();
        writer().sync(dir.path(), &BackendConfig::of_kind("local")).unwrap();

        let content = fs::read_to_string(dir.path().join(OVERRIDE_FILE)).unwrap();
        assert!(content.contains("backend \"local\""));
        assert!(!content.contains("s3"));
    }

    #[test]
    fn test_none_removes_existing_override() {
        let dir = module_dir();
        let path = dir.path().join(OVERRIDE_FILE);
        fs::write(&path, render_override("s3")).unwrap();

        let action = writer().sync(dir.path(), &BackendConfig::of_kind("none")).unwrap();
        assert_eq!(action, OverrideAction::Removed(path.clone()));
        assert!(!path.exists());
    }

    #[test]
    fn test_none_without_override_is_noop() {
        let dir = module_dir();
        let action = writer().sync(dir.path(), &BackendConfig::of_kind("none")).unwrap();
        assert_eq!(action, OverrideAction::Skipped);
    }

    #[test]
    fn test_directory_without_sources_is_untouched() {
        let dir = tempdir().unwrap();
        let action = writer().sync(dir.path(), &BackendConfig::of_kind("s3")).unwrap();

        assert_eq!(action, OverrideAction::Skipped);
        assert!(!dir.path().join(OVERRIDE_FILE).exists());
    }

    #[test]
    fn test_unsupported_kind_is_fatal() {
        let dir = module_dir();
        let err = writer()
            .sync(dir.path(), &BackendConfig::of_kind("consul"))
            .unwrap_err();
        assert!(matches!(err, IacError::UnsupportedBackend(k) if k == "consul"));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut fs = MockFs::new();
        fs.expect_read_dir()
            .returning(|dir| Ok(vec![dir.join("main.tf")]));
        fs.expect_write_atomic().returning(|_, _| Err(denied()));

        let err = BackendOverrideWriter::new(Arc::new(fs))
            .sync(Path::new("/m"), &BackendConfig::of_kind("s3"))
            .unwrap_err();
        assert!(matches!(err, IacError::OverrideWrite { .. }));
    }

    #[test]
    fn test_remove_failure_is_reported() {
        let mut fs = MockFs::new();
        fs.expect_read_dir()
            .returning(|dir| Ok(vec![dir.join("main.tf")]));
        fs.expect_remove_file().returning(|_| Err(denied()));

        let err = BackendOverrideWriter::new(Arc::new(fs))
            .sync(Path::new("/m"), &BackendConfig::of_kind("none"))
            .unwrap_err();
        assert!(matches!(err, IacError::OverrideRemove { .. }));
    }
}
