//! Bundle of injectable side-effect handles.

use std::sync::Arc;

use crate::fs::{FileSystem, OsFileSystem};
use crate::runner::CommandRunner;
use crate::system::SystemRunner;

/// Process and filesystem handles passed explicitly into the engine.
#[derive(Clone)]
pub struct Shims {
    pub runner: Arc<dyn CommandRunner>,
    pub fs: Arc<dyn FileSystem>,
}

impl Shims {
    pub fn new(runner: Arc<dyn CommandRunner>, fs: Arc<dyn FileSystem>) -> Self {
        Self { runner, fs }
    }

    /// Shims that touch the real host.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemRunner::new()), Arc::new(OsFileSystem::new()))
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }
}

impl std::fmt::Debug for Shims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shims").finish_non_exhaustive()
    }
}
