//! Shared fakes for unit tests.

use std::io;
use std::path::{Path, PathBuf};

use strata_runner::{FileKind, FileSystem};

mockall::mock! {
    pub Fs {}
    impl FileSystem for Fs {
        fn current_dir(&self) -> io::Result<PathBuf>;
        fn stat(&self, path: &Path) -> io::Result<FileKind>;
        fn read_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;
        fn read_to_string(&self, path: &Path) -> io::Result<String>;
        fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
        fn remove_file(&self, path: &Path) -> io::Result<()>;
    }
}

pub fn denied() -> io::Error {
    io::Error::new(io::ErrorKind::PermissionDenied, "permission denied")
}
