//! # strata_runner
//!
//! Process and filesystem shims for strata.
//!
//! Every external side effect the environment engine performs (running the
//! terraform binary, checking whether a file exists, writing an override
//! file) goes through the traits in this crate, so tests can swap in
//! deterministic fakes without touching process-global state.
//!
//! # Features
//!
//! - **Command execution**: [`CommandRunner`] with a blocking
//!   `std::process` implementation ([`SystemRunner`])
//! - **Filesystem access**: [`FileSystem`] with atomic single-file writes
//!   ([`OsFileSystem`])
//! - **Mock Runner**: [`MockRunner`] captures calls and replays canned output
//!
//! # Example
//!
//! ```rust,no_run
//! use strata_runner::{CommandConfig, Shims};
//!
//! let shims = Shims::system();
//! let config = CommandConfig::new("terraform")
//!     .arg("output")
//!     .arg("-json")
//!     .workdir("/srv/infra/terraform/network/vpc");
//!
//! let result = shims.runner.run(&config)?;
//! println!("exit code: {}", result.exit_code);
//! # Ok::<(), strata_runner::RunnerError>(())
//! ```

pub mod config;
pub mod error;
pub mod fs;
pub mod mock;
pub mod runner;
pub mod shims;
pub mod system;

pub use config::CommandConfig;
pub use error::{RunnerError, RunnerResult};
pub use fs::{FileKind, FileSystem, OsFileSystem};
pub use mock::{CapturedCall, MockResponse, MockRunner};
pub use runner::{CommandRunner, ExecutionResult};
pub use shims::Shims;
pub use system::SystemRunner;
