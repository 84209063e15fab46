//! Filesystem helpers.
//!
//! - [`bundle`]: parent directory of a macOS `.app` bundle
//! - [`remove`]: file or tree removal under a [`retry::RetryPolicy`]
//! - [`chdir`]: scoped change of the working directory

pub mod bundle;
pub mod chdir;
pub mod error;
pub mod remove;
pub mod retry;
pub mod stat;
pub mod test_helpers;

pub use bundle::{current_exe_bundle_parent, is_mac_bundle_dir, mac_app_parent_dir};
pub use chdir::{with_dir, with_dir_in, ChDir, ChDirError, ProcessDir, WorkingDir};
pub use error::FsOpError;
pub use remove::{remove_any, remove_any_with, RemoveError};
pub use retry::{Exhaustion, RetryOutcome, RetryPolicy};
