pub mod fs_op;
pub mod logging;
pub mod settings;

pub use crate::fs_op::{
    mac_app_parent_dir, remove_any, with_dir, ChDir, ChDirError, FsOpError, RemoveError,
    RetryPolicy,
};
pub use crate::settings::{load_settings, Settings};
