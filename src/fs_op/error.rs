use thiserror::Error;

use crate::fs_op::chdir::ChDirError;
use crate::fs_op::remove::RemoveError;
use crate::settings::SettingsError;

/// Any error produced by this crate, for callers that just want `?`.
#[derive(Error, Debug)]
pub enum FsOpError {
    #[error(transparent)]
    Remove(#[from] RemoveError),

    #[error(transparent)]
    ChDir(#[from] ChDirError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Wrapper for underlying IO errors without path context.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
