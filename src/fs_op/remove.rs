use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::fs_op::retry::{RetryOutcome, RetryPolicy};
use crate::fs_op::stat::PathType;

/// Error returned when a file (or link) at `path` could not be removed.
///
/// Directory trees never produce this error: failures inside a tree are
/// logged and skipped.
#[derive(Debug, Error)]
#[error("failed to remove `{}`: {source}", path.display())]
pub struct RemoveError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl RemoveError {
    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }
}

/// Remove a file or directory tree at `path` using the host's retry policy.
///
/// On Windows the removal is retried for about a second and this function
/// never returns `Err`; check for existence afterwards if it matters. On
/// other platforms a single attempt is made and a failure to delete a
/// file (including "not found") is returned.
///
/// # Examples
///
/// ```no_run
/// use dirkit::fs_op::remove::remove_any;
/// remove_any("/tmp/some_build_dir").expect("remove failed");
/// ```
pub fn remove_any(path: impl AsRef<Path>) -> Result<(), RemoveError> {
    remove_any_with(path, &RetryPolicy::for_host())
}

/// Remove `path` under an explicit retry policy.
pub fn remove_any_with(path: impl AsRef<Path>, policy: &RetryPolicy) -> Result<(), RemoveError> {
    let p = path.as_ref();
    let outcome = policy.run(|| remove_once(p))?;
    log_outcome(p, outcome);
    Ok(())
}

// Tree removal reports success even when entries were left behind, so
// check what is actually on disk before saying "removed".
fn log_outcome(p: &Path, outcome: RetryOutcome) {
    let attempts = outcome.attempts();
    if !outcome.succeeded() {
        tracing::debug!(path = %p.display(), attempts, "could not remove, giving up");
    } else if PathType::of(p) == PathType::NotFound {
        tracing::debug!(path = %p.display(), attempts, "removed");
    } else {
        tracing::debug!(path = %p.display(), attempts, "removal attempted, path still present");
    }
}

// A single removal attempt. Links are removed as links; only real
// directories are walked.
fn remove_once(p: &Path) -> Result<(), RemoveError> {
    match PathType::of(p) {
        PathType::Directory => {
            remove_tree_lenient(p);
            Ok(())
        }
        PathType::Symlink => remove_link(p).map_err(|source| RemoveError {
            path: p.to_path_buf(),
            source,
        }),
        _ => fs::remove_file(p).map_err(|source| RemoveError {
            path: p.to_path_buf(),
            source,
        }),
    }
}

// Directory symlinks and junctions on Windows are removed with `remove_dir`.
fn remove_link(p: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        fs::remove_file(p).or_else(|_| fs::remove_dir(p))
    }

    #[cfg(not(windows))]
    {
        fs::remove_file(p)
    }
}

/// Remove a directory tree, ignoring every error along the way.
///
/// Entries are visited contents-first so directories are empty by the
/// time they are removed. Entries that vanish mid-walk, or that cannot be
/// removed, are skipped.
fn remove_tree_lenient(root: &Path) {
    for entry in WalkDir::new(root).contents_first(true).follow_links(false) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!(root = %root.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let res = if entry.file_type().is_dir() {
            fs::remove_dir(entry.path())
        } else if entry.path_is_symlink() {
            remove_link(entry.path())
        } else {
            fs::remove_file(entry.path())
        };
        if let Err(e) = res {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::debug!(path = %entry.path().display(), error = %e, "ignoring removal error");
            }
        }
    }
}
