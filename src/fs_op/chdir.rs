//! Step into a directory, do some work, and step back out.
//!
//! [`ChDir`] is a scope guard: the previous working directory is restored
//! when the guard is dropped, including while unwinding from a panic.
//! Use [`ChDir::leave`] or [`with_dir`] when a failure to restore needs to
//! be reported instead of logged.
//!
//! The process working directory is shared by every thread. Nothing here
//! serializes access to it; callers running guards on several threads
//! must do that themselves.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from changing or restoring the working directory.
#[derive(Debug, Error)]
pub enum ChDirError {
    #[error("could not read current directory: {0}")]
    CurrentDir(#[source] io::Error),

    #[error("could not change to directory `{}`: {source}", path.display())]
    Enter {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not move back to directory `{}`: {source}", path.display())]
    Restore {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Source and sink of "the current directory".
///
/// [`ProcessDir`] is the real, process-wide one. Other implementations
/// let a working directory be threaded explicitly, e.g. in tests that
/// run in parallel.
pub trait WorkingDir {
    fn current(&self) -> io::Result<PathBuf>;
    fn change_to(&self, path: &Path) -> io::Result<()>;
}

/// The process working directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessDir;

impl WorkingDir for ProcessDir {
    fn current(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    fn change_to(&self, path: &Path) -> io::Result<()> {
        std::env::set_current_dir(path)
    }
}

impl<W: WorkingDir + ?Sized> WorkingDir for &W {
    fn current(&self) -> io::Result<PathBuf> {
        (**self).current()
    }

    fn change_to(&self, path: &Path) -> io::Result<()> {
        (**self).change_to(path)
    }
}

/// Rewrite `path` using the host's separator conventions.
///
/// On Windows the path is rebuilt from its components, which turns
/// forward slashes into backslashes without touching the names (non-UTF-16
/// names included); elsewhere the path is returned unchanged.
pub fn normalize_for_host(path: &Path) -> PathBuf {
    #[cfg(windows)]
    {
        path.components().collect()
    }

    #[cfg(not(windows))]
    {
        path.to_path_buf()
    }
}

/// Guard that restores the previous working directory on drop.
#[must_use = "the previous directory is restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ChDir<W: WorkingDir = ProcessDir> {
    dir: W,
    old_dir: PathBuf,
    new_dir: PathBuf,
    restored: bool,
}

impl ChDir<ProcessDir> {
    /// Change the process working directory to `path`.
    pub fn enter(path: impl AsRef<Path>) -> Result<Self, ChDirError> {
        Self::enter_in(ProcessDir, path)
    }
}

impl<W: WorkingDir> ChDir<W> {
    /// Change `dir`'s current directory to `path`.
    pub fn enter_in(dir: W, path: impl AsRef<Path>) -> Result<Self, ChDirError> {
        let old_dir = dir.current().map_err(ChDirError::CurrentDir)?;
        let new_dir = normalize_for_host(path.as_ref());

        tracing::debug!(dir = %new_dir.display(), "changing to directory");
        dir.change_to(&new_dir).map_err(|source| ChDirError::Enter {
            path: new_dir.clone(),
            source,
        })?;

        Ok(ChDir {
            dir,
            old_dir,
            new_dir,
            restored: false,
        })
    }

    /// Directory that will be restored.
    pub fn old_dir(&self) -> &Path {
        &self.old_dir
    }

    /// Directory the guard changed into.
    pub fn new_dir(&self) -> &Path {
        &self.new_dir
    }

    /// Restore the previous directory now, reporting failure.
    pub fn leave(mut self) -> Result<(), ChDirError> {
        self.restore()
    }

    fn restore(&mut self) -> Result<(), ChDirError> {
        self.restored = true;
        tracing::debug!(dir = %self.old_dir.display(), "moving back to directory");
        self.dir
            .change_to(&self.old_dir)
            .map_err(|source| ChDirError::Restore {
                path: self.old_dir.clone(),
                source,
            })
    }
}

impl<W: WorkingDir> Drop for ChDir<W> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = self.restore() {
            tracing::warn!(error = %e, "failed to restore working directory");
        }
    }
}

/// Run `f` with the process working directory set to `path`.
///
/// The previous directory is restored afterwards. `f`'s value is returned
/// unless restoring fails, in which case the restore error wins. If `f`
/// panics the directory is restored before the panic continues.
pub fn with_dir<R>(path: impl AsRef<Path>, f: impl FnOnce() -> R) -> Result<R, ChDirError> {
    with_dir_in(ProcessDir, path, f)
}

/// [`with_dir`] for an arbitrary [`WorkingDir`].
pub fn with_dir_in<W: WorkingDir, R>(
    dir: W,
    path: impl AsRef<Path>,
    f: impl FnOnce() -> R,
) -> Result<R, ChDirError> {
    let mut guard = ChDir::enter_in(dir, path)?;
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => {
            guard.restore()?;
            Ok(value)
        }
        Err(payload) => {
            // Restore before resuming; a restore failure is only logged so
            // the panic keeps priority.
            drop(guard);
            panic::resume_unwind(payload)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    /// In-memory working directory with a fixed set of valid targets.
    #[derive(Debug)]
    struct FakeDir {
        cwd: RefCell<PathBuf>,
        valid: HashSet<PathBuf>,
        history: RefCell<Vec<PathBuf>>,
    }

    impl FakeDir {
        fn new(start: &str, valid: &[&str]) -> Self {
            FakeDir {
                cwd: RefCell::new(PathBuf::from(start)),
                valid: valid.iter().map(PathBuf::from).collect(),
                history: RefCell::new(Vec::new()),
            }
        }

        fn cwd(&self) -> PathBuf {
            self.cwd.borrow().clone()
        }
    }

    impl WorkingDir for FakeDir {
        fn current(&self) -> io::Result<PathBuf> {
            Ok(self.cwd())
        }

        fn change_to(&self, path: &Path) -> io::Result<()> {
            if !self.valid.contains(path) {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no such dir"));
            }
            self.history.borrow_mut().push(path.to_path_buf());
            *self.cwd.borrow_mut() = path.to_path_buf();
            Ok(())
        }
    }

    #[test]
    fn guard_changes_then_restores() {
        let fake = FakeDir::new("/home", &["/home", "/work"]);
        {
            let guard = ChDir::enter_in(&fake, "/work").unwrap();
            assert_eq!(fake.cwd(), Path::new("/work"));
            assert_eq!(guard.old_dir(), Path::new("/home"));
            assert_eq!(guard.new_dir(), Path::new("/work"));
        }
        assert_eq!(fake.cwd(), Path::new("/home"));
        assert_eq!(fake.history.borrow().len(), 2);
    }

    #[test]
    fn entering_missing_dir_fails_and_leaves_cwd() {
        let fake = FakeDir::new("/home", &["/home"]);
        let err = ChDir::enter_in(&fake, "/missing").unwrap_err();
        assert!(matches!(err, ChDirError::Enter { ref path, .. } if path == Path::new("/missing")));
        assert_eq!(fake.cwd(), Path::new("/home"));
        assert!(fake.history.borrow().is_empty());
    }

    #[test]
    fn explicit_leave_restores_once() {
        let fake = FakeDir::new("/home", &["/home", "/work"]);
        let guard = ChDir::enter_in(&fake, "/work").unwrap();
        guard.leave().unwrap();
        assert_eq!(fake.cwd(), Path::new("/home"));
        // enter + leave, no second restore from Drop
        assert_eq!(fake.history.borrow().len(), 2);
    }

    #[test]
    fn restore_failure_is_reported_by_leave() {
        // Start somewhere that cannot be changed back into.
        let fake = FakeDir::new("/deleted", &["/work"]);
        let guard = ChDir::enter_in(&fake, "/work").unwrap();
        let err = guard.leave().unwrap_err();
        assert!(matches!(err, ChDirError::Restore { ref path, .. } if path == Path::new("/deleted")));
    }

    #[test]
    fn with_dir_returns_body_value() {
        let fake = FakeDir::new("/home", &["/home", "/work"]);
        let seen = with_dir_in(&fake, "/work", || fake.cwd()).unwrap();
        assert_eq!(seen, Path::new("/work"));
        assert_eq!(fake.cwd(), Path::new("/home"));
    }

    #[test]
    fn with_dir_body_error_propagates_after_restore() {
        let fake = FakeDir::new("/home", &["/home", "/work"]);
        let res: Result<Result<(), &str>, _> = with_dir_in(&fake, "/work", || Err("boom"));
        assert_eq!(res.unwrap(), Err("boom"));
        assert_eq!(fake.cwd(), Path::new("/home"));
    }

    #[test]
    fn with_dir_restore_failure_masks_body_value() {
        let fake = FakeDir::new("/deleted", &["/work"]);
        let res = with_dir_in(&fake, "/work", || 42);
        assert!(matches!(res, Err(ChDirError::Restore { .. })));
    }

    #[test]
    fn with_dir_restores_before_panic_propagates() {
        let fake = FakeDir::new("/home", &["/home", "/work"]);
        let caught = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = with_dir_in(&fake, "/work", || panic!("body failed"));
        }));
        let payload = caught.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"body failed"));
        assert_eq!(fake.cwd(), Path::new("/home"));
    }

    #[cfg(not(windows))]
    #[test]
    fn normalize_is_identity_off_windows() {
        assert_eq!(normalize_for_host(Path::new("a/b/c")), Path::new("a/b/c"));
    }

    #[cfg(windows)]
    #[test]
    fn normalize_uses_backslashes_on_windows() {
        let got = normalize_for_host(Path::new("C:/a/b"));
        assert_eq!(got.as_os_str(), std::ffi::OsStr::new(r"C:\a\b"));
    }

    #[cfg(windows)]
    #[test]
    fn normalize_keeps_unpaired_surrogates() {
        use std::ffi::OsString;
        use std::os::windows::ffi::{OsStrExt, OsStringExt};

        // "C:/x" followed by a lone high surrogate, then "/y".
        let mut wide: Vec<u16> = "C:/x".encode_utf16().collect();
        wide.push(0xD800);
        wide.extend("/y".encode_utf16());
        let raw = PathBuf::from(OsString::from_wide(&wide));

        let got = normalize_for_host(&raw);
        let mut expected: Vec<u16> = r"C:\x".encode_utf16().collect();
        expected.push(0xD800);
        expected.extend(r"\y".encode_utf16());
        assert_eq!(got.as_os_str().encode_wide().collect::<Vec<_>>(), expected);
    }
}
