use std::sync::{Mutex, MutexGuard, OnceLock};

/// Serialize tests that change the process working directory.
///
/// The working directory is shared by every test thread in a binary, so
/// any test using [`ChDir`](crate::fs_op::chdir::ChDir) with the real
/// process directory should hold this guard for its whole body. A
/// poisoned lock (a previous holder panicked) is recovered, since the
/// guarded state is the directory, not the mutex contents.
#[doc(hidden)]
pub fn acquire_cwd_lock() -> MutexGuard<'static, ()> {
    static CWD_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    CWD_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
