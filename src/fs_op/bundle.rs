//! macOS application bundle path helpers.
//!
//! An executable inside a bundle lives at `Name.app/Contents/MacOS/exe`.
//! Tools shipped that way usually want the directory that holds the
//! `.app`, e.g. to find data files installed next to it.

use std::io;
use std::path::{Path, PathBuf};

/// Return the directory three levels above `dir`.
///
/// For `A/B.app/Contents/MacOS` this is `A`. The input is not validated:
/// a root stays a root and a short relative path degrades to the empty
/// path, matching how [`Path::parent`] bottoms out.
pub fn mac_app_parent_dir(dir: impl AsRef<Path>) -> PathBuf {
    let mut p = dir.as_ref();
    for _ in 0..3 {
        p = p.parent().unwrap_or(p);
    }
    p.to_path_buf()
}

/// `true` when `dir` ends in `*.app/Contents/MacOS`.
pub fn is_mac_bundle_dir(dir: impl AsRef<Path>) -> bool {
    let mut names = dir.as_ref().components().rev().map(|c| c.as_os_str());
    let (Some(macos), Some(contents), Some(app)) = (names.next(), names.next(), names.next()) else {
        return false;
    };
    macos == "MacOS"
        && contents == "Contents"
        && Path::new(app).extension().is_some_and(|ext| ext == "app")
}

/// Parent of the bundle containing the running executable.
pub fn current_exe_bundle_parent() -> io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe.parent().unwrap_or(&exe);
    if !is_mac_bundle_dir(dir) {
        tracing::debug!(dir = %dir.display(), "executable is not inside an app bundle");
    }
    Ok(mac_app_parent_dir(dir))
}
