use std::path::Path;

/// Lightweight classification of a filesystem path's kind.
///
/// Classification never follows a final symbolic link, so a link to a
/// directory is reported as [`PathType::Symlink`] rather than
/// [`PathType::Directory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathType {
    /// The path does not exist (or its metadata cannot be read).
    NotFound,
    /// The path exists and is a directory.
    Directory,
    /// The path exists and is a regular file.
    File,
    /// The path itself is a symbolic link, dangling or not.
    Symlink,
    /// Anything else: socket, FIFO, device node.
    Other,
}

impl PathType {
    /// Classify `path` with a single `symlink_metadata` call.
    pub fn of<P: AsRef<Path>>(path: P) -> Self {
        let md = match path.as_ref().symlink_metadata() {
            Ok(md) => md,
            Err(_) => return PathType::NotFound,
        };
        let ft = md.file_type();
        if ft.is_symlink() {
            PathType::Symlink
        } else if ft.is_dir() {
            PathType::Directory
        } else if ft.is_file() {
            PathType::File
        } else {
            PathType::Other
        }
    }
}
