//! Tracing subscriber setup for binaries and tests using this crate.
//!
//! The library itself only emits `tracing` events; nothing is printed
//! unless a subscriber is installed.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: &str = "info";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `"debug"` or
    /// `"dirkit=trace"`.
    pub level: Option<String>,
    /// Also write to this file (rotated daily) instead of stderr.
    pub file: Option<PathBuf>,
}

impl LogConfig {
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::try_new(self.level.as_deref().unwrap_or(DEFAULT_LEVEL))
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
        })
    }
}

/// Install a global fmt subscriber.
///
/// `log`-crate records are forwarded to it as well.
///
/// Returns the appender's guard when logging to a file; keep it alive for
/// as long as log lines should be flushed. If a global subscriber (or
/// `log` logger) is already installed nothing changes and `None` is
/// returned, so calling this more than once is harmless.
pub fn init_logging(config: &LogConfig) -> Option<WorkerGuard> {
    let builder = tracing_subscriber::fmt().with_env_filter(config.filter());

    let (res, guard) = match config.file.as_deref() {
        Some(file) => {
            let (dir, name) = split_log_path(file);
            let appender = tracing_appender::rolling::daily(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let res = builder.with_writer(writer).with_ansi(false).finish().try_init();
            (res, Some(guard))
        }
        None => (builder.finish().try_init(), None),
    };

    match res {
        Ok(()) => {
            tracing::debug!(file = ?config.file, "logging initialised");
            guard
        }
        Err(_) => None,
    }
}

fn split_log_path(file: &Path) -> (&Path, &std::ffi::OsStr) {
    let dir = match file.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    let name = file
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("dirkit.log"));
    (dir, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_handles_bare_file_name() {
        let (dir, name) = split_log_path(Path::new("out.log"));
        assert_eq!(dir, Path::new("."));
        assert_eq!(name, "out.log");

        let (dir, name) = split_log_path(Path::new("/var/log/x.log"));
        assert_eq!(dir, Path::new("/var/log"));
        assert_eq!(name, "x.log");
    }

    #[test]
    fn init_twice_is_not_an_error() {
        let cfg = LogConfig {
            level: Some("debug".into()),
            file: None,
        };
        let _ = init_logging(&cfg);
        assert!(init_logging(&cfg).is_none());
        // A global subscriber is in place now.
        assert!(tracing::subscriber::set_global_default(tracing_subscriber::fmt().finish()).is_err());
    }

    #[test]
    fn bad_level_falls_back_to_default() {
        let cfg = LogConfig {
            level: Some("not a [valid filter".into()),
            file: None,
        };
        // Must not panic while building the filter.
        let _ = cfg.filter();
    }
}
