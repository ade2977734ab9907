//! Structured logger with summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::STAGE_TARGET;
use super::types::{Log, PackageEntry, PackageStatus};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with summary collection.
///
/// All messages are also written to `$XDG_CACHE_HOME/dotdot/<command>.log`
/// by the file layer installed in
/// [`init_subscriber`](super::subscriber::init_subscriber).
#[derive(Debug)]
pub struct Logger {
    packages: Mutex<Vec<PackageEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger for `command`.
    ///
    /// Only remembers the log file path for the summary; the file itself is
    /// written by the subscriber.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            packages: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return a clone of all recorded package entries.
    #[must_use]
    pub fn package_entries(&self) -> Vec<PackageEntry> {
        self.packages.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Record a package result for the summary.
    pub fn record_package(&self, name: &str, status: PackageStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.packages.lock() {
            guard.push(PackageEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Print the summary of all recorded packages.
    pub fn print_summary(&self) {
        let packages = self.package_entries();
        if packages.is_empty() {
            return;
        }

        println!();
        self.stage("Summary");

        let (mut ok, mut skipped, mut failed) = (0u32, 0u32, 0u32);
        for package in &packages {
            let (icon, color) = match package.status {
                PackageStatus::Ok => {
                    ok += 1;
                    ("✓", "\x1b[32m")
                }
                PackageStatus::Skipped => {
                    skipped += 1;
                    ("○", "\x1b[33m")
                }
                PackageStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };
            let suffix = package
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", package.name));
        }

        println!();
        let total = ok + skipped + failed;
        self.info(&format!(
            "{total} packages: \x1b[32m{ok} ok\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error);

    fn record_package(&self, name: &str, status: PackageStatus, message: Option<&str>) {
        self.record_package(name, status, message);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn records_packages_in_order() {
        let (log, _tmp, _guard) = super::super::isolated_logger();
        log.record_package("vim", PackageStatus::Ok, Some("3 changed"));
        log.record_package("zsh", PackageStatus::Failed, Some("target exists"));
        log.record_package("tmux", PackageStatus::Skipped, None);

        let entries = log.package_entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].name, "zsh");
        assert_eq!(entries[1].status, PackageStatus::Failed);
        assert_eq!(entries[1].message.as_deref(), Some("target exists"));
    }

    #[test]
    fn summary_is_written_to_log_file() {
        let (log, tmp, _guard) = super::super::isolated_logger();
        log.record_package("vim", PackageStatus::Ok, None);
        log.record_package("zsh", PackageStatus::Failed, Some("boom"));
        log.print_summary();

        let content = std::fs::read_to_string(tmp.path().join("dotdot/test.log")).unwrap();
        assert!(content.contains("==> Summary"));
        assert!(content.contains("✗ zsh (boom)"));
        assert!(content.contains("2 packages: 1 ok, 0 skipped, 1 failed"));
        assert!(content.contains("log: "));
    }

    #[test]
    fn empty_summary_prints_nothing() {
        let (log, tmp, _guard) = super::super::isolated_logger();
        log.print_summary();
        let content = std::fs::read_to_string(tmp.path().join("dotdot/test.log")).unwrap();
        assert!(!content.contains("Summary"));
    }

    #[test]
    fn logs_through_trait_object() {
        let (log, tmp, _guard) = super::super::isolated_logger();
        let dyn_log: &dyn Log = &log;
        dyn_log.info("via trait");
        let content = std::fs::read_to_string(tmp.path().join("dotdot/test.log")).unwrap();
        assert!(content.contains("via trait"));
    }
}
