//! Core logging types: package entries, status, and the [`Log`] trait.

/// Per-package install result for summary reporting.
#[derive(Debug, Clone)]
pub struct PackageEntry {
    /// Package name, with the variant when one was selected.
    pub name: String,
    /// Final status of the package.
    pub status: PackageStatus,
    /// Optional detail message (e.g. the action counts or error description).
    pub message: Option<String>,
}

/// Status of an attempted package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    /// Every action succeeded.
    Ok,
    /// Not attempted because the run was cancelled.
    Skipped,
    /// Loading, resolution, or an action failed.
    Failed,
}

/// Abstraction over logging backends.
///
/// Engine and command code log through this trait so tests can capture
/// output without a global subscriber.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record a package result for the summary.
    fn record_package(&self, name: &str, status: PackageStatus, message: Option<&str>);
}
