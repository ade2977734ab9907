// Shared helpers for integration tests.
//
// Provides a temporary dots directory and home directory plus a fluent
// builder so each integration test can lay out packages without repeating
// filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dotdot_cli::engine::Context;
use dotdot_cli::exec::SystemShell;
use dotdot_cli::logging::{Log, PackageEntry, PackageStatus};
use dotdot_cli::vcs::GitVcs;

/// A [`Log`] that keeps every message and package entry in memory.
#[derive(Debug, Default)]
pub struct RecordingLog {
    pub lines: Mutex<Vec<String>>,
    pub packages: Mutex<Vec<PackageEntry>>,
}

impl RecordingLog {
    fn push(&self, level: &str, msg: &str) {
        self.lines.lock().expect("log lock").push(format!("{level} {msg}"));
    }

    /// Recorded package entries, in order.
    pub fn packages(&self) -> Vec<PackageEntry> {
        self.packages.lock().expect("log lock").clone()
    }

    /// Recorded lines at `level`, without the level prefix.
    pub fn at(&self, level: &str) -> Vec<String> {
        let prefix = format!("{level} ");
        self.lines
            .lock()
            .expect("log lock")
            .iter()
            .filter_map(|l| l.strip_prefix(&prefix).map(String::from))
            .collect()
    }
}

impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn record_package(&self, name: &str, status: PackageStatus, message: Option<&str>) {
        self.packages.lock().expect("log lock").push(PackageEntry {
            name: name.to_string(),
            status,
            message: message.map(String::from),
        });
    }
}

/// An isolated dots directory and home backed by a [`tempfile::TempDir`].
///
/// Both directories are deleted when the context is dropped.
pub struct IntegrationTestContext {
    dir: tempfile::TempDir,
    pub log: Arc<RecordingLog>,
}

impl IntegrationTestContext {
    /// Create empty `dots/` and `home/` directories.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(dir.path().join("dots")).expect("create dots dir");
        std::fs::create_dir_all(dir.path().join("home")).expect("create home dir");
        Self {
            dir,
            log: Arc::new(RecordingLog::default()),
        }
    }

    /// Directory containing the packages.
    pub fn dots(&self) -> PathBuf {
        self.dir.path().join("dots")
    }

    /// Directory packages install into.
    pub fn home(&self) -> PathBuf {
        self.dir.path().join("home")
    }

    /// Scratch space outside dots and home (e.g. for git remotes).
    pub fn scratch(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join("scratch").join(name);
        std::fs::create_dir_all(&path).expect("create scratch dir");
        path
    }

    /// Execution context using the real shell and git client.
    pub fn context(&self) -> Context {
        Context::new(
            self.home(),
            Arc::new(SystemShell::new().expect("find sh")),
            Arc::new(GitVcs),
            self.log.clone(),
        )
    }

    /// Read a file below home.
    pub fn read_home(&self, rel: &str) -> String {
        std::fs::read_to_string(self.home().join(rel)).expect("read home file")
    }

    /// Whether `rel` below home is a symlink.
    pub fn is_link(&self, rel: &str) -> bool {
        self.home()
            .join(rel)
            .symlink_metadata()
            .is_ok_and(|m| m.file_type().is_symlink())
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a context with empty dots and home directories.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Write `content` to `dots/<rel>`, creating parent directories.
    pub fn with_file(self, rel: &str, content: &str) -> Self {
        write(&self.ctx.dots().join(rel), content);
        self
    }

    /// Write a package's `spec.yaml`.
    pub fn with_spec(self, package: &str, yaml: &str) -> Self {
        self.with_file(&format!("{package}/spec.yaml"), yaml)
    }

    /// Write `content` to `home/<rel>`, creating parent directories.
    pub fn with_home_file(self, rel: &str, content: &str) -> Self {
        write(&self.ctx.home().join(rel), content);
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}
