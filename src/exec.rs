//! Shell capability used by `execute` actions.
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Result of a shell invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Captured standard output, lossily decoded.
    pub stdout: String,
    /// Captured standard error, lossily decoded.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, or `None` if the process was killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Runs a script in a fresh shell process.
///
/// The shell only joins `lines` into one script; any status guards between
/// them are composed by the caller.
#[cfg_attr(test, mockall::automock)]
pub trait Shell: Send + Sync {
    /// Run `lines` as one script with `cwd` as working directory.
    ///
    /// A non-zero exit is reported through [`ExecResult::success`], not as
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell process cannot be started.
    fn run_script(&self, lines: &[String], cwd: &Path) -> io::Result<ExecResult>;
}

/// [`Shell`] backed by the system `sh`.
#[derive(Debug, Clone)]
pub struct SystemShell {
    program: PathBuf,
}

impl SystemShell {
    /// Locate `sh` on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::NotFound`] if no `sh` is on `PATH`.
    pub fn new() -> io::Result<Self> {
        let program = which::which("sh").map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))?;
        Ok(Self { program })
    }
}

impl Shell for SystemShell {
    fn run_script(&self, lines: &[String], cwd: &Path) -> io::Result<ExecResult> {
        let script = lines.join("\n");
        let output = Command::new(&self.program)
            .arg("-c")
            .arg(&script)
            .current_dir(cwd)
            .output()?;
        Ok(ExecResult::from(output))
    }
}
