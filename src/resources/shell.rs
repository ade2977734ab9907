//! The `execute` executor.
use std::path::Path;

use crate::error::ActionError;
use crate::exec::{ExecResult, Shell};

/// Line inserted after every command so the first failure ends the script
/// with that command's status.
const STATUS_GUARD: &str =
    "__dotdot_status=$?; if [ \"$__dotdot_status\" -ne 0 ]; then exit \"$__dotdot_status\"; fi";

/// Interleave `commands` with status guards into one script.
///
/// # Examples
///
/// ```
/// use dotdot_cli::resources::shell::compose_script;
///
/// let script = compose_script(&["X=1".to_string(), "echo $X".to_string()]);
/// assert_eq!(script.len(), 4);
/// assert_eq!(script[0], "X=1");
/// assert!(script[1].contains("exit"));
/// ```
#[must_use]
pub fn compose_script(commands: &[String]) -> Vec<String> {
    commands
        .iter()
        .flat_map(|command| [command.trim_end().to_string(), STATUS_GUARD.to_string()])
        .collect()
}

/// Run all `commands` of one `execute` action in a single shell rooted at
/// the package directory.
///
/// Variables set by one command are visible to later ones; nothing carries
/// over to the next action.
///
/// # Errors
///
/// Returns [`ActionError::ShellSpawn`] if the shell cannot start and
/// [`ActionError::CommandFailed`] if a command exits non-zero.
pub fn execute(commands: &[String], root: &Path, shell: &dyn Shell) -> Result<ExecResult, ActionError> {
    let script = compose_script(commands);
    let result = shell.run_script(&script, root).map_err(ActionError::ShellSpawn)?;

    for line in result.stdout.lines() {
        tracing::debug!(target: "dotdot::shell", "{line}");
    }
    for line in result.stderr.lines() {
        tracing::debug!(target: "dotdot::shell", stream = "stderr", "{line}");
    }

    if result.success {
        Ok(result)
    } else {
        Err(ActionError::CommandFailed {
            exit_code: result.code,
            stderr: result.stderr.trim().to_string(),
        })
    }
}
