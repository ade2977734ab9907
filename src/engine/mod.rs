//! Fail-fast execution of a resolved action sequence.
//!
//! Actions run strictly in order because later ones may read what earlier
//! ones wrote. The first failure stops the sequence; nothing already
//! applied is rolled back.
mod context;

pub use context::Context;

use std::path::Path;

use serde::Serialize;

use crate::error::ActionError;
use crate::model::{ActionKind, ActionSpec, ResolvedSequence};
use crate::resources::{ActionStats, copy, git_clone, link_recursive, shell, symlink};

/// Outcome of a single action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    /// The action completed.
    Success,
    /// The action returned an error; later actions did not run.
    Failed,
    /// Not started because the run was cancelled.
    Skipped,
}

/// Per-action entry of an [`ExecutionResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    /// Kind of the action.
    pub kind: ActionKind,
    /// How the action ended.
    pub status: ActionStatus,
    /// Summary on success, the error message on failure.
    pub message: String,
}

/// Overall outcome of a package run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Every action succeeded.
    Success,
    /// An action failed or the run was cancelled.
    Failed,
}

/// Ordered action records of one package run and the overall status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    /// Package name.
    pub package: String,
    /// Variant that was resolved, or `None` for packages without variants.
    pub variant: Option<String>,
    /// One record per action, in execution order.
    pub records: Vec<ActionRecord>,
    /// Overall status.
    pub status: ExecutionStatus,
}

impl ExecutionResult {
    /// Whether every action succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    /// The record of the action that stopped the run, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&ActionRecord> {
        self.records.iter().find(|r| r.status != ActionStatus::Success)
    }
}

/// Run every action of `sequence` with `root` as the package root.
///
/// Records are returned for every action that was attempted, up to and
/// including the first failure. When the run is cancelled the remaining
/// actions are recorded as [`ActionStatus::Skipped`].
#[must_use]
pub fn run(sequence: &ResolvedSequence, root: &Path, ctx: &Context) -> ExecutionResult {
    let mut records = Vec::with_capacity(sequence.actions.len());
    let mut status = ExecutionStatus::Success;

    for (index, action) in sequence.actions.iter().enumerate() {
        if ctx.is_cancelled() {
            ctx.log.warn(&format!("{}: cancelled", sequence.package));
            records.extend(sequence.actions.iter().skip(index).map(|skipped| ActionRecord {
                kind: skipped.kind(),
                status: ActionStatus::Skipped,
                message: ActionError::Cancelled.to_string(),
            }));
            status = ExecutionStatus::Failed;
            break;
        }

        ctx.log.debug(&format!("{action}"));
        match dispatch(action, root, ctx) {
            Ok(summary) => {
                ctx.log.info(&format!("{}: {summary}", action.kind()));
                records.push(ActionRecord {
                    kind: action.kind(),
                    status: ActionStatus::Success,
                    message: summary,
                });
            }
            Err(e) => {
                ctx.log.error(&format!("{}: {e}", action.kind()));
                records.push(ActionRecord {
                    kind: action.kind(),
                    status: ActionStatus::Failed,
                    message: e.to_string(),
                });
                status = ExecutionStatus::Failed;
                break;
            }
        }
    }

    ExecutionResult {
        package: sequence.package.clone(),
        variant: sequence.variant.clone(),
        records,
        status,
    }
}

fn dispatch(action: &ActionSpec, root: &Path, ctx: &Context) -> Result<String, ActionError> {
    let stats = match action {
        ActionSpec::Link(pairs) => symlink::link(pairs, root, &ctx.home)?,
        ActionSpec::Copy(pairs) => copy::copy(pairs, root, &ctx.home)?,
        ActionSpec::LinkRecursively(pairs) => link_recursive::link_recursively(pairs, root, &ctx.home)?,
        ActionSpec::Execute(commands) => {
            shell::execute(commands, root, ctx.shell.as_ref())?;
            return Ok(match commands.len() {
                1 => "ran 1 command".to_string(),
                n => format!("ran {n} commands"),
            });
        }
        ActionSpec::GitClone(spec) => {
            ActionStats::from_change(git_clone::git_clone(spec, &ctx.home, ctx.vcs.as_ref())?)
        }
    };
    Ok(stats.summary())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::Ordering;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::exec::{ExecResult, MockShell};
    use crate::logging::{Log, PackageStatus};
    use crate::model::PathPair;
    use crate::vcs::MockVcs;

    #[derive(Default)]
    struct RecordingLog {
        lines: Mutex<Vec<String>>,
    }

    impl Log for RecordingLog {
        fn stage(&self, msg: &str) {
            self.lines.lock().unwrap().push(format!("stage {msg}"));
        }
        fn info(&self, msg: &str) {
            self.lines.lock().unwrap().push(format!("info {msg}"));
        }
        fn debug(&self, _msg: &str) {}
        fn warn(&self, msg: &str) {
            self.lines.lock().unwrap().push(format!("warn {msg}"));
        }
        fn error(&self, msg: &str) {
            self.lines.lock().unwrap().push(format!("error {msg}"));
        }
        fn record_package(&self, _: &str, _: PackageStatus, _: Option<&str>) {}
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        root: PathBuf,
        home: PathBuf,
    }

    fn fixture(files: &[&str]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("pkg");
        let home = dir.path().join("home");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::create_dir_all(&home).unwrap();
        for file in files {
            std::fs::write(root.join(file), *file).unwrap();
        }
        Fixture { _dir: dir, root, home }
    }

    fn ctx(home: &Path, shell: MockShell) -> (Context, Arc<RecordingLog>) {
        let log = Arc::new(RecordingLog::default());
        let ctx = Context::new(home.to_path_buf(), Arc::new(shell), Arc::new(MockVcs::new()), log.clone());
        (ctx, log)
    }

    fn sequence(actions: Vec<ActionSpec>) -> ResolvedSequence {
        ResolvedSequence {
            package: "pkg".to_string(),
            variant: Some("default".to_string()),
            actions,
        }
    }

    fn ok_shell(times: usize) -> MockShell {
        let mut shell = MockShell::new();
        shell.expect_run_script().times(times).returning(|_, _| {
            Ok(ExecResult {
                stdout: String::new(),
                stderr: String::new(),
                success: true,
                code: Some(0),
            })
        });
        shell
    }

    #[test]
    fn runs_all_actions_in_order() {
        let f = fixture(&["a", "b"]);
        let (ctx, log) = ctx(&f.home, ok_shell(1));
        let seq = sequence(vec![
            ActionSpec::Link(vec![PathPair::dotted("a")]),
            ActionSpec::Execute(vec!["true".into()]),
            ActionSpec::Copy(vec![PathPair::dotted("b")]),
        ]);

        let result = run(&seq, &f.root, &ctx);
        assert!(result.is_success());
        let kinds: Vec<ActionKind> = result.records.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![ActionKind::Link, ActionKind::Execute, ActionKind::Copy]);
        assert_eq!(result.records[0].message, "1 changed");
        assert_eq!(result.records[1].message, "ran 1 command");
        assert!(f.home.join(".a").symlink_metadata().unwrap().file_type().is_symlink());
        assert_eq!(log.lines.lock().unwrap()[0], "info link: 1 changed");
    }

    #[test]
    fn stops_at_first_failure() {
        let f = fixture(&["a"]);
        std::fs::write(f.home.join(".a"), "mine").unwrap();
        let (ctx, log) = ctx(&f.home, ok_shell(1));
        let seq = sequence(vec![
            ActionSpec::Execute(vec!["true".into()]),
            ActionSpec::Link(vec![PathPair::dotted("a")]),
            ActionSpec::Execute(vec!["never".into()]),
        ]);

        let result = run(&seq, &f.root, &ctx);
        assert_eq!(result.status, ExecutionStatus::Failed);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[1].status, ActionStatus::Failed);
        assert!(result.records[1].message.starts_with("target exists"));
        assert_eq!(result.failure().unwrap().kind, ActionKind::Link);
        assert_eq!(std::fs::read_to_string(f.home.join(".a")).unwrap(), "mine");
        assert!(log.lines.lock().unwrap().iter().any(|l| l.starts_with("error link: target exists")));
    }

    #[test]
    fn empty_sequence_succeeds() {
        let f = fixture(&[]);
        let (ctx, _log) = ctx(&f.home, ok_shell(0));
        let result = run(&sequence(vec![]), &f.root, &ctx);
        assert!(result.is_success());
        assert!(result.records.is_empty());
    }

    #[test]
    fn cancellation_skips_remaining_actions() {
        let f = fixture(&["a"]);
        let (ctx, log) = ctx(&f.home, ok_shell(0));
        ctx.cancelled.store(true, Ordering::SeqCst);
        let seq = sequence(vec![
            ActionSpec::Link(vec![PathPair::dotted("a")]),
            ActionSpec::Execute(vec!["true".into()]),
        ]);

        let result = run(&seq, &f.root, &ctx);
        assert_eq!(result.status, ExecutionStatus::Failed);
        assert!(result.records.iter().all(|r| r.status == ActionStatus::Skipped));
        assert_eq!(result.records.len(), 2);
        assert!(f.home.join(".a").symlink_metadata().is_err());
        assert_eq!(log.lines.lock().unwrap()[0], "warn pkg: cancelled");
    }

    #[test]
    fn result_serializes_for_reporting() {
        let result = ExecutionResult {
            package: "vim".into(),
            variant: None,
            records: vec![ActionRecord {
                kind: ActionKind::LinkRecursively,
                status: ActionStatus::Success,
                message: "2 changed".into(),
            }],
            status: ExecutionStatus::Success,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["records"][0]["kind"], "link_recursively");
        assert_eq!(json["status"], "success");
    }
}
