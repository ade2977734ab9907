use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::exec::Shell;
use crate::logging::Log;
use crate::vcs::Vcs;

/// Shared context for executing resolved packages.
///
/// Everything an executor touches outside its own arguments comes from
/// here, so tests can point a run at any home directory with fake
/// capabilities.
#[derive(Clone)]
pub struct Context {
    /// Root that relative targets are resolved against.
    pub home: PathBuf,
    /// Shell used by `execute` actions.
    pub shell: Arc<dyn Shell>,
    /// Git client used by `git_clone` actions.
    pub vcs: Arc<dyn Vcs>,
    /// Logger for output and package recording.
    pub log: Arc<dyn Log>,
    /// Set by the interrupt handler; checked before each action.
    pub cancelled: Arc<AtomicBool>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("home", &self.home)
            .field("shell", &"<dyn Shell>")
            .field("vcs", &"<dyn Vcs>")
            .field("log", &"<dyn Log>")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl Context {
    /// Creates a new context with a fresh cancellation flag.
    #[must_use]
    pub fn new(home: PathBuf, shell: Arc<dyn Shell>, vcs: Arc<dyn Vcs>, log: Arc<dyn Log>) -> Self {
        Self {
            home,
            shell,
            vcs,
            log,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an existing cancellation flag (e.g. one set by a Ctrl-C handler).
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancelled = flag;
        self
    }

    /// Whether the run has been interrupted.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
