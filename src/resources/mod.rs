//! Action executors.
//!
//! Link, copy, and recursive-link targets follow a check-then-apply
//! pattern through [`Resource`]; `execute` and `git_clone` have their own
//! entry points because their state lives in a shell or a remote.
pub mod copy;
pub mod git_clone;
pub mod helpers;
pub mod link_recursive;
pub mod shell;
pub mod symlink;

use std::path::Path;

use crate::error::ActionError;

/// State of a filesystem target relative to what an action would produce.
///
/// # Examples
///
/// ```
/// use dotdot_cli::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let wrong = ResourceState::Incorrect { current: "regular file".into() };
///
/// assert_ne!(missing, ResourceState::Correct);
/// assert!(matches!(wrong, ResourceState::Incorrect { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Nothing exists at the target.
    Missing,
    /// The target already matches.
    Correct,
    /// Something else occupies the target.
    Incorrect {
        /// What currently occupies the target.
        current: String,
    },
}

/// Result of converging one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceChange {
    /// The target was created.
    Applied,
    /// The target already matched; nothing was written.
    AlreadyCorrect,
}

/// A single filesystem target an action converges.
pub trait Resource {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// The path this resource writes.
    fn target(&self) -> &Path;

    /// Inspect the target.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is missing or the target cannot be
    /// inspected.
    fn current_state(&self) -> Result<ResourceState, ActionError>;

    /// Create the target. Only called when it is [`ResourceState::Missing`].
    ///
    /// # Errors
    ///
    /// Returns an error if parent directories or the target cannot be
    /// created.
    fn apply(&self) -> Result<ResourceChange, ActionError>;

    /// Create the target if missing, accept it if correct, and refuse to
    /// touch anything else.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::TargetExists`] when the target is occupied by
    /// something other than what this resource would produce, or any error
    /// from [`current_state`](Self::current_state) and [`apply`](Self::apply).
    fn converge(&self) -> Result<ResourceChange, ActionError> {
        match self.current_state()? {
            ResourceState::Missing => self.apply(),
            ResourceState::Correct => Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Incorrect { current } => Err(ActionError::TargetExists {
                path: self.target().to_path_buf(),
                reason: current,
            }),
        }
    }
}

/// Counters for the targets touched by one action.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ActionStats {
    /// Targets created.
    pub changed: u32,
    /// Targets that were already correct.
    pub already_ok: u32,
}

impl ActionStats {
    /// Count one converged target.
    pub fn record(&mut self, change: ResourceChange) {
        match change {
            ResourceChange::Applied => self.changed += 1,
            ResourceChange::AlreadyCorrect => self.already_ok += 1,
        }
    }

    /// Build stats for a single change.
    #[must_use]
    pub fn from_change(change: ResourceChange) -> Self {
        let mut stats = Self::default();
        stats.record(change);
        stats
    }

    /// Render a short human summary.
    ///
    /// # Examples
    ///
    /// ```
    /// use dotdot_cli::resources::ActionStats;
    ///
    /// assert_eq!(ActionStats { changed: 2, already_ok: 1 }.summary(), "2 changed, 1 already ok");
    /// assert_eq!(ActionStats { changed: 0, already_ok: 3 }.summary(), "3 already ok");
    /// assert_eq!(ActionStats::default().summary(), "nothing to do");
    /// ```
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.changed > 0 {
            parts.push(format!("{} changed", self.changed));
        }
        if self.already_ok > 0 {
            parts.push(format!("{} already ok", self.already_ok));
        }
        if parts.is_empty() {
            "nothing to do".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Converge every resource in order, stopping at the first failure.
///
/// # Errors
///
/// Returns the first resource's error; earlier targets stay in place.
pub fn converge_all<R: Resource>(resources: &[R]) -> Result<ActionStats, ActionError> {
    let mut stats = ActionStats::default();
    for resource in resources {
        let change = resource.converge()?;
        tracing::debug!(resource = %resource.description(), ?change, "converged");
        stats.record(change);
    }
    Ok(stats)
}
