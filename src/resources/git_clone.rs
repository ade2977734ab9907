//! The `git_clone` executor.
use std::path::Path;

use super::helpers::fs::{ensure_parent_dir, resolve_target};
use super::ResourceChange;
use crate::error::ActionError;
use crate::model::GitCloneSpec;
use crate::vcs::{FastForward, RemoteRefs, Vcs};

/// Branches tried, in order, after the remote's default.
const FALLBACK_BRANCHES: [&str; 2] = ["main", "master"];

/// Pick the branch to check out when none was requested: the remote's
/// default, then `main`, then `master`.
///
/// # Examples
///
/// ```
/// use dotdot_cli::resources::git_clone::pick_branch;
/// use dotdot_cli::vcs::RemoteRefs;
///
/// let refs = RemoteRefs {
///     default: None,
///     branches: ["master".to_string(), "dev".to_string()].into(),
/// };
/// assert_eq!(pick_branch(&refs), Some("master"));
/// ```
#[must_use]
pub fn pick_branch(refs: &RemoteRefs) -> Option<&str> {
    refs.default
        .as_deref()
        .filter(|name| refs.branches.contains(*name))
        .or_else(|| {
            FALLBACK_BRANCHES
                .into_iter()
                .find(|name| refs.branches.contains(*name))
        })
}

/// Clone the repository, or fast-forward an existing clone of it.
///
/// # Errors
///
/// - [`ActionError::NoBranchResolved`] if no branch was given and the remote
///   has no default, `main`, or `master` branch.
/// - [`ActionError::DestinationConflict`] if the destination exists but is
///   not a clone of the same remote.
/// - [`ActionError::DivergedHistory`] if updating would need a merge.
/// - [`ActionError::Vcs`] for any git failure.
pub fn git_clone(spec: &GitCloneSpec, home: &Path, vcs: &dyn Vcs) -> Result<ResourceChange, ActionError> {
    let dest = resolve_target(home, &spec.to);

    if dest.symlink_metadata().is_err() {
        let branch = match &spec.branch {
            Some(branch) => branch.clone(),
            None => {
                let refs = vcs.remote_branches(&spec.from)?;
                pick_branch(&refs)
                    .map(str::to_string)
                    .ok_or_else(|| ActionError::NoBranchResolved { url: spec.from.clone() })?
            }
        };
        ensure_parent_dir(&dest)?;
        vcs.clone_repo(&spec.from, &dest, &branch)?;
        tracing::info!(url = %spec.from, dest = %dest.display(), branch, "cloned");
        return Ok(ResourceChange::Applied);
    }

    if !vcs.is_repository(&dest) {
        return Err(ActionError::DestinationConflict {
            path: dest,
            reason: "not a git repository".to_string(),
        });
    }
    match vcs.remote_url(&dest)? {
        Some(url) if same_remote(&url, &spec.from) => {}
        Some(url) => {
            return Err(ActionError::DestinationConflict {
                path: dest,
                reason: format!("cloned from {url}"),
            });
        }
        None => {
            return Err(ActionError::DestinationConflict {
                path: dest,
                reason: "repository has no origin remote".to_string(),
            });
        }
    }

    let branch = vcs.current_branch(&dest)?;
    vcs.fetch(&dest)?;
    match vcs.fast_forward(&dest, &branch)? {
        FastForward::UpToDate => Ok(ResourceChange::AlreadyCorrect),
        FastForward::Updated => {
            tracing::info!(dest = %dest.display(), branch, "fast-forwarded");
            Ok(ResourceChange::Applied)
        }
        FastForward::Diverged => Err(ActionError::DivergedHistory { path: dest, branch }),
    }
}

fn same_remote(a: &str, b: &str) -> bool {
    let trim = |s: &str| s.trim_end_matches('/').trim_end_matches(".git").to_string();
    trim(a) == trim(b)
}
