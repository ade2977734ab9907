//! The `link_recursively` executor.
use std::path::Path;

use super::helpers::fs::{resolve_source, resolve_target, walk_files};
use super::symlink::SymlinkResource;
use super::{ActionStats, Resource};
use crate::error::ActionError;
use crate::model::PathPair;

/// Link every file below each pair's source directory to the same relative
/// path below its target, creating directories on the way.
///
/// # Errors
///
/// Returns [`ActionError::SourceNotDirectory`] if a source is not a
/// directory, or the first file link's error. Files linked before the
/// failure stay linked.
pub fn link_recursively(pairs: &[PathPair], root: &Path, home: &Path) -> Result<ActionStats, ActionError> {
    let mut stats = ActionStats::default();
    for pair in pairs {
        let source = resolve_source(root, &pair.from)?;
        if !source.is_dir() {
            return Err(ActionError::SourceNotDirectory(source));
        }
        let target = resolve_target(home, &pair.to);

        for rel in walk_files(&source)? {
            let resource = SymlinkResource::new(source.join(&rel), target.join(&rel));
            let change = resource.converge()?;
            tracing::debug!(resource = %resource.description(), ?change, "converged");
            stats.record(change);
        }
    }
    Ok(stats)
}
