//! Copy resource and the `copy` executor.
use std::path::{Path, PathBuf};

use super::helpers::fs::{
    content_digest, copy_dir_recursive, ensure_parent_dir, resolve_source, resolve_target,
};
use super::symlink::is_absent;
use super::{ActionStats, Resource, ResourceChange, ResourceState, converge_all};
use crate::error::ActionError;
use crate::model::PathPair;

/// A file or directory copied from a package into place.
///
/// A target whose content already equals the source is left alone. A
/// symlink at the target is never followed, so it always conflicts.
#[derive(Debug, Clone)]
pub struct CopyResource {
    /// File or directory inside the package.
    pub source: PathBuf,
    /// Where the copy is placed.
    pub target: PathBuf,
}

impl CopyResource {
    /// Create a new copy resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Resource for CopyResource {
    fn description(&self) -> String {
        format!("{} <= {}", self.target.display(), self.source.display())
    }

    fn target(&self) -> &Path {
        &self.target
    }

    fn current_state(&self) -> Result<ResourceState, ActionError> {
        if !self.source.exists() {
            return Err(ActionError::SourceNotFound(self.source.clone()));
        }
        let meta = match self.target.symlink_metadata() {
            Ok(meta) => meta,
            Err(e) if is_absent(&e) => return Ok(ResourceState::Missing),
            Err(source) => {
                return Err(ActionError::Io {
                    operation: "inspect",
                    path: self.target.clone(),
                    source,
                });
            }
        };
        if meta.file_type().is_symlink() {
            return Ok(ResourceState::Incorrect {
                current: "symlink".to_string(),
            });
        }
        if content_digest(&self.source)? == content_digest(&self.target)? {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "content differs".to_string(),
            })
        }
    }

    fn apply(&self) -> Result<ResourceChange, ActionError> {
        ensure_parent_dir(&self.target)?;
        if self.source.is_dir() {
            copy_dir_recursive(&self.source, &self.target)?;
        } else {
            std::fs::copy(&self.source, &self.target).map_err(|source| ActionError::Io {
                operation: "copy",
                path: self.target.clone(),
                source,
            })?;
        }
        Ok(ResourceChange::Applied)
    }
}

/// Run a `copy` action: one copy per pair, in order.
///
/// # Errors
///
/// Returns the first pair's error; copies made before it are kept.
pub fn copy(pairs: &[PathPair], root: &Path, home: &Path) -> Result<ActionStats, ActionError> {
    let resources = pairs
        .iter()
        .map(|pair| {
            Ok(CopyResource::new(
                resolve_source(root, &pair.from)?,
                resolve_target(home, &pair.to),
            ))
        })
        .collect::<Result<Vec<_>, ActionError>>()?;
    converge_all(&resources)
}
