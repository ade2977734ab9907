//! Symlink resource and the `link` executor.
use std::path::{Path, PathBuf};

use super::helpers::fs::{ensure_parent_dir, resolve_source, resolve_target};
use super::{ActionStats, Resource, ResourceChange, ResourceState, converge_all};
use crate::error::ActionError;
use crate::model::PathPair;

/// A symlink resource that can be checked and applied.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// The source file/directory (what the symlink points to).
    pub source: PathBuf,
    /// The target path (where the symlink will be created).
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Resource for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn target(&self) -> &Path {
        &self.target
    }

    fn current_state(&self) -> Result<ResourceState, ActionError> {
        if self.source.symlink_metadata().is_err() {
            return Err(ActionError::SourceNotFound(self.source.clone()));
        }

        let meta = match std::fs::symlink_metadata(&self.target) {
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

        if !meta.file_type().is_symlink() {
            let current = if meta.is_dir() { "directory" } else { "regular file" };
            return Ok(ResourceState::Incorrect {
                current: current.to_string(),
            });
        }

        let existing = std::fs::read_link(&self.target).map_err(|source| ActionError::Io {
            operation: "read link",
            path: self.target.clone(),
            source,
        })?;
        if paths_equal(&existing, &self.source) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: format!("link to {}", existing.display()),
            })
        }
    }

    fn apply(&self) -> Result<ResourceChange, ActionError> {
        ensure_parent_dir(&self.target)?;
        create_symlink(&self.source, &self.target).map_err(|source| ActionError::Io {
            operation: "symlink",
            path: self.target.clone(),
            source,
        })?;
        Ok(ResourceChange::Applied)
    }
}

/// Run a `link` action: one symlink per pair, in order.
///
/// # Errors
///
/// Returns the first pair's error; links created before it are kept.
pub fn link(pairs: &[PathPair], root: &Path, home: &Path) -> Result<ActionStats, ActionError> {
    let resources = pairs
        .iter()
        .map(|pair| {
            Ok(SymlinkResource::new(
                resolve_source(root, &pair.from)?,
                resolve_target(home, &pair.to),
            ))
        })
        .collect::<Result<Vec<_>, ActionError>>()?;
    converge_all(&resources)
}

/// Whether a lookup error means nothing exists at the path.
///
/// A file standing in for a parent directory counts as absent; creating the
/// parent then reports the conflict.
pub(crate) fn is_absent(error: &std::io::Error) -> bool {
    matches!(
        error.kind(),
        std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
    )
}

/// Compare two paths for equality, handling UNC prefix normalization on Windows.
fn paths_equal(a: &Path, b: &Path) -> bool {
    let normalize = |p: &Path| -> PathBuf {
        #[cfg(windows)]
        {
            let s = p.to_string_lossy();
            if let Some(stripped) = s.strip_prefix(r"\\?\") {
                return PathBuf::from(stripped);
            }
        }
        p.to_path_buf()
    };

    normalize(a) == normalize(b)
}

/// Create a symlink at `link` pointing to `target`.
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)
    }

    #[cfg(windows)]
    {
        if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        }
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    struct Fixture {
        _dir: tempfile::TempDir,
        root: PathBuf,
        home: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("pkg");
        let home = dir.path().join("home");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::create_dir_all(&home).unwrap();
        Fixture { _dir: dir, root, home }
    }

    #[test]
    fn paths_equal_works() {
        assert!(paths_equal(Path::new("/tmp/test"), Path::new("/tmp/test")));
        assert!(!paths_equal(Path::new("/tmp/test"), Path::new("/tmp/other")));
    }

    #[test]
    fn missing_source_is_an_error() {
        let f = fixture();
        let resource = SymlinkResource::new(f.root.join("nope"), f.home.join(".nope"));
        assert!(matches!(
            resource.current_state(),
            Err(ActionError::SourceNotFound(_))
        ));
    }

    #[test]
    fn missing_when_target_absent() {
        let f = fixture();
        std::fs::write(f.root.join("source"), "x").unwrap();
        let resource = SymlinkResource::new(f.root.join("source"), f.home.join("target"));
        assert_eq!(resource.current_state().unwrap(), ResourceState::Missing);
    }

    #[test]
    fn correct_when_link_points_to_source() {
        let f = fixture();
        let source = f.root.join("source");
        let target = f.home.join("target");
        std::fs::write(&source, "x").unwrap();
        std::os::unix::fs::symlink(&source, &target).unwrap();

        let resource = SymlinkResource::new(source, target);
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
    }

    #[test]
    fn incorrect_when_link_points_elsewhere() {
        let f = fixture();
        let source = f.root.join("source");
        let other = f.root.join("other");
        let target = f.home.join("target");
        std::fs::write(&source, "x").unwrap();
        std::fs::write(&other, "y").unwrap();
        std::os::unix::fs::symlink(&other, &target).unwrap();

        let resource = SymlinkResource::new(source, target);
        assert!(matches!(
            resource.current_state().unwrap(),
            ResourceState::Incorrect { current } if current.starts_with("link to")
        ));
    }

    #[test]
    fn incorrect_when_target_is_directory() {
        let f = fixture();
        std::fs::write(f.root.join("source"), "x").unwrap();
        std::fs::create_dir(f.home.join("target")).unwrap();
        let resource = SymlinkResource::new(f.root.join("source"), f.home.join("target"));
        assert_eq!(
            resource.current_state().unwrap(),
            ResourceState::Incorrect {
                current: "directory".to_string()
            }
        );
    }

    #[test]
    fn link_creates_parents_and_is_idempotent() {
        let f = fixture();
        std::fs::create_dir(f.root.join("nvim")).unwrap();
        let pairs = [PathPair::new("nvim", ".config/nvim")];

        let first = link(&pairs, &f.root, &f.home).unwrap();
        assert_eq!(first.changed, 1);
        assert_eq!(
            std::fs::read_link(f.home.join(".config/nvim")).unwrap(),
            f.root.join("nvim")
        );

        let second = link(&pairs, &f.root, &f.home).unwrap();
        assert_eq!(second, ActionStats { changed: 0, already_ok: 1 });
    }

    #[test]
    fn link_never_overwrites_a_regular_file() {
        let f = fixture();
        std::fs::write(f.root.join("bashrc"), "new").unwrap();
        std::fs::write(f.home.join(".bashrc"), "mine").unwrap();

        let err = link(&[PathPair::dotted("bashrc")], &f.root, &f.home).unwrap_err();
        assert!(matches!(err, ActionError::TargetExists { .. }), "{err}");
        assert_eq!(std::fs::read_to_string(f.home.join(".bashrc")).unwrap(), "mine");
    }

    #[test]
    fn file_in_place_of_a_parent_directory_fails_to_create_it() {
        let f = fixture();
        std::fs::write(f.root.join("a"), "").unwrap();
        std::fs::write(f.home.join("blocker"), "keep").unwrap();

        let err = link(&[PathPair::new("a", "blocker/child/a")], &f.root, &f.home).unwrap_err();
        assert!(matches!(err, ActionError::DirectoryCreate { .. }), "{err}");
        assert_eq!(std::fs::read_to_string(f.home.join("blocker")).unwrap(), "keep");
    }

    #[test]
    fn link_checks_every_source_before_linking() {
        let f = fixture();
        std::fs::write(f.root.join("a"), "").unwrap();
        let err = link(
            &[PathPair::dotted("a"), PathPair::dotted("missing")],
            &f.root,
            &f.home,
        )
        .unwrap_err();
        assert!(matches!(err, ActionError::SourceNotFound(_)), "{err}");
        assert!(f.home.join(".a").symlink_metadata().is_err());
    }
}
