//! File-system helpers for the link and copy executors.
use std::io::Read as _;
use std::path::{Component, Path, PathBuf};

use sha2::{Digest as _, Sha256};

use crate::error::ActionError;

/// Resolve an action target against the home directory.
///
/// Absolute targets are used as-is, `~` and `~/`-prefixed targets are
/// rooted at `home`, and everything else is relative to `home`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use dotdot_cli::resources::helpers::fs::resolve_target;
///
/// let home = Path::new("/home/u");
/// assert_eq!(resolve_target(home, ".vimrc"), Path::new("/home/u/.vimrc"));
/// assert_eq!(resolve_target(home, "~/.config/nvim"), Path::new("/home/u/.config/nvim"));
/// assert_eq!(resolve_target(home, "/etc/hosts"), Path::new("/etc/hosts"));
/// ```
#[must_use]
pub fn resolve_target(home: &Path, to: &str) -> PathBuf {
    if to == "~" {
        return home.to_path_buf();
    }
    if let Some(rest) = to.strip_prefix("~/") {
        return home.join(rest);
    }
    let path = Path::new(to);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        home.join(path)
    }
}

/// Resolve an action source inside the package root.
///
/// # Errors
///
/// Returns [`ActionError::SourceNotFound`] if nothing exists at the
/// resolved path.
pub fn resolve_source(root: &Path, from: &str) -> Result<PathBuf, ActionError> {
    let source = root.join(from);
    if source.symlink_metadata().is_err() {
        return Err(ActionError::SourceNotFound(source));
    }
    Ok(normalize(&source))
}

/// Drop `.` components so link targets read cleanly.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns [`ActionError::DirectoryCreate`] if the directory cannot be
/// created, for example when a path component is an existing file.
pub fn ensure_parent_dir(path: &Path) -> Result<(), ActionError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ActionError::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Recursively copy a directory tree.
///
/// Symlinks within the source tree are *followed*: directory symlinks are
/// recursed into and their contents materialised rather than copying the
/// link itself.
///
/// # Errors
///
/// Returns an error if a directory cannot be created, a source entry cannot
/// be read, or a file cannot be copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), ActionError> {
    std::fs::create_dir_all(dst).map_err(|source| ActionError::DirectoryCreate {
        path: dst.to_path_buf(),
        source,
    })?;
    for entry in read_dir_sorted(src)? {
        let src_path = src.join(&entry);
        let dst_path = dst.join(&entry);
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path).map_err(|source| ActionError::Io {
                operation: "copy",
                path: dst_path.clone(),
                source,
            })?;
        }
    }
    Ok(())
}

/// Every file below `dir`, relative to `dir`, in sorted order.
///
/// Directories (symlinked ones included) are descended into and never
/// returned themselves, so empty directories contribute nothing.
///
/// # Errors
///
/// Returns [`ActionError::Io`] if a directory cannot be listed.
pub fn walk_files(dir: &Path) -> Result<Vec<PathBuf>, ActionError> {
    fn walk(base: &Path, rel: &Path, out: &mut Vec<PathBuf>) -> Result<(), ActionError> {
        let dir = base.join(rel);
        for name in read_dir_sorted(&dir)? {
            let rel = rel.join(&name);
            if base.join(&rel).is_dir() {
                walk(base, &rel, out)?;
            } else {
                out.push(rel);
            }
        }
        Ok(())
    }

    let mut out = Vec::new();
    walk(dir, Path::new(""), &mut out)?;
    Ok(out)
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<std::ffi::OsString>, ActionError> {
    let io_err = |source| ActionError::Io {
        operation: "read directory",
        path: dir.to_path_buf(),
        source,
    };
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        names.push(entry.map_err(io_err)?.file_name());
    }
    names.sort();
    Ok(names)
}

/// SHA-256 digest of a file, or of a whole directory tree (relative paths
/// and file contents).
///
/// A file and a directory never share a digest.
///
/// # Errors
///
/// Returns [`ActionError::Io`] if any file cannot be read.
pub fn content_digest(path: &Path) -> Result<Vec<u8>, ActionError> {
    let mut hasher = Sha256::new();
    if path.is_dir() {
        hasher.update(b"tree\0");
        for rel in walk_files(path)? {
            hasher.update(rel.to_string_lossy().as_bytes());
            hasher.update(b"\0");
            hasher.update(file_digest(&path.join(&rel))?);
        }
    } else {
        hasher.update(b"file\0");
        hasher.update(file_digest(path)?);
    }
    Ok(hasher.finalize().to_vec())
}

fn file_digest(path: &Path) -> Result<Vec<u8>, ActionError> {
    let io_err = |source| ActionError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(io_err)?;
    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 8192];
    loop {
        let n = file.read(&mut buf).map_err(io_err)?;
        if n == 0 {
            break;
        }
        hasher.update(buf.get(..n).unwrap_or_default());
    }
    Ok(hasher.finalize().to_vec())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tree(root: &Path, files: &[(&str, &str)]) {
        for (rel, content) in files {
            let path = root.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
    }

    #[test]
    fn relative_target_is_under_home() {
        let home = Path::new("/home/u");
        assert_eq!(resolve_target(home, ".config/app"), home.join(".config/app"));
        assert_eq!(resolve_target(home, "~"), home);
    }

    #[test]
    fn resolve_source_requires_existence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("present"), "").unwrap();
        assert_eq!(
            resolve_source(dir.path(), "./present").unwrap(),
            dir.path().join("present")
        );
        assert!(matches!(
            resolve_source(dir.path(), "absent"),
            Err(ActionError::SourceNotFound(_))
        ));
    }

    #[test]
    fn copies_files_and_subdirectories() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        tree(src.path(), &[("a.txt", "aaa"), ("sub/b.txt", "bbb")]);

        let target = dst.path().join("out");
        copy_dir_recursive(src.path(), &target).unwrap();

        assert_eq!(std::fs::read(target.join("a.txt")).unwrap(), b"aaa");
        assert_eq!(std::fs::read(target.join("sub/b.txt")).unwrap(), b"bbb");
    }

    #[test]
    fn walk_files_skips_empty_directories() {
        let dir = tempfile::tempdir().unwrap();
        tree(dir.path(), &[("b", ""), ("a/x", ""), ("a/deep/y", "")]);
        std::fs::create_dir_all(dir.path().join("empty/inner")).unwrap();

        let files = walk_files(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("a/deep/y"),
                PathBuf::from("a/x"),
                PathBuf::from("b"),
            ]
        );
    }

    #[test]
    fn ensure_parent_dir_creates_missing_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("file.txt");
        ensure_parent_dir(&nested).unwrap();
        assert!(dir.path().join("a").join("b").exists());
    }

    #[test]
    fn ensure_parent_dir_fails_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blocker"), "").unwrap();
        let err = ensure_parent_dir(&dir.path().join("blocker/child/file")).unwrap_err();
        assert!(matches!(err, ActionError::DirectoryCreate { .. }), "{err}");
    }

    #[test]
    fn digest_tracks_content_and_layout() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        tree(a.path(), &[("x", "1"), ("sub/y", "2")]);
        tree(b.path(), &[("x", "1"), ("sub/y", "2")]);
        assert_eq!(content_digest(a.path()).unwrap(), content_digest(b.path()).unwrap());

        std::fs::write(b.path().join("sub/y"), "3").unwrap();
        assert_ne!(content_digest(a.path()).unwrap(), content_digest(b.path()).unwrap());
    }

    #[test]
    fn file_and_directory_digests_differ() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f"), "").unwrap();
        std::fs::create_dir(dir.path().join("d")).unwrap();
        assert_ne!(
            content_digest(&dir.path().join("f")).unwrap(),
            content_digest(&dir.path().join("d")).unwrap()
        );
    }
}
