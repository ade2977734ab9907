//! Loading packages from the dots directory.
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde_yaml::Value;

use super::package::Package;
use super::parse::SPEC_FILE_NAME;
use crate::error::SpecError;

/// Load the package at `path`.
///
/// A directory with a `spec.yaml` is built from that document; a directory
/// without one is the link-everything shorthand; a plain file links itself.
/// The package root is canonicalized so link sources are absolute.
///
/// # Errors
///
/// Returns a [`SpecError`] if the path cannot be read, the document is not
/// valid YAML, or its structure is malformed.
pub fn load_package(path: &Path) -> Result<Package, SpecError> {
    let path = dunce::canonicalize(path).map_err(|source| SpecError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| SpecError::InvalidPackage(path.clone()))?;

    if path.is_file() {
        let root = path.parent().ok_or_else(|| SpecError::InvalidPackage(path.clone()))?;
        tracing::debug!(package = %name, "loaded single-file package");
        return Ok(Package::single_file(&name, root));
    }
    if !path.is_dir() {
        return Err(SpecError::InvalidPackage(path));
    }

    let spec_path = path.join(SPEC_FILE_NAME);
    if !spec_path.exists() {
        tracing::debug!(package = %name, "no {SPEC_FILE_NAME}, linking every entry");
        return Package::implicit(&name, &path);
    }

    let content = std::fs::read_to_string(&spec_path).map_err(|source| SpecError::Read {
        path: spec_path.clone(),
        source,
    })?;
    let doc: Value = if content.trim().is_empty() {
        Value::Null
    } else {
        serde_yaml::from_str(&content).map_err(|source| SpecError::Parse {
            path: spec_path.clone(),
            source,
        })?
    };
    let package = Package::from_document(&name, &path, &doc)?;
    tracing::debug!(package = %name, variants = ?package.variants.names(), "loaded {}", spec_path.display());
    Ok(package)
}

/// Result of scanning a dots directory.
#[derive(Debug, Default)]
pub struct Scan {
    /// Successfully loaded packages, sorted by name.
    pub packages: Vec<Package>,
    /// Entries that failed to load, with their paths.
    pub errors: Vec<(PathBuf, SpecError)>,
}

/// Load every non-hidden entry of `dots` in parallel.
///
/// A malformed package does not prevent the others from loading; its error
/// is returned alongside the loaded packages.
///
/// # Errors
///
/// Returns [`SpecError::Read`] if `dots` itself cannot be listed.
pub fn scan(dots: &Path) -> Result<Scan, SpecError> {
    let read_err = |source| SpecError::Read {
        path: dots.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dots).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        if !entry.file_name().to_string_lossy().starts_with('.') {
            paths.push(entry.path());
        }
    }

    let results: Vec<(PathBuf, Result<Package, SpecError>)> = paths
        .into_par_iter()
        .map(|path| {
            let result = load_package(&path);
            (path, result)
        })
        .collect();

    let mut scan = Scan::default();
    for (path, result) in results {
        match result {
            Ok(package) => scan.packages.push(package),
            Err(e) => scan.errors.push((path, e)),
        }
    }
    scan.packages.sort_by(|a, b| a.name.cmp(&b.name));
    scan.errors.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(scan)
}
