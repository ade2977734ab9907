pub mod completions;
pub mod help_actions;
pub mod install;
pub mod list;
pub mod show;
pub mod version;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::Settings;
use crate::logging::Log;
use crate::model::{Package, load_package};

/// Shared state produced by the common command setup sequence.
///
/// Resolves where packages are read from and where they install to so
/// each command does not have to repeat the lookup.
#[derive(Debug)]
pub struct CommandSetup {
    /// Resolved dots directory and home.
    pub settings: Settings,
}

impl CommandSetup {
    /// Resolve settings from the global flags, environment, and config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home or dots directory cannot be determined.
    pub fn init(global: &GlobalOpts, log: &dyn Log) -> Result<Self> {
        let settings = Settings::resolve(global.dots_path.as_deref())?;
        log.debug(&format!("dots path: {}", settings.dots_path.display()));
        log.debug(&format!("home: {}", settings.home.display()));
        Ok(Self { settings })
    }
}

/// Path of the package called `name` inside `dots`.
///
/// # Errors
///
/// Returns an error if `name` is not a single path component or nothing by
/// that name exists in `dots`.
pub fn package_path(dots: &Path, name: &str) -> Result<PathBuf> {
    let mut components = Path::new(name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    );
    if !single || name.starts_with('.') {
        anyhow::bail!("invalid package name '{name}'");
    }
    let path = dots.join(name);
    if path.symlink_metadata().is_err() {
        anyhow::bail!("no package named '{name}' in {}", dots.display());
    }
    Ok(path)
}

/// Load the package called `name` from `dots`.
///
/// # Errors
///
/// Returns an error if the package does not exist or is malformed.
pub fn load_named(dots: &Path, name: &str) -> Result<Package> {
    let path = package_path(dots, name)?;
    load_package(&path).with_context(|| format!("loading package '{name}'"))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn package_path_finds_entry() {
        let dots = tempfile::tempdir().unwrap();
        std::fs::create_dir(dots.path().join("vim")).unwrap();
        assert_eq!(package_path(dots.path(), "vim").unwrap(), dots.path().join("vim"));
    }

    #[test]
    fn package_path_rejects_missing_and_nested_names() {
        let dots = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dots.path().join("a/b")).unwrap();

        let err = package_path(dots.path(), "zsh").unwrap_err();
        assert!(err.to_string().contains("no package named 'zsh'"));
        assert!(package_path(dots.path(), "a/b").is_err());
        assert!(package_path(dots.path(), "..").is_err());
        assert!(package_path(dots.path(), ".hidden").is_err());
    }

    #[test]
    fn load_named_reports_package_in_context() {
        let dots = tempfile::tempdir().unwrap();
        std::fs::create_dir(dots.path().join("bad")).unwrap();
        std::fs::write(dots.path().join("bad/spec.yaml"), "actions: {link: [}\n").unwrap();

        let err = load_named(dots.path(), "bad").unwrap_err();
        assert!(err.to_string().contains("loading package 'bad'"));
        assert!(format!("{err:#}").contains("invalid YAML"));
    }
}
