//! Settings resolution: where the packages live and where they install to.
pub mod toml_loader;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable overriding the dots directory.
pub const DOTS_PATH_ENV: &str = "DOTDOT_PATH";
/// Environment variable overriding the home directory.
pub const HOME_ENV: &str = "DOTDOT_HOME";

/// Contents of `$XDG_CONFIG_HOME/dotdot/config.toml`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Default dots directory.
    pub dots_path: Option<PathBuf>,
    /// Home directory to install into.
    pub home: Option<PathBuf>,
}

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory containing the packages.
    pub dots_path: PathBuf,
    /// Root that relative targets resolve against.
    pub home: PathBuf,
}

impl Settings {
    /// Resolve settings from the process environment.
    ///
    /// # Errors
    ///
    /// See [`Settings::resolve_with`].
    pub fn resolve(dots_flag: Option<&Path>) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().map_err(|source| ConfigError::Read {
            path: PathBuf::from("."),
            source,
        })?;
        Self::resolve_with(dots_flag, &|key| std::env::var_os(key), &cwd)
    }

    /// Resolve settings with an injectable environment lookup.
    ///
    /// The dots directory is the first of: `dots_flag`, `DOTDOT_PATH`, the
    /// config file's `dots_path`, `cwd`. The home directory is the first of
    /// `DOTDOT_HOME`, the config file's `home`, `HOME` (or `USERPROFILE`).
    /// A leading `~/` in a configured path expands to the home directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHome`] if no home directory is known,
    /// [`ConfigError::DotsPathMissing`] if the dots directory does not
    /// exist, or a config-file error.
    pub fn resolve_with(
        dots_flag: Option<&Path>,
        env: &dyn Fn(&str) -> Option<OsString>,
        cwd: &Path,
    ) -> Result<Self, ConfigError> {
        let var = |key: &str| env(key).filter(|v| !v.is_empty()).map(PathBuf::from);
        let os_home = var("HOME").or_else(|| var("USERPROFILE"));

        let file = match config_file_path(var("XDG_CONFIG_HOME"), os_home.as_deref()) {
            Some(path) => {
                let config: FileConfig = toml_loader::load_config(&path)?;
                tracing::debug!(path = %path.display(), ?config, "loaded config file");
                config
            }
            None => FileConfig::default(),
        };

        let home = var(HOME_ENV)
            .or(file.home)
            .or(os_home)
            .ok_or(ConfigError::NoHome)?;

        let dots_path = dots_flag
            .map(Path::to_path_buf)
            .or_else(|| var(DOTS_PATH_ENV))
            .or(file.dots_path)
            .unwrap_or_else(|| cwd.to_path_buf());
        let dots_path = expand_home(&dots_path, &home);
        let dots_path = if dots_path.is_absolute() {
            dots_path
        } else {
            cwd.join(dots_path)
        };

        if !dots_path.is_dir() {
            return Err(ConfigError::DotsPathMissing(dots_path));
        }
        Ok(Self { dots_path, home })
    }
}

fn config_file_path(xdg_config: Option<PathBuf>, home: Option<&Path>) -> Option<PathBuf> {
    let base = xdg_config.or_else(|| home.map(|h| h.join(".config")))?;
    Some(base.join("dotdot").join("config.toml"))
}

fn expand_home(path: &Path, home: &Path) -> PathBuf {
    path.strip_prefix("~").map_or_else(|_| path.to_path_buf(), |rest| home.join(rest))
}
