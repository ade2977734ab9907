//! Domain-specific error types for dotdot.
//!
//! Internal modules return typed errors while command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! DotdotError
//! ├── Config(ConfigError)   : settings and config-file resolution
//! ├── Spec(SpecError)       : malformed packages and spec documents
//! ├── Resolve(ResolveError) : variant selection
//! └── Action(ActionError)   : a single action failed while executing
//! ```
use std::path::PathBuf;

use thiserror::Error;

use crate::model::ActionKind;

/// Top-level error type for dotdot.
#[derive(Error, Debug)]
pub enum DotdotError {
    /// Settings could not be resolved.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A package could not be built from its directory.
    #[error("Invalid package: {0}")]
    Spec(#[from] SpecError),

    /// A variant could not be selected.
    #[error("Variant resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    /// An action failed.
    #[error("Action failed: {0}")]
    Action(#[from] ActionError),
}

/// Errors that arise while resolving settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("IO error reading config file {path}: {source}")]
    Read {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for the expected shape.
    #[error("Invalid config file {path}: {source}")]
    Parse {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// No home directory could be determined.
    #[error("cannot determine home directory: set DOTDOT_HOME or HOME")]
    NoHome,

    /// The dots directory does not exist.
    #[error("dots path is not a directory: {0}")]
    DotsPathMissing(PathBuf),
}

/// Errors that arise while building a package from its directory and spec
/// document. Any of these aborts building the whole package.
#[derive(Error, Debug)]
pub enum SpecError {
    /// The spec document could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// Path of the unreadable file or directory.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The spec document is not valid YAML.
    #[error("invalid YAML in {path}: {source}")]
    Parse {
        /// Path of the spec document.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },

    /// The path is neither a file nor a directory.
    #[error("path {0} does not contain a valid package")]
    InvalidPackage(PathBuf),

    /// The document's top-level shape is wrong.
    #[error("package '{package}': {reason}")]
    InvalidDocument {
        /// Package name.
        package: String,
        /// What is wrong with the document.
        reason: String,
    },

    /// An action key is not one of the known kinds.
    #[error("package '{package}': unknown action '{action}'")]
    UnknownAction {
        /// Package name.
        package: String,
        /// The unrecognized key.
        action: String,
    },

    /// An entry of a known action kind is malformed.
    #[error("package '{package}': invalid {kind} entry {entry}: {reason}")]
    InvalidEntry {
        /// Package name.
        package: String,
        /// Kind of the action the entry belongs to.
        kind: ActionKind,
        /// The offending entry, rendered compactly.
        entry: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An action list element is neither a mapping, a string, nor a list.
    #[error("package '{package}': invalid action {entry}")]
    InvalidNode {
        /// Package name.
        package: String,
        /// The offending element, rendered compactly.
        entry: String,
    },
}

/// Errors that arise while selecting a package variant.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResolveError {
    /// The requested variant does not exist.
    #[error("package '{package}' does not contain a variant named '{variant}' (available: {available})")]
    VariantNotFound {
        /// Package name.
        package: String,
        /// The requested variant.
        variant: String,
        /// Comma-separated variant names.
        available: String,
    },

    /// No variant was requested and none is named `default`.
    #[error("package '{package}' has no default variant; pick one of: {available}")]
    NoDefaultVariant {
        /// Package name.
        package: String,
        /// Comma-separated variant names.
        available: String,
    },
}

/// Errors that fail a single action.
#[derive(Error, Debug)]
pub enum ActionError {
    /// The source path does not exist in the package.
    #[error("source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// A recursive link source is not a directory.
    #[error("source is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),

    /// The target exists and is not what this action would produce.
    #[error("target exists: {} ({reason})", .path.display())]
    TargetExists {
        /// The conflicting target.
        path: PathBuf,
        /// What currently occupies it.
        reason: String,
    },

    /// A parent directory of the target could not be created.
    #[error("cannot create directory {}: {source}", .path.display())]
    DirectoryCreate {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A filesystem operation failed.
    #[error("{operation} {}: {source}", .path.display())]
    Io {
        /// Short description of the operation (e.g. `"symlink"`).
        operation: &'static str,
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The shell could not be started.
    #[error("cannot start shell: {0}")]
    ShellSpawn(#[source] std::io::Error),

    /// A command of an execute action exited non-zero.
    #[error("command failed (exit {}): {stderr}", .exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    CommandFailed {
        /// Exit code, `None` when terminated by a signal.
        exit_code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// No explicit branch was given and the remote has no default, `main`,
    /// or `master` branch.
    #[error("no branch to check out for {url}: remote has no default, main, or master branch")]
    NoBranchResolved {
        /// Remote URL.
        url: String,
    },

    /// Updating an existing clone would require a merge.
    #[error("branch '{branch}' in {} has diverged from its remote", .path.display())]
    DivergedHistory {
        /// Clone location.
        path: PathBuf,
        /// Checked-out branch.
        branch: String,
    },

    /// The clone destination is occupied by something else.
    #[error("destination conflict at {}: {reason}", .path.display())]
    DestinationConflict {
        /// Clone destination.
        path: PathBuf,
        /// What occupies it.
        reason: String,
    },

    /// The git client reported an error.
    #[error("git: {0}")]
    Vcs(#[from] git2::Error),

    /// The run was interrupted before this action started.
    #[error("cancelled")]
    Cancelled,
}
