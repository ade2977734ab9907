//! Normalized action kinds and their arguments.
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// The closed set of action kinds a package may declare.
///
/// # Examples
///
/// ```
/// use dotdot_cli::model::ActionKind;
///
/// assert_eq!("link_recursively".parse::<ActionKind>(), Ok(ActionKind::LinkRecursively));
/// assert_eq!("GIT_CLONE".parse::<ActionKind>(), Ok(ActionKind::GitClone));
/// assert!("symlink".parse::<ActionKind>().is_err());
/// assert_eq!(ActionKind::Copy.to_string(), "copy");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Symlink package files into the home directory.
    Link,
    /// Copy package files into the home directory.
    Copy,
    /// Symlink every file under a package directory, one link per file.
    LinkRecursively,
    /// Run shell commands from the package root.
    Execute,
    /// Clone a git repository, or fast-forward an existing clone.
    GitClone,
}

impl ActionKind {
    /// Every kind, in the order they are documented.
    pub const ALL: [Self; 5] = [
        Self::Link,
        Self::Copy,
        Self::LinkRecursively,
        Self::Execute,
        Self::GitClone,
    ];

    /// Key used for this kind in `spec.yaml`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Copy => "copy",
            Self::LinkRecursively => "link_recursively",
            Self::Execute => "execute",
            Self::GitClone => "git_clone",
        }
    }

    /// Long-form help shown by `dotdot help-actions <kind>`.
    ///
    /// The first line is a one-sentence summary.
    #[must_use]
    pub const fn help(self) -> &'static str {
        match self {
            Self::Link => {
                "Symlink files or directories from the package into the home directory.\n\
                 \n\
                 Entries are a path, a {from, to} mapping, or a list of those.\n\
                 When `to` is omitted the target is the dotted name: `bashrc` -> `~/.bashrc`.\n\
                 `to` may be absolute or start with `~/`; otherwise it is relative to home.\n\
                 `from: \"*\"` links every top-level entry of the package.\n\
                 \n\
                 An existing link to the same source is left alone. Any other existing\n\
                 file at the target is an error and is never overwritten.\n\
                 \n\
                 Example:\n\
                 \x20 - link: [vimrc, {from: nvim, to: .config/nvim}]"
            }
            Self::Copy => {
                "Copy files or directories from the package into the home directory.\n\
                 \n\
                 Entries use the same shape as `link`. Directories are copied recursively.\n\
                 A target whose content already matches the source is left alone; a\n\
                 target with different content is an error.\n\
                 \n\
                 Example:\n\
                 \x20 - copy: {from: gitconfig.local, to: .gitconfig.local}"
            }
            Self::LinkRecursively => {
                "Symlink every file under a package directory, creating directories as needed.\n\
                 \n\
                 Only files are linked; the directory structure is recreated under the\n\
                 target. Empty directories produce nothing. The first failing file stops\n\
                 the walk.\n\
                 \n\
                 Example:\n\
                 \x20 - link_recursively: {from: config, to: .config}"
            }
            Self::Execute => {
                "Run shell commands with the package directory as working directory.\n\
                 \n\
                 All commands of one action run in a single shell, so variables set by\n\
                 one command are visible to the next. The first failing command stops\n\
                 the action. Separate `execute` actions do not share variables.\n\
                 \n\
                 Example:\n\
                 \x20 - execute:\n\
                 \x20   - PREFIX=$HOME/.local\n\
                 \x20   - make install PREFIX=$PREFIX"
            }
            Self::GitClone => {
                "Clone a git repository, or fast-forward an existing clone.\n\
                 \n\
                 Fields: `from` (or `url`), `to`, and optional `branch`. Without a branch\n\
                 the remote default branch is used, then `main`, then `master`.\n\
                 An existing clone of the same remote is fetched and fast-forwarded;\n\
                 diverged history is an error and is never merged.\n\
                 \n\
                 Example:\n\
                 \x20 - git_clone: {from: https://github.com/tmux-plugins/tpm, to: .tmux/plugins/tpm}"
            }
        }
    }

    /// First line of [`help`](Self::help).
    #[must_use]
    pub fn summary(self) -> &'static str {
        self.help().lines().next().unwrap_or_default()
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| format!("unknown action '{s}'"))
    }
}

/// A single `{from, to}` pair of a link, copy, or recursive-link action.
///
/// `from` is relative to the package root; `to` is relative to the home
/// directory unless absolute (or `~/`-prefixed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathPair {
    /// Source path, relative to the package root.
    pub from: String,
    /// Target path, relative to home or absolute.
    pub to: String,
}

impl PathPair {
    /// Pair `from` with an explicit target.
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Pair `from` with its hidden-dotfile target (`bashrc` -> `.bashrc`).
    #[must_use]
    pub fn dotted(from: impl Into<String>) -> Self {
        let from = from.into();
        let to = format!(".{from}");
        Self { from, to }
    }
}

impl fmt::Display for PathPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Arguments of a `git_clone` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitCloneSpec {
    /// Remote URL.
    pub from: String,
    /// Destination, relative to home or absolute.
    pub to: String,
    /// Branch to check out; resolved from the remote when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// One normalized action of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSpec {
    /// Symlink each pair.
    Link(Vec<PathPair>),
    /// Copy each pair.
    Copy(Vec<PathPair>),
    /// Symlink every file below each pair's source directory.
    LinkRecursively(Vec<PathPair>),
    /// Run the commands in one shell.
    Execute(Vec<String>),
    /// Clone or update a repository.
    GitClone(GitCloneSpec),
}

impl ActionSpec {
    /// The kind tag of this action.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Link(_) => ActionKind::Link,
            Self::Copy(_) => ActionKind::Copy,
            Self::LinkRecursively(_) => ActionKind::LinkRecursively,
            Self::Execute(_) => ActionKind::Execute,
            Self::GitClone(_) => ActionKind::GitClone,
        }
    }
}

impl fmt::Display for ActionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.kind())?;
        match self {
            Self::Link(pairs) | Self::Copy(pairs) | Self::LinkRecursively(pairs) => {
                let rendered: Vec<String> = pairs.iter().map(ToString::to_string).collect();
                f.write_str(&rendered.join(", "))
            }
            Self::Execute(commands) => {
                let first_lines: Vec<&str> = commands
                    .iter()
                    .map(|c| c.lines().next().unwrap_or_default())
                    .collect();
                f.write_str(&first_lines.join("; "))
            }
            Self::GitClone(spec) => {
                write!(f, "{} -> {}", spec.from, spec.to)?;
                if let Some(branch) = &spec.branch {
                    write!(f, " ({branch})")?;
                }
                Ok(())
            }
        }
    }
}
