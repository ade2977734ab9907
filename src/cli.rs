use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for dotdot.
#[derive(Parser, Debug)]
#[command(
    name = "dotdot",
    about = "Declarative dotfiles installer driven by per-package spec files",
    version = crate::version()
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Directory containing the packages (defaults to $DOTDOT_PATH, the
    /// config file, then the current directory)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub dots_path: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available packages
    List,
    /// Show a package's variants and resolved actions
    Show(ShowOpts),
    /// Install one or more packages
    Install(InstallOpts),
    /// Describe the action kinds a spec file may use
    HelpActions(HelpActionsOpts),
    /// Print a shell completion script
    Completions(CompletionsOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file of this command.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Show(_) => "show",
            Self::Install(_) => "install",
            Self::HelpActions(_) => "help-actions",
            Self::Completions(_) => "completions",
            Self::Version => "version",
        }
    }
}

/// Options for the `show` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ShowOpts {
    /// Package to show
    pub package: String,

    /// Variant to resolve (defaults to `default`)
    #[arg(short = 'V', long)]
    pub variant: Option<String>,

    /// Print the resolved actions as JSON
    #[arg(long)]
    pub json: bool,
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct InstallOpts {
    /// Packages to install, in order
    #[arg(required = true)]
    pub packages: Vec<String>,

    /// Variant to install for every package (defaults to `default`)
    #[arg(short = 'V', long)]
    pub variant: Option<String>,
}

/// Options for the `help-actions` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct HelpActionsOpts {
    /// Action kind to describe in full
    pub kind: Option<String>,
}

/// Options for the `completions` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct CompletionsOpts {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
