//! Declarative dotfiles installer.
//!
//! Each package is a directory of dotfiles with an optional `spec.yaml`
//! declaring the actions that install it: links, copies, recursive links,
//! shell commands, and git clones, optionally split into named variants.
//!
//! The public API is organised into layers:
//!
//! - **[`model`]**: build packages from spec documents and resolve a variant
//!   into a flat action sequence
//! - **[`resources`]**: idempotent executors, one per action kind
//! - **[`engine`]**: run a resolved sequence in order, stopping at the first
//!   failure
//! - **[`commands`]**: top-level subcommand orchestration (`list`, `show`,
//!   `install`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod exec;
pub mod logging;
pub mod model;
pub mod resources;
pub mod vcs;

/// Build version: `DOTDOT_VERSION` at compile time, else the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("DOTDOT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}
