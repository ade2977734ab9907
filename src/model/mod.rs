//! Package, variant, and action model.
//!
//! Packages are built from their directory and parsed `spec.yaml`
//! ([`loader`]), their action lists interpreted into [`ActionNode`] trees
//! ([`parse`]), and one variant selected and flattened into a
//! [`ResolvedSequence`] ([`resolve`](mod@resolve)).
pub mod action;
pub mod loader;
pub mod package;
pub mod parse;
pub mod resolve;
pub mod tree;

pub use action::{ActionKind, ActionSpec, GitCloneSpec, PathPair};
pub use loader::{Scan, load_package, scan};
pub use package::{DEFAULT_VARIANT, Package, Variants};
pub use resolve::{ResolvedSequence, resolve};
pub use tree::{ActionNode, flatten};
