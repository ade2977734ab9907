//! Helpers shared by the filesystem executors.
pub mod fs;
