//! Command: print version information.

/// Print the dotdot version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("dotdot {}", crate::version());
}
