//! Command: list the packages of the dots directory.
use std::fmt::Write as _;

use anyhow::Result;

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::logging::Log;
use crate::model::{DEFAULT_VARIANT, Package, Scan, scan};

/// Run the list command.
///
/// Packages that fail to load are reported as warnings and left out.
///
/// # Errors
///
/// Returns an error if settings cannot be resolved or the dots directory
/// cannot be read.
#[allow(clippy::print_stdout)]
pub fn run(global: &GlobalOpts, log: &dyn Log) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let scan = scan(&setup.settings.dots_path)?;
    report_errors(&scan, log);
    print!("{}", render(&scan.packages));
    Ok(())
}

/// Warn about every entry that failed to load; the reason is debug output.
pub fn report_errors(scan: &Scan, log: &dyn Log) {
    for (path, error) in &scan.errors {
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        log.warn(&format!("skipping '{name}': invalid package"));
        log.debug(&format!("{name}: {error}"));
    }
}

/// One line per package: name, description, and any non-default variants.
#[must_use]
pub fn render(packages: &[Package]) -> String {
    let width = packages.iter().map(|p| p.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for package in packages {
        let mut line = format!("{:<width$}", package.name);
        if let Some(description) = &package.description {
            let _ = write!(line, "  {description}");
        }
        let names = package.variants.names();
        if names.iter().any(|n| *n != DEFAULT_VARIANT) {
            let _ = write!(line, "  [{}]", names.join(", "));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
