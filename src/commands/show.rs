//! Command: show a package and the actions a variant resolves to.
use std::fmt::Write as _;

use anyhow::Result;

use super::{CommandSetup, load_named};
use crate::cli::{GlobalOpts, ShowOpts};
use crate::logging::Log;
use crate::model::{Package, ResolvedSequence, resolve};

/// Run the show command.
///
/// # Errors
///
/// Returns an error if the package cannot be loaded or the variant cannot
/// be resolved.
#[allow(clippy::print_stdout)]
pub fn run(global: &GlobalOpts, opts: &ShowOpts, log: &dyn Log) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let package = load_named(&setup.settings.dots_path, &opts.package)?;
    let sequence = resolve(&package, opts.variant.as_deref())?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&sequence)?);
    } else {
        print!("{}", render(&package, &sequence));
    }
    Ok(())
}

/// Human-readable description of `package` with the selected variant
/// marked `*` and its actions numbered in execution order.
#[must_use]
pub fn render(package: &Package, sequence: &ResolvedSequence) -> String {
    let mut out = package.name.clone();
    if let Some(description) = &package.description {
        let _ = write!(out, ": {description}");
    }
    out.push('\n');

    let names = package.variants.names();
    if names.is_empty() {
        out.push_str("variants: none\n");
    } else {
        let marked: Vec<String> = names
            .iter()
            .map(|name| {
                if sequence.variant.as_deref() == Some(*name) {
                    format!("*{name}")
                } else {
                    (*name).to_string()
                }
            })
            .collect();
        let _ = writeln!(out, "variants: {}", marked.join(", "));
    }

    if sequence.actions.is_empty() {
        out.push_str("actions: none\n");
    } else {
        out.push_str("actions:\n");
        for (i, action) in sequence.actions.iter().enumerate() {
            let _ = writeln!(out, "  {}. {action}", i + 1);
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::path::Path;

    use super::*;

    fn package(yaml: &str) -> Package {
        let doc: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        Package::from_document("zsh", Path::new("/dots/zsh"), &doc).unwrap()
    }

    #[test]
    fn marks_selected_variant() {
        let pkg = package(
            "description: Z shell\n\
             variants:\n\
             \x20 fedora:\n\
             \x20   - execute: sudo dnf install -y zsh\n\
             \x20   - link: zshrc\n\
             \x20 ubuntu:\n\
             \x20   - link: zshrc\n",
        );
        let seq = resolve(&pkg, Some("fedora")).unwrap();
        insta::assert_snapshot!(render(&pkg, &seq), @r"
        zsh: Z shell
        variants: *fedora, ubuntu
        actions:
          1. execute: sudo dnf install -y zsh
          2. link: zshrc -> .zshrc
        ");
    }

    #[test]
    fn implicit_package_has_no_variants() {
        let pkg = Package::single_file("bashrc", Path::new("/dots"));
        let seq = resolve(&pkg, None).unwrap();
        insta::assert_snapshot!(render(&pkg, &seq), @r"
        bashrc
        variants: none
        actions:
          1. link: bashrc -> .bashrc
        ");
    }

    #[test]
    fn empty_default_variant() {
        let pkg = package("description: placeholder\n");
        let seq = resolve(&pkg, None).unwrap();
        insta::assert_snapshot!(render(&pkg, &seq), @r"
        zsh: placeholder
        variants: *default
        actions: none
        ");
    }
}
