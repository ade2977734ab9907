//! Variant selection.
use serde::Serialize;

use super::action::ActionSpec;
use super::package::{DEFAULT_VARIANT, Package, Variants};
use super::tree::flatten;
use crate::error::ResolveError;

/// The flat, ordered actions of one package variant.
///
/// Built fresh for each `show`/`install` and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSequence {
    /// Package name.
    pub package: String,
    /// Selected variant; `None` for packages without named variants.
    pub variant: Option<String>,
    /// Flattened actions in execution order.
    pub actions: Vec<ActionSpec>,
}

/// Select and flatten the action sequence for `requested`.
///
/// Packages without named variants always yield their implicit sequence.
/// Otherwise a requested name must match exactly; with no request the
/// variant named `default` is used.
///
/// # Errors
///
/// Returns [`ResolveError::VariantNotFound`] for an unknown requested name
/// and [`ResolveError::NoDefaultVariant`] when nothing is requested and no
/// `default` variant exists.
pub fn resolve(package: &Package, requested: Option<&str>) -> Result<ResolvedSequence, ResolveError> {
    let (variant, nodes) = match &package.variants {
        Variants::Implicit(nodes) => (None, nodes),
        Variants::Named(map) => {
            let name = requested
                .or(package.default_variant.as_deref())
                .ok_or_else(|| ResolveError::NoDefaultVariant {
                    package: package.name.clone(),
                    available: package.variants.names().join(", "),
                })?;
            let nodes = map.get(name).ok_or_else(|| {
                if requested.is_some() {
                    ResolveError::VariantNotFound {
                        package: package.name.clone(),
                        variant: name.to_string(),
                        available: package.variants.names().join(", "),
                    }
                } else {
                    ResolveError::NoDefaultVariant {
                        package: package.name.clone(),
                        available: package.variants.names().join(", "),
                    }
                }
            })?;
            (Some(name.to_string()), nodes)
        }
    };

    tracing::debug!(
        package = %package.name,
        variant = variant.as_deref().unwrap_or(DEFAULT_VARIANT),
        "resolved variant"
    );
    Ok(ResolvedSequence {
        package: package.name.clone(),
        variant,
        actions: flatten(nodes),
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::model::PathPair;

    fn package(yaml: &str) -> Package {
        let doc = serde_yaml::from_str(yaml).unwrap();
        Package::from_document("zsh", Path::new("/dots/zsh"), &doc).unwrap()
    }

    const DISTROS: &str = "\
common: &common
  - link: zshrc
variants:
  fedora:
    - *common
    - execute: dnf install zsh
  ubuntu:
    - *common
    - execute: apt install zsh
";

    #[test]
    fn no_request_without_default_fails() {
        let err = resolve(&package(DISTROS), None).unwrap_err();
        assert_eq!(
            err,
            ResolveError::NoDefaultVariant {
                package: "zsh".into(),
                available: "fedora, ubuntu".into(),
            }
        );
    }

    #[test]
    fn requested_variant_is_flattened() {
        let resolved = resolve(&package(DISTROS), Some("fedora")).unwrap();
        assert_eq!(resolved.variant.as_deref(), Some("fedora"));
        assert_eq!(
            resolved.actions,
            vec![
                ActionSpec::Link(vec![PathPair::dotted("zshrc")]),
                ActionSpec::Execute(vec!["dnf install zsh".into()]),
            ]
        );
    }

    #[test]
    fn unknown_variant_is_not_fuzzy_matched() {
        let err = resolve(&package(DISTROS), Some("Fedora")).unwrap_err();
        assert!(matches!(err, ResolveError::VariantNotFound { ref variant, .. } if variant == "Fedora"));
    }

    #[test]
    fn default_variant_is_used_without_request() {
        let resolved = resolve(&package("actions: [{link: a}]"), None).unwrap();
        assert_eq!(resolved.variant.as_deref(), Some(DEFAULT_VARIANT));
        assert_eq!(resolved.actions.len(), 1);
    }

    #[test]
    fn explicit_request_can_pick_default() {
        let pkg = package("variants:\n  default: [{link: a}]\n  extra: [{link: b}]\n");
        assert_eq!(resolve(&pkg, Some("default")).unwrap().actions.len(), 1);
        assert_eq!(resolve(&pkg, None).unwrap().variant.as_deref(), Some("default"));
    }

    #[test]
    fn implicit_package_ignores_request() {
        let pkg = Package::single_file("inputrc", Path::new("/dots"));
        let resolved = resolve(&pkg, Some("anything")).unwrap();
        assert!(resolved.variant.is_none());
        assert_eq!(
            resolved.actions,
            vec![ActionSpec::Link(vec![PathPair::dotted("inputrc")])]
        );
    }
}
