//! Packages and their variant sets.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use super::action::{ActionSpec, PathPair};
use super::parse::{ParseCtx, SPEC_FILE_NAME, list_entries, parse_action_list, render};
use super::tree::ActionNode;
use crate::error::SpecError;

/// Name of the variant synthesized from a flat `actions` list, and the one
/// picked when no variant is requested.
pub const DEFAULT_VARIANT: &str = "default";

/// The action sequences a package offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Variants {
    /// A package without named variants (no spec document, or a single
    /// file). Its one sequence is used whatever variant is requested.
    Implicit(Vec<ActionNode>),
    /// Named action sequences, possibly nested.
    Named(BTreeMap<String, Vec<ActionNode>>),
}

impl Variants {
    /// Variant names in sorted order; empty for [`Variants::Implicit`].
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Implicit(_) => Vec::new(),
            Self::Named(map) => map.keys().map(String::as_str).collect(),
        }
    }
}

/// A named, self-contained directory of dotfiles and the actions that
/// install them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Unique name, derived from the directory (or file) name.
    pub name: String,
    /// Directory that `from` paths are relative to.
    pub root: PathBuf,
    /// Free-text description from the spec document.
    pub description: Option<String>,
    /// Available action sequences.
    pub variants: Variants,
    /// Variant used when none is requested, if the package has one.
    pub default_variant: Option<String>,
}

impl Package {
    /// Build a package from a parsed spec document.
    ///
    /// A `variants` mapping wins over a flat `actions` list when it is
    /// non-empty. A flat list becomes a single variant named
    /// [`DEFAULT_VARIANT`]. A null document is an empty default variant.
    ///
    /// # Errors
    ///
    /// Returns a [`SpecError`] if the document's shape is wrong or any
    /// action entry is malformed.
    pub fn from_document(name: &str, root: &Path, doc: &Value) -> Result<Self, SpecError> {
        let invalid = |reason: String| SpecError::InvalidDocument {
            package: name.to_string(),
            reason,
        };
        let ctx = ParseCtx { package: name, root };

        let (description, variants_value, actions_value) = match doc {
            Value::Null => (None, None, None),
            Value::Mapping(map) => {
                let description = match map.get("description") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(other) => return Err(invalid(format!("description must be a string, found {}", render(other)))),
                };
                (description, map.get("variants"), map.get("actions"))
            }
            other => return Err(invalid(format!("spec document must be a mapping, found {}", render(other)))),
        };

        let mut named = BTreeMap::new();
        match variants_value {
            None | Some(Value::Null) => {}
            Some(Value::Mapping(map)) => {
                for (key, value) in map {
                    let Some(variant) = key.as_str() else {
                        return Err(invalid(format!("variant name must be a string, found {}", render(key))));
                    };
                    named.insert(variant.to_string(), parse_action_list(&ctx, value)?);
                }
            }
            Some(other) => return Err(invalid(format!("variants must be a mapping, found {}", render(other)))),
        }
        if named.is_empty() {
            let actions = actions_value.map_or_else(|| Ok(Vec::new()), |v| parse_action_list(&ctx, v))?;
            named.insert(DEFAULT_VARIANT.to_string(), actions);
        }

        let default_variant = named.contains_key(DEFAULT_VARIANT).then(|| DEFAULT_VARIANT.to_string());
        Ok(Self {
            name: name.to_string(),
            root: root.to_path_buf(),
            description,
            variants: Variants::Named(named),
            default_variant,
        })
    }

    /// Build the shorthand package for a directory without a spec
    /// document: one link covering every top-level entry.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Read`] if the directory cannot be listed.
    pub fn implicit(name: &str, root: &Path) -> Result<Self, SpecError> {
        let pairs: Vec<PathPair> = list_entries(root)?
            .into_iter()
            .filter(|entry| entry != SPEC_FILE_NAME)
            .map(PathPair::dotted)
            .collect();
        let nodes = if pairs.is_empty() {
            Vec::new()
        } else {
            ActionNode::leaves([ActionSpec::Link(pairs)])
        };
        Ok(Self {
            name: name.to_string(),
            root: root.to_path_buf(),
            description: None,
            variants: Variants::Implicit(nodes),
            default_variant: None,
        })
    }

    /// Build the package for a single file: it links itself to `~/.<name>`.
    #[must_use]
    pub fn single_file(name: &str, root: &Path) -> Self {
        Self {
            name: name.to_string(),
            root: root.to_path_buf(),
            description: None,
            variants: Variants::Implicit(ActionNode::leaves([ActionSpec::Link(vec![PathPair::dotted(name)])])),
            default_variant: None,
        }
    }
}
