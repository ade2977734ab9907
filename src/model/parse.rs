//! Interpretation of a parsed spec document's action lists.
//!
//! The YAML loader performs no validation; every structural rule on action
//! lists lives here. Parsing is strict: the first malformed entry fails the
//! whole package with a [`SpecError`] naming that entry.
use std::path::Path;

use serde_yaml::{Mapping, Value};

use super::action::{ActionKind, ActionSpec, GitCloneSpec, PathPair};
use super::tree::ActionNode;
use crate::error::SpecError;

/// Name of the spec document inside a package directory.
pub const SPEC_FILE_NAME: &str = "spec.yaml";

/// Source path that expands to every top-level entry of the package.
const WILDCARD: &str = "*";

/// Shared inputs for parsing one package's action lists.
#[derive(Debug, Clone, Copy)]
pub struct ParseCtx<'a> {
    /// Package name, used in error messages.
    pub package: &'a str,
    /// Package root, listed when expanding `from: "*"`.
    pub root: &'a Path,
}

impl ParseCtx<'_> {
    fn invalid_entry(&self, kind: ActionKind, entry: &Value, reason: &str) -> SpecError {
        SpecError::InvalidEntry {
            package: self.package.to_string(),
            kind,
            entry: render(entry),
            reason: reason.to_string(),
        }
    }
}

/// Parse an action list value (a sequence, or null for an empty list).
///
/// Sequence elements that are themselves sequences become
/// [`ActionNode::Group`]s so that spliced shared blocks keep their shape
/// until the resolver flattens them.
///
/// # Errors
///
/// Returns a [`SpecError`] for the first malformed element.
pub fn parse_action_list(ctx: &ParseCtx<'_>, value: &Value) -> Result<Vec<ActionNode>, SpecError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => {
            let mut nodes = Vec::with_capacity(items.len());
            for item in items {
                parse_node(ctx, item, &mut nodes)?;
            }
            Ok(nodes)
        }
        other => Err(SpecError::InvalidDocument {
            package: ctx.package.to_string(),
            reason: format!("action list must be a sequence, found {}", render(other)),
        }),
    }
}

fn parse_node(ctx: &ParseCtx<'_>, value: &Value, out: &mut Vec<ActionNode>) -> Result<(), SpecError> {
    match value {
        Value::Sequence(_) => out.push(ActionNode::Group(parse_action_list(ctx, value)?)),
        Value::Mapping(map) => {
            for (key, entries) in map {
                let Some(key) = key.as_str() else {
                    return Err(SpecError::InvalidNode {
                        package: ctx.package.to_string(),
                        entry: render(value),
                    });
                };
                let kind: ActionKind = key.parse().map_err(|_| SpecError::UnknownAction {
                    package: ctx.package.to_string(),
                    action: key.to_string(),
                })?;
                out.extend(parse_action(ctx, kind, entries)?.into_iter().map(ActionNode::Leaf));
            }
        }
        Value::String(_) => {
            let pairs = parse_pairs(ctx, ActionKind::Link, value)?;
            out.push(ActionNode::Leaf(ActionSpec::Link(pairs)));
        }
        Value::Tagged(tagged) => parse_node(ctx, &tagged.value, out)?,
        other => {
            return Err(SpecError::InvalidNode {
                package: ctx.package.to_string(),
                entry: render(other),
            });
        }
    }
    Ok(())
}

/// Parse the entries of one action key into normalized actions.
///
/// Link-like kinds and `execute` produce one action holding every entry;
/// `git_clone` produces one action per repository.
///
/// # Errors
///
/// Returns a [`SpecError::InvalidEntry`] for the first malformed entry.
pub fn parse_action(
    ctx: &ParseCtx<'_>,
    kind: ActionKind,
    entries: &Value,
) -> Result<Vec<ActionSpec>, SpecError> {
    let action = match kind {
        ActionKind::Link => ActionSpec::Link(parse_pairs(ctx, kind, entries)?),
        ActionKind::Copy => ActionSpec::Copy(parse_pairs(ctx, kind, entries)?),
        ActionKind::LinkRecursively => ActionSpec::LinkRecursively(parse_pairs(ctx, kind, entries)?),
        ActionKind::Execute => ActionSpec::Execute(parse_commands(ctx, entries)?),
        ActionKind::GitClone => {
            return lift(entries)
                .into_iter()
                .map(|entry| parse_git_clone(ctx, entry).map(ActionSpec::GitClone))
                .collect();
        }
    };
    Ok(vec![action])
}

/// Normalize a single entry or an entry list (nested lists included) into a
/// flat list of entry values.
fn lift(entries: &Value) -> Vec<&Value> {
    fn walk<'v>(value: &'v Value, out: &mut Vec<&'v Value>) {
        match value {
            Value::Sequence(items) => items.iter().for_each(|item| walk(item, out)),
            other => out.push(other),
        }
    }
    let mut out = Vec::new();
    walk(entries, &mut out);
    out
}

fn parse_pairs(ctx: &ParseCtx<'_>, kind: ActionKind, entries: &Value) -> Result<Vec<PathPair>, SpecError> {
    let mut pairs = Vec::new();
    for entry in lift(entries) {
        let (from, to) = match entry {
            Value::String(from) => (from.clone(), None),
            Value::Mapping(map) => {
                let from = string_field(ctx, kind, entry, map, &["from"])?
                    .ok_or_else(|| ctx.invalid_entry(kind, entry, "missing field 'from'"))?;
                let to = string_field(ctx, kind, entry, map, &["to"])?;
                (from, to)
            }
            _ => {
                return Err(ctx.invalid_entry(kind, entry, "expected a path or a {from, to} mapping"));
            }
        };
        if from.trim().is_empty() {
            return Err(ctx.invalid_entry(kind, entry, "'from' is empty"));
        }
        if to.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ctx.invalid_entry(kind, entry, "'to' is empty"));
        }

        if from == WILDCARD {
            pairs.extend(expand_wildcard(ctx, to.as_deref())?);
        } else {
            pairs.push(to.map_or_else(|| PathPair::dotted(from.clone()), |to| PathPair::new(from.clone(), to)));
        }
    }
    Ok(pairs)
}

/// Expand `from: "*"` into one pair per top-level package entry, sorted by
/// name and excluding the spec document.
fn expand_wildcard(ctx: &ParseCtx<'_>, to: Option<&str>) -> Result<Vec<PathPair>, SpecError> {
    let names = list_entries(ctx.root)?;
    let prefix = to.filter(|t| *t != ".*");
    Ok(names
        .into_iter()
        .filter(|name| name != SPEC_FILE_NAME)
        .map(|name| match prefix {
            Some(dir) => {
                let target = format!("{}/{name}", dir.trim_end_matches('/'));
                PathPair::new(name, target)
            }
            None => PathPair::dotted(name),
        })
        .collect())
}

/// Sorted names of the immediate children of `dir`.
///
/// # Errors
///
/// Returns [`SpecError::Read`] if the directory cannot be listed.
pub fn list_entries(dir: &Path) -> Result<Vec<String>, SpecError> {
    let read_err = |source| SpecError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

fn parse_commands(ctx: &ParseCtx<'_>, entries: &Value) -> Result<Vec<String>, SpecError> {
    let commands = lift(entries)
        .into_iter()
        .map(|entry| match entry {
            Value::String(cmd) if !cmd.trim().is_empty() => Ok(cmd.clone()),
            Value::String(_) => Err(ctx.invalid_entry(ActionKind::Execute, entry, "command is empty")),
            _ => Err(ctx.invalid_entry(ActionKind::Execute, entry, "expected a command string")),
        })
        .collect::<Result<Vec<_>, _>>()?;
    if commands.is_empty() {
        return Err(ctx.invalid_entry(ActionKind::Execute, entries, "no commands"));
    }
    Ok(commands)
}

fn parse_git_clone(ctx: &ParseCtx<'_>, entry: &Value) -> Result<GitCloneSpec, SpecError> {
    let kind = ActionKind::GitClone;
    let Value::Mapping(map) = entry else {
        return Err(ctx.invalid_entry(kind, entry, "expected a mapping with 'from' and 'to'"));
    };
    let from = string_field(ctx, kind, entry, map, &["from", "url"])?
        .ok_or_else(|| ctx.invalid_entry(kind, entry, "missing field 'from'"))?;
    let to = string_field(ctx, kind, entry, map, &["to"])?
        .ok_or_else(|| ctx.invalid_entry(kind, entry, "missing field 'to'"))?;
    let branch = string_field(ctx, kind, entry, map, &["branch"])?;
    if from.trim().is_empty() || to.trim().is_empty() {
        return Err(ctx.invalid_entry(kind, entry, "'from' and 'to' must not be empty"));
    }
    Ok(GitCloneSpec { from, to, branch })
}

/// Read the first present key of `names` as a string.
fn string_field(
    ctx: &ParseCtx<'_>,
    kind: ActionKind,
    entry: &Value,
    map: &Mapping,
    names: &[&str],
) -> Result<Option<String>, SpecError> {
    let Some(value) = names.iter().find_map(|name| map.get(*name)) else {
        return Ok(None);
    };
    match value {
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Null => Ok(None),
        _ => Err(ctx.invalid_entry(kind, entry, &format!("field '{}' must be a string", names.join("' or '")))),
    }
}

/// Compact single-line rendering of a value for error messages.
pub(crate) fn render(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
}
