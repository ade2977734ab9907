//! Possibly nested action lists and their flattening.
//!
//! Shared action blocks are spliced into variants by reference (YAML
//! aliases), so a variant's action list may contain whole lists as
//! elements. The model keeps that nesting as [`ActionNode::Group`] and the
//! resolver flattens it with [`flatten`].
use super::action::ActionSpec;

/// An element of an unflattened action list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionNode {
    /// A single action.
    Leaf(ActionSpec),
    /// A spliced list of nodes, expanded in place when flattened.
    Group(Vec<ActionNode>),
}

impl ActionNode {
    /// Wrap an already flat sequence as leaves.
    #[must_use]
    pub fn leaves(actions: impl IntoIterator<Item = ActionSpec>) -> Vec<Self> {
        actions.into_iter().map(Self::Leaf).collect()
    }
}

impl From<ActionSpec> for ActionNode {
    fn from(action: ActionSpec) -> Self {
        Self::Leaf(action)
    }
}

/// Expand `nodes` depth-first, left to right, into a flat action sequence.
///
/// The relative order of leaves is preserved and flattening an already
/// flat sequence returns it unchanged.
///
/// # Examples
///
/// ```
/// use dotdot_cli::model::{ActionNode, ActionSpec, flatten};
///
/// let a = ActionSpec::Execute(vec!["a".into()]);
/// let b = ActionSpec::Execute(vec!["b".into()]);
/// let c = ActionSpec::Execute(vec!["c".into()]);
/// let nested = vec![
///     ActionNode::Leaf(a.clone()),
///     ActionNode::Group(vec![ActionNode::Group(vec![ActionNode::Leaf(b.clone())])]),
///     ActionNode::Leaf(c.clone()),
/// ];
/// assert_eq!(flatten(&nested), vec![a, b, c]);
/// ```
#[must_use]
pub fn flatten(nodes: &[ActionNode]) -> Vec<ActionSpec> {
    let mut out = Vec::new();
    flatten_into(nodes, &mut out);
    out
}

fn flatten_into(nodes: &[ActionNode], out: &mut Vec<ActionSpec>) {
    for node in nodes {
        match node {
            ActionNode::Leaf(action) => out.push(action.clone()),
            ActionNode::Group(children) => flatten_into(children, out),
        }
    }
}
