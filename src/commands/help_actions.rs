//! Command: describe the action kinds.
use std::fmt::Write as _;

use anyhow::Result;

use crate::model::ActionKind;

/// Print help for one action kind, or a summary of all of them.
///
/// # Errors
///
/// Returns an error if `kind` is not a known action kind.
#[allow(clippy::print_stdout)]
pub fn run(kind: Option<&str>) -> Result<()> {
    print!("{}", render(kind)?);
    Ok(())
}

/// Help text for `kind`, or one summary line per kind when `None`.
///
/// # Errors
///
/// Returns an error naming the known kinds if `kind` is unknown.
pub fn render(kind: Option<&str>) -> Result<String> {
    let Some(name) = kind else {
        let width = ActionKind::ALL.iter().map(|k| k.as_str().len()).max().unwrap_or(0);
        let mut out = String::new();
        for kind in ActionKind::ALL {
            let _ = writeln!(out, "{:<width$}  {}", kind.as_str(), kind.summary());
        }
        out.push_str("\nRun `dotdot help-actions <kind>` for details.\n");
        return Ok(out);
    };

    let kind: ActionKind = name.parse().map_err(|e: String| {
        let known: Vec<&str> = ActionKind::ALL.iter().map(|k| k.as_str()).collect();
        anyhow::anyhow!("{e}; known actions: {}", known.join(", "))
    })?;
    Ok(format!("{kind}\n\n{}\n", kind.help()))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_every_kind() {
        let out = render(None).unwrap();
        for kind in ActionKind::ALL {
            assert!(out.contains(kind.summary()), "missing {kind}");
        }
        assert!(out.starts_with("link "));
    }

    #[test]
    fn single_kind_shows_full_help() {
        let out = render(Some("Execute")).unwrap();
        assert!(out.starts_with("execute\n\n"));
        assert!(out.contains("single shell"));
    }

    #[test]
    fn unknown_kind_lists_known_ones() {
        let err = render(Some("symlink")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown action 'symlink'; known actions: link, copy, link_recursively, execute, git_clone"
        );
    }
}
