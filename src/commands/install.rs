//! Command: install packages.
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::Result;

use super::{CommandSetup, load_named};
use crate::cli::{GlobalOpts, InstallOpts};
use crate::engine::{self, ActionStatus, Context};
use crate::exec::SystemShell;
use crate::logging::{Logger, PackageStatus};
use crate::model::resolve;
use crate::vcs::GitVcs;

/// Run the install command.
///
/// Every requested package is attempted even when an earlier one fails.
///
/// # Errors
///
/// Returns an error if settings cannot be resolved, the shell cannot be
/// found, or any package failed.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<Logger>, cancelled: Arc<AtomicBool>) -> Result<()> {
    log.info(&format!("dotdot {}", crate::version()));
    let setup = CommandSetup::init(global, &**log)?;

    let ctx = Context::new(
        setup.settings.home.clone(),
        Arc::new(SystemShell::new()?),
        Arc::new(GitVcs),
        log.clone(),
    )
    .with_cancel_flag(cancelled);

    let incomplete = install_packages(&setup.settings.dots_path, &opts.packages, opts.variant.as_deref(), &ctx);

    log.print_summary();
    if incomplete > 0 {
        anyhow::bail!("{incomplete} package(s) did not install");
    }
    Ok(())
}

/// Load, resolve, and execute each of `names` in order, recording one
/// summary entry per package through the context's logger.
///
/// Returns the number of packages that did not install completely.
pub fn install_packages(dots: &Path, names: &[String], variant: Option<&str>, ctx: &Context) -> usize {
    let mut incomplete = 0;
    for name in names {
        let outcome = if ctx.is_cancelled() {
            Outcome {
                label: name.clone(),
                status: PackageStatus::Skipped,
                detail: "cancelled".to_string(),
            }
        } else {
            ctx.log.stage(name);
            install_one(dots, name, variant, ctx)
        };
        if outcome.status != PackageStatus::Ok {
            incomplete += 1;
        }
        ctx.log.record_package(&outcome.label, outcome.status, Some(&outcome.detail));
    }
    incomplete
}

#[derive(Debug)]
struct Outcome {
    /// Package name, with the selected variant if any.
    label: String,
    status: PackageStatus,
    detail: String,
}

fn install_one(dots: &Path, name: &str, variant: Option<&str>, ctx: &Context) -> Outcome {
    let failure = |error: anyhow::Error| {
        let detail = format!("{error:#}");
        ctx.log.error(&detail);
        Outcome {
            label: name.to_string(),
            status: PackageStatus::Failed,
            detail,
        }
    };

    let package = match load_named(dots, name) {
        Ok(package) => package,
        Err(e) => return failure(e),
    };
    let sequence = match resolve(&package, variant) {
        Ok(sequence) => sequence,
        Err(e) => return failure(e.into()),
    };

    let label = sequence
        .variant
        .as_ref()
        .map_or_else(|| name.to_string(), |v| format!("{name} ({v})"));
    let result = engine::run(&sequence, &package.root, ctx);

    let (status, detail) = match result.failure() {
        None => (
            PackageStatus::Ok,
            match result.records.len() {
                0 => "nothing to do".to_string(),
                1 => "1 action".to_string(),
                n => format!("{n} actions"),
            },
        ),
        Some(record) if record.status == ActionStatus::Skipped => (PackageStatus::Skipped, record.message.clone()),
        Some(record) => (PackageStatus::Failed, format!("{}: {}", record.kind, record.message)),
    };
    Outcome { label, status, detail }
}
