use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use clap::Parser;

use dotdot_cli::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose, args.command.log_name());
    let log = Arc::new(logging::Logger::new(args.command.log_name()));

    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        log.debug(&format!("cannot install interrupt handler: {e}"));
    }

    match args.command {
        cli::Command::List => commands::list::run(&args.global, &*log),
        cli::Command::Show(opts) => commands::show::run(&args.global, &opts, &*log),
        cli::Command::Install(opts) => commands::install::run(&args.global, &opts, &log, cancelled),
        cli::Command::HelpActions(opts) => commands::help_actions::run(opts.kind.as_deref()),
        cli::Command::Completions(opts) => {
            commands::completions::run(opts.shell);
            Ok(())
        }
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
