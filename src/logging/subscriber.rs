//! Console and log-file layers behind every [`Log`](super::Log) call.
//!
//! Both layers classify events the same way: stage headers carry
//! [`STAGE_TARGET`], everything else is keyed by level.
use std::fs;
use std::io::Write as _;
use std::sync::Mutex;

use super::utils::{format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

/// Target used for stage headers.
pub(super) const STAGE_TARGET: &str = "dotdot::stage";

/// How a line is rendered, on either layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Stage,
    Error,
    Warn,
    Info,
    Debug,
}

impl LineKind {
    fn of(metadata: &tracing::Metadata<'_>) -> Self {
        match *metadata.level() {
            tracing::Level::ERROR => Self::Error,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::INFO if metadata.target() == STAGE_TARGET => Self::Stage,
            tracing::Level::INFO => Self::Info,
            tracing::Level::DEBUG | tracing::Level::TRACE => Self::Debug,
        }
    }
}

/// The `message` field of an event; other fields are dropped.
#[derive(Default)]
struct Message(String);

impl Message {
    fn of(event: &tracing::Event<'_>) -> String {
        let mut visitor = Self::default();
        event.record(&mut visitor);
        visitor.0
    }
}

impl tracing::field::Visit for Message {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.0 = value.to_string();
        }
    }
}

/// Appends plain-text, timestamped lines to the command's log file.
///
/// The file is truncated at the start of each run, so it always holds the
/// most recent invocation of that command.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Start a fresh log for `command`, or `None` if the cache directory is
    /// not writable.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file_path(command)?;
        let header = format!(
            "# dotdot {} {command}, started {}\n",
            crate::version(),
            format_utc_datetime(),
        );
        fs::write(&path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(&path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let msg = strip_ansi(&Message::of(event));
        let tag = match LineKind::of(event.metadata()) {
            LineKind::Stage => "==> ",
            LineKind::Error => "    [error] ",
            LineKind::Warn => "    [warn] ",
            LineKind::Debug => "    [debug] ",
            LineKind::Info => "    ",
        };

        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "[{}] {tag}{msg}", format_utc_time()).ok();
        }
    }
}

/// Console rendering: coloured level tags, bold stage headers, and
/// indented, dimmed debug lines.
struct ConsoleFormat;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormat
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let msg = Message::of(event);
        match LineKind::of(event.metadata()) {
            LineKind::Error => writeln!(writer, "\x1b[31mERROR\x1b[0m {msg}"),
            LineKind::Warn => writeln!(writer, "\x1b[33mWARN\x1b[0m  {msg}"),
            LineKind::Stage => writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            LineKind::Info => writeln!(writer, "  {msg}"),
            LineKind::Debug => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Install the global subscriber for a run of `command`.
///
/// Warnings and errors go to stderr, the rest to stdout. Debug lines reach
/// the console only with `verbose` (or a `RUST_LOG` override), but always
/// reach `$XDG_CACHE_HOME/dotdot/<command>.log`.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        EnvFilter, Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let default_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let console_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let console = fmt::layer()
        .event_format(ConsoleFormat)
        .with_writer(
            std::io::stderr
                .with_max_level(tracing::Level::WARN)
                .and(std::io::stdout.with_min_level(tracing::Level::INFO)),
        )
        .with_filter(console_filter);
    let file = FileLayer::new(command).map(|layer| layer.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry().with(console).with(file).init();
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    #[test]
    fn file_layer_writes_header_and_events() {
        let (log, tmp, _guard) = super::super::isolated_logger();
        log.stage("vim");
        log.debug("linking vimrc");
        log.warn("target exists");

        let content = std::fs::read_to_string(tmp.path().join("dotdot/test.log")).unwrap();
        assert!(content.starts_with("# dotdot "), "missing header: {content}");
        assert!(content.contains("==> vim"));
        assert!(content.contains("[debug] linking vimrc"));
        assert!(content.contains("[warn] target exists"));
    }

    #[test]
    fn ansi_codes_are_kept_out_of_the_file() {
        let (log, tmp, _guard) = super::super::isolated_logger();
        log.info("\x1b[32mok\x1b[0m");

        let content = std::fs::read_to_string(tmp.path().join("dotdot/test.log")).unwrap();
        assert!(content.contains("]     ok\n"), "{content}");
        assert!(!content.contains('\x1b'));
    }
}
