use std::fmt::{self, Display};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        self as tracing_fmt, FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[1;31m",
        Level::WARN => "\x1b[1;33m",
        Level::INFO => "\x1b[1;32m",
        Level::DEBUG => "\x1b[1;34m",
        Level::TRACE => "\x1b[1;35m",
    }
}

/// `simples-api/src/routes/annex.rs` becomes `routes/annex.rs`.
fn short_path(file: &str) -> &str {
    file.rsplit_once("src/")
        .or_else(|| file.rsplit_once("src\\"))
        .map_or(file, |(_, rest)| rest)
}

fn paint(
    writer: &mut Writer<'_>,
    color: &str,
    text: impl Display,
) -> fmt::Result {
    if writer.has_ansi_escapes() {
        write!(writer, "{color}{text}{RESET}")
    } else {
        write!(writer, "{text}")
    }
}

/// One line per event: local time, level, source location, fields.
struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();

        paint(&mut writer, DIM, Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))?;
        write!(writer, " ")?;
        paint(
            &mut writer,
            level_color(meta.level()),
            format_args!("{:>5}", meta.level()),
        )?;
        write!(writer, " ")?;

        if let (Some(file), Some(line)) = (meta.file(), meta.line()) {
            paint(&mut writer, CYAN, format_args!("{}:{line}", short_path(file)))?;
            write!(writer, " ")?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))
}

/// `RUST_LOG` when set, otherwise the configured level.
fn make_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level '{level}'")),
    }
}

/// Initializes logging. Call once at startup.
///
/// Stdout is colored only when attached to a terminal. When `file` is given
/// events are also appended to it, uncolored; its directory must exist.
/// `level` is a bare level or any `EnvFilter` directive and yields to
/// `RUST_LOG`.
pub fn init_logging(
    level: &str,
    file: Option<&Path>,
) -> Result<()> {
    let filter = make_filter(level)?;

    let stdout_layer = tracing_fmt::layer()
        .event_format(LineFormat)
        .with_ansi(io::stdout().is_terminal());

    let file_layer = file.map(open_log_file).transpose()?.map(|log_file| {
        tracing_fmt::layer()
            .event_format(LineFormat)
            .with_ansi(false)
            .with_writer(Mutex::new(log_file))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("logging already initialized")
}
