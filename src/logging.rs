//! Log setup: `<timestamp> - <target> - <LEVEL> - <message>` lines to stdout,
//! teed into a per-run file under the log directory when `save_logs` is on.

use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// One line per event, no spans, no ANSI codes.
pub struct LineFormat;

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
        write!(
            writer,
            "{} - {} - {} - ",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            meta.target(),
            meta.level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Log file for a run started at `started`, e.g. `logs/2024-03-01_18-04-59.log`
pub fn log_file_path(dir: &Path, started: chrono::DateTime<chrono::Local>) -> PathBuf {
    dir.join(format!("{}.log", started.format("%Y-%m-%d_%H-%M-%S")))
}

/// Install the global subscriber. Returns the log file path when one is written.
pub fn init(config: &Config) -> Result<Option<PathBuf>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (writer, log_file) = if config.save_logs() {
        let dir = &config.general.log_directory;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

        let path = log_file_path(dir, chrono::Local::now());
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;

        (BoxMakeWriter::new(io::stdout.and(Arc::new(file))), Some(path))
    } else {
        (BoxMakeWriter::new(io::stdout), None)
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .event_format(LineFormat)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    Ok(log_file)
}
