//! Tracing setup: console layer on stderr plus an optional JSON-lines file.

use eyre::{Result, WrapErr, bail};
use mobility_config::Logging;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Install the global subscriber.
///
/// The returned guard flushes the file sink on drop; hold it until exit.
pub fn init_tracing(log_level: &str, json: bool, logging: &Logging) -> Result<Option<WorkerGuard>> {
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .wrap_err_with(|| format!("invalid log level '{log_level}'"))?;

    let console: Box<dyn Layer<Registry> + Send + Sync> = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    let (file_layer, guard) = match logging.file.as_deref() {
        Some(file) => {
            let level = logging.level.as_deref().unwrap_or("info");
            let file_filter = EnvFilter::try_new(level)
                .wrap_err_with(|| format!("invalid logging.level '{level}'"))?;
            let (writer, guard) = tracing_appender::non_blocking(rolling_appender(
                Path::new(file),
                logging.rotation.as_deref(),
            )?);
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(file_filter);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console.with_filter(console_filter))
        .with(file_layer)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(guard)
}

fn rolling_appender(
    path: &Path,
    rotation: Option<&str>,
) -> Result<tracing_appender::rolling::RollingFileAppender> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let Some(name) = path.file_name() else {
        bail!("logging.file has no file name: {}", path.display());
    };
    let appender = match rotation.unwrap_or("never") {
        "daily" => tracing_appender::rolling::daily(dir, name),
        "hourly" => tracing_appender::rolling::hourly(dir, name),
        _ => tracing_appender::rolling::never(dir, name),
    };
    Ok(appender)
}
