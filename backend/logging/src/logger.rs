//! Structured Logger
//!
//! Wraps `tracing` to provide console output, optional daily-rolling JSON
//! files, and environment-based level control.

use std::path::Path;

use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global logger.
///
/// `RUST_LOG` wins over `level`. With a `log_dir`, NDJSON is also written to
/// `geolens.log.YYYY-MM-DD` inside it; a directory that cannot be created is
/// an error and no subscriber is installed.
pub fn init_logger(log_dir: Option<&Path>, level: &str) -> Result<(), InitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_ansi(true);

    let file_layer = match log_dir {
        Some(dir) => {
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("geolens.log")
                .build(dir)?;
            Some(fmt::layer().json().with_writer(file_appender).with_ansi(false))
        }
        None => None,
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
    Ok(())
}
