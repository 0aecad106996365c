//! Tracing subscriber setup driven by [`LoggingConfig`]

use std::io;

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

use av_shared::{LogFormat, LoggingConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log level: {0}")]
    InvalidLevel(#[from] ParseError),

    #[error("Logging already initialised: {0}")]
    AlreadyInitialised(#[from] TryInitError),
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level. Output goes to stderr so it never mixes with the
/// interactive prompt on stdout.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_filter(&config.level)?;

    tracing_subscriber::registry()
        .with(format_layer(config))
        .with(filter)
        .try_init()?;
    Ok(())
}

fn build_filter(level: &str) -> Result<EnvFilter, ParseError> {
    EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))
}

fn format_layer(config: &LoggingConfig) -> BoxedLayer {
    let base = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.colored)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    match (config.format, config.timestamp) {
        (LogFormat::Json, true) => base.json().boxed(),
        (LogFormat::Json, false) => base.json().without_time().boxed(),
        (LogFormat::Pretty, true) => base.pretty().boxed(),
        (LogFormat::Pretty, false) => base.pretty().without_time().boxed(),
        (LogFormat::Compact, true) => base.compact().boxed(),
        (LogFormat::Compact, false) => base.compact().without_time().boxed(),
    }
}
