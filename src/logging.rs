//! Tracing subscriber setup for the command-line tools

use std::fs::OpenOptions;
use std::sync::Arc;

use tracing::Subscriber;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{Result, SchemaError};

type BoxedSubscriber = Box<dyn Subscriber + Send + Sync>;

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
///
/// Logs go to stderr, and additionally to `config.file` when set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let subscriber = build_subscriber(config)?;

    // A subscriber installed by the host application wins
    if let Err(e) = subscriber.try_init() {
        tracing::debug!("Logging already initialized: {}", e);
    }
    Ok(())
}

/// The filter `init_logging` would install
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| SchemaError::InvalidValue {
            path: "logging.level".to_string(),
            expected: "a tracing filter directive".to_string(),
            found: e.to_string(),
        })
}

fn build_subscriber(config: &LoggingConfig) -> Result<BoxedSubscriber> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(config)?);

    let subscriber: BoxedSubscriber = match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let writer = std::io::stderr.and(Arc::new(file));
            match config.format {
                LogFormat::Pretty => {
                    Box::new(builder.pretty().with_writer(writer).with_ansi(false).finish())
                }
                LogFormat::Compact => {
                    Box::new(builder.compact().with_writer(writer).with_ansi(false).finish())
                }
            }
        }
        None => match config.format {
            LogFormat::Pretty => Box::new(builder.pretty().with_writer(std::io::stderr).finish()),
            LogFormat::Compact => Box::new(builder.compact().with_writer(std::io::stderr).finish()),
        },
    };
    Ok(subscriber)
}
