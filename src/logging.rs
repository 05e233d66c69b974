//! Tracing subscriber setup for the command-line front end.
//!
//! Logs go to stderr so stdout carries only results.

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Level directive for the configured level raised by `-v` flags.
fn level_directive(config: &LoggingConfig, verbosity: u8) -> String {
    let level = match verbosity {
        0 => config.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    format!("mkt_devinfo={}", level)
}

/// Build the filter: `RUST_LOG` wins, otherwise the configured level.
pub fn env_filter(config: &LoggingConfig, verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(config, verbosity)))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(
    config: &LoggingConfig,
    verbosity: u8,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let layer = match config.format {
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
        LogFormat::Pretty => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_writer(std::io::stderr).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter(config, verbosity))
        .with(layer)
        .try_init()
}
