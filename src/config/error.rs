//! Errors raised while reading `mkt-devinfo.toml` and its overrides.

use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has a field of the wrong type.
    #[error("config file is not valid: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A value parsed but cannot drive a probe, e.g. `negotiation.baud_rates = [0]`.
    /// `key` is the dotted `section.field` path.
    #[error("bad value for {key}: {message}")]
    ValidationError { key: String, message: String },

    /// A `MKT_DEVINFO_*` variable could not be parsed.
    #[error("bad override in ${var}: {message}")]
    EnvParseError { var: String, message: String },
}

impl ConfigError {
    /// Bad value at config key `key`.
    pub fn validation<K: Into<String>, M: Into<String>>(key: K, message: M) -> Self {
        Self::ValidationError {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Bad value in environment variable `var`.
    pub fn env_parse<V: Into<String>, M: Into<String>>(var: V, message: M) -> Self {
        Self::EnvParseError {
            var: var.into(),
            message: message.into(),
        }
    }
}

/// Result of loading or checking configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;
