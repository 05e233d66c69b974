//! Probe-level error taxonomy.
//!
//! Every failure of discovery, negotiation or query surfaces as a
//! [`ProbeError`]. None of them is fatal: the caller decides how to present it.

use crate::port::{PortError, PortIdentifier};
use thiserror::Error;

/// Errors returned by the probing core.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The port could not be opened with the requested settings.
    #[error("failed to open {port} at {baud_rate} baud: {source}")]
    PortOpenFailure {
        port: PortIdentifier,
        baud_rate: u32,
        #[source]
        source: PortError,
    },

    /// The command could not be written.
    #[error("failed to write to {port} at {baud_rate} baud: {source}")]
    WriteFailure {
        port: PortIdentifier,
        baud_rate: u32,
        #[source]
        source: PortError,
    },

    /// The bounded read timed out or failed.
    #[error("no response from {port} at {baud_rate} baud: {source}")]
    ReadTimeoutOrFailure {
        port: PortIdentifier,
        baud_rate: u32,
        #[source]
        source: PortError,
    },

    /// Every candidate baud rate was tried without a usable response.
    #[error("could not detect baud rate on {port} ({attempts} rates tried)")]
    NoResponsiveBaudRate { port: PortIdentifier, attempts: usize },

    /// Discovery produced no ports to work with.
    #[error("no serial ports available")]
    NoPortsAvailable,

    /// The host refused to enumerate its serial ports.
    #[error("failed to enumerate ports: {0}")]
    Enumeration(String),

    /// A baud rate of zero was supplied.
    #[error("invalid baud rate: {0}")]
    InvalidBaudRate(u32),

    /// A configured command has a malformed escape sequence.
    #[error("invalid command: {0}")]
    InvalidCommand(String),
}

/// Result type for probing operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

impl ProbeError {
    /// Whether the failure came from the read window elapsing or erroring.
    pub fn is_read_failure(&self) -> bool {
        matches!(self, Self::ReadTimeoutOrFailure { .. })
    }

    /// The port involved, when the failure is tied to one.
    pub fn port(&self) -> Option<&PortIdentifier> {
        match self {
            Self::PortOpenFailure { port, .. }
            | Self::WriteFailure { port, .. }
            | Self::ReadTimeoutOrFailure { port, .. }
            | Self::NoResponsiveBaudRate { port, .. } => Some(port),
            Self::NoPortsAvailable
            | Self::Enumeration(_)
            | Self::InvalidBaudRate(_)
            | Self::InvalidCommand(_) => None,
        }
    }
}
