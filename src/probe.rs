//! A single bounded open → write → read exchange.
//!
//! Both the baud negotiator and the device query go through [`run_probe`].
//! The handle is released before `run_probe` returns, whatever the outcome;
//! retrying means calling it again with a new [`SerialConfig`].

use crate::error::{ProbeError, ProbeResult};
use crate::port::{PortError, PortOpener, SerialConfig};
use tracing::trace;

/// Size of the buffer handed to the single read of a probe.
pub const RESPONSE_BUFFER_SIZE: usize = 128;

/// Stages of one probe, used in trace output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStage {
    Opening,
    Writing,
    Reading,
    Closed,
}

/// Tagged result of one probe attempt.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// The read completed; holds exactly the bytes read (possibly none).
    Success(Vec<u8>),
    OpenFailed(PortError),
    WriteFailed(PortError),
    ReadTimedOutOrFailed(PortError),
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Convert into a typed result, attributing failures to `config`.
    pub fn into_result(self, config: &SerialConfig) -> ProbeResult<Vec<u8>> {
        let port = config.port().clone();
        let baud_rate = config.baud_rate();
        match self {
            Self::Success(bytes) => Ok(bytes),
            Self::OpenFailed(source) => Err(ProbeError::PortOpenFailure {
                port,
                baud_rate,
                source,
            }),
            Self::WriteFailed(source) => Err(ProbeError::WriteFailure {
                port,
                baud_rate,
                source,
            }),
            Self::ReadTimedOutOrFailed(source) => Err(ProbeError::ReadTimeoutOrFailure {
                port,
                baud_rate,
                source,
            }),
        }
    }
}

/// Open the port, write `command` verbatim, and read once into a buffer of
/// `buffer_size` bytes.
pub fn run_probe<O: PortOpener + ?Sized>(
    opener: &O,
    config: &SerialConfig,
    command: &[u8],
    buffer_size: usize,
) -> ProbeOutcome {
    trace!(port = %config.port(), baud = config.baud_rate(), stage = ?ProbeStage::Opening);
    let mut handle = match opener.open(config) {
        Ok(handle) => handle,
        Err(e) => return ProbeOutcome::OpenFailed(e),
    };

    trace!(port = %config.port(), stage = ?ProbeStage::Writing, len = command.len());
    let outcome = match handle.write_bytes(command) {
        Err(e) => ProbeOutcome::WriteFailed(e),
        Ok(n) if n < command.len() => ProbeOutcome::WriteFailed(PortError::Io(
            std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                format!("wrote {} of {} bytes", n, command.len()),
            ),
        )),
        Ok(_) => {
            trace!(port = %config.port(), stage = ?ProbeStage::Reading);
            let mut buffer = vec![0u8; buffer_size];
            match handle.read_bytes(&mut buffer) {
                Ok(n) => {
                    buffer.truncate(n);
                    ProbeOutcome::Success(buffer)
                }
                Err(e) => ProbeOutcome::ReadTimedOutOrFailed(e),
            }
        }
    };

    handle.close();
    trace!(port = %config.port(), stage = ?ProbeStage::Closed, success = outcome.is_success());
    outcome
}
