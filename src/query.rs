//! One-shot command/response exchange with a device.

use crate::error::{ProbeError, ProbeResult};
use crate::port::{PortIdentifier, PortOpener, SerialConfig};
use crate::probe::{run_probe, RESPONSE_BUFFER_SIZE};
use std::time::Duration;
use tracing::debug;

/// Command that asks an MKT device for its identification string.
pub const DEFAULT_INFO_COMMAND: &[u8] = b"AT+DEVICEINFO\r";

/// Send `command` verbatim on `port` at `baud_rate` and return whatever the
/// device answered within `timeout`, decoded as text.
///
/// The response is not parsed or validated; a read that completes with zero
/// bytes yields an empty string. Invalid UTF-8 is replaced, not rejected.
///
/// # Errors
/// `PortOpenFailure`, `WriteFailure` or `ReadTimeoutOrFailure`. Nothing is
/// retried.
pub fn query_device_info<O: PortOpener + ?Sized>(
    opener: &O,
    port: &PortIdentifier,
    baud_rate: u32,
    command: &[u8],
    timeout: Duration,
) -> ProbeResult<String> {
    let config = SerialConfig::new(port.clone(), baud_rate, timeout)
        .map_err(|_| ProbeError::InvalidBaudRate(baud_rate))?;

    debug!("Querying {} at {} baud ({} byte command)", port, baud_rate, command.len());
    let response = run_probe(opener, &config, command, RESPONSE_BUFFER_SIZE).into_result(&config)?;
    debug!("{} answered with {} bytes", port, response.len());

    Ok(String::from_utf8_lossy(&response).into_owned())
}
