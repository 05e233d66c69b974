//! Device info reading: baud negotiation followed by a query.
//!
//! Everything the presentation layer used to read from shared widget state
//! (selected port, chosen baud rate) is passed in explicitly here.

use crate::error::{ProbeError, ProbeResult};
use crate::negotiation::BaudNegotiator;
use crate::port::{PortIdentifier, PortOpener};
use crate::query::{query_device_info, DEFAULT_INFO_COMMAND};
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// How the baud rate for the query is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaudSelection {
    /// Run the negotiator first.
    #[default]
    Auto,
    /// Use this rate and skip negotiation.
    Fixed(u32),
}

/// Where the baud rate of a reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BaudSource {
    Negotiated,
    Explicit,
}

/// Text returned by a device, with the settings that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfoReading {
    pub port: PortIdentifier,
    pub baud_rate: u32,
    pub baud_source: BaudSource,
    pub text: String,
}

/// Pick the port to work on: the requested one, or else the first discovered.
///
/// A requested port is used as given even when discovery did not list it.
pub fn select_port(
    discovered: &[PortIdentifier],
    requested: Option<&str>,
) -> ProbeResult<PortIdentifier> {
    match requested {
        Some(name) if !name.is_empty() => Ok(PortIdentifier::from(name)),
        _ => discovered
            .first()
            .cloned()
            .ok_or(ProbeError::NoPortsAvailable),
    }
}

/// Reads the info string of a device.
#[derive(Debug, Clone)]
pub struct DeviceInfoReader<O> {
    negotiator: BaudNegotiator<O>,
    command: Vec<u8>,
    timeout: Duration,
}

impl<O: PortOpener> DeviceInfoReader<O> {
    /// Reader sending `AT+DEVICEINFO\r` with the negotiator's read timeout.
    pub fn new(negotiator: BaudNegotiator<O>) -> Self {
        let timeout = negotiator.read_timeout();
        Self {
            negotiator,
            command: DEFAULT_INFO_COMMAND.to_vec(),
            timeout,
        }
    }

    pub fn with_command(mut self, command: impl Into<Vec<u8>>) -> Self {
        self.command = command.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn negotiator(&self) -> &BaudNegotiator<O> {
        &self.negotiator
    }

    /// Determine the baud rate for `port` and query the device once.
    pub fn read(&self, port: &PortIdentifier, baud: BaudSelection) -> ProbeResult<DeviceInfoReading> {
        let (baud_rate, baud_source) = match baud {
            BaudSelection::Fixed(0) => return Err(ProbeError::InvalidBaudRate(0)),
            BaudSelection::Fixed(rate) => (rate, BaudSource::Explicit),
            BaudSelection::Auto => (
                self.negotiator.detect_baud_rate(port)?,
                BaudSource::Negotiated,
            ),
        };

        let text = query_device_info(
            self.negotiator.opener(),
            port,
            baud_rate,
            &self.command,
            self.timeout,
        )?;
        info!("Read {} bytes of device info from {}", text.len(), port);

        Ok(DeviceInfoReading {
            port: port.clone(),
            baud_rate,
            baud_source,
            text,
        })
    }

    /// Read from the requested port, or the first discovered one.
    ///
    /// Fails with [`ProbeError::NoPortsAvailable`] without touching any port
    /// when nothing was discovered and nothing requested.
    pub fn read_selected(
        &self,
        discovered: &[PortIdentifier],
        requested: Option<&str>,
        baud: BaudSelection,
    ) -> ProbeResult<DeviceInfoReading> {
        let port = select_port(discovered, requested)?;
        self.read(&port, baud)
    }
}
