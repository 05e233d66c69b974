//! Core traits for serial port abstraction.
//!
//! The probing logic only ever sees a [`PortOpener`] and the
//! [`SerialPortAdapter`] handles it hands out, so real hardware and the
//! scripted mock are interchangeable.

use super::error::PortError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default read timeout for a single probe or query (two seconds).
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Platform-level name of a serial endpoint (`COM3`, `/dev/ttyUSB0`, ...).
///
/// Nothing guarantees the endpoint still exists by the time it is used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortIdentifier(String);

impl PortIdentifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PortIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PortIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PortIdentifier {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for PortIdentifier {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<&str> for PortIdentifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Parameters for a single open of a serial port.
///
/// Built fresh for every attempt and never changed afterwards; framing is
/// always 8N1 without flow control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    port: PortIdentifier,
    baud_rate: u32,
    read_timeout: Duration,
}

impl SerialConfig {
    /// Create a configuration, rejecting a zero baud rate.
    pub fn new(
        port: impl Into<PortIdentifier>,
        baud_rate: u32,
        read_timeout: Duration,
    ) -> Result<Self, PortError> {
        if baud_rate == 0 {
            return Err(PortError::config("baud rate must be positive"));
        }
        Ok(Self {
            port: port.into(),
            baud_rate,
            read_timeout,
        })
    }

    pub fn port(&self) -> &PortIdentifier {
        &self.port
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }
}

/// An open serial port handle.
///
/// Dropping the handle closes the port. [`close`](SerialPortAdapter::close)
/// makes the release explicit at the end of a probe.
pub trait SerialPortAdapter: Send + fmt::Debug {
    /// Write bytes to the serial port.
    ///
    /// Returns the number of bytes actually written.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError>;

    /// Perform one bounded read into the provided buffer.
    ///
    /// Returns the number of bytes actually read, which may be zero.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Get the name/path of this serial port.
    fn name(&self) -> &str;

    /// Release the handle.
    fn close(self: Box<Self>) {}
}

/// Capability to open serial ports.
pub trait PortOpener {
    /// Open the port described by `config`.
    fn open(&self, config: &SerialConfig) -> Result<Box<dyn SerialPortAdapter>, PortError>;
}

impl<T: PortOpener + ?Sized> PortOpener for &T {
    fn open(&self, config: &SerialConfig) -> Result<Box<dyn SerialPortAdapter>, PortError> {
        (**self).open(config)
    }
}

impl<T: PortOpener + ?Sized> PortOpener for Box<T> {
    fn open(&self, config: &SerialConfig) -> Result<Box<dyn SerialPortAdapter>, PortError> {
        (**self).open(config)
    }
}
