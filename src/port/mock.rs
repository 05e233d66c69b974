//! Scripted serial ports for testing.
//!
//! A [`MockPortOpener`] simulates a set of devices, each deciding per baud
//! rate whether it opens, whether writes succeed and what a read returns.
//! Every open attempt, write and close is recorded in a shared ledger so
//! tests can assert on ordering and handle hygiene.

use super::error::PortError;
use super::traits::{PortIdentifier, PortOpener, SerialConfig, SerialPortAdapter};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// What a simulated device answers after a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Return these bytes (truncated to the caller's buffer).
    Data(Vec<u8>),
    /// Return zero bytes without an error.
    Empty,
    /// Fail the read with a timeout.
    Timeout,
    /// Fail the read with an I/O error.
    Error,
}

impl MockReply {
    pub fn data(bytes: &[u8]) -> Self {
        Self::Data(bytes.to_vec())
    }
}

/// Behaviour of one simulated device.
#[derive(Debug, Clone)]
pub struct MockDevice {
    name: PortIdentifier,
    /// Baud rates at which open succeeds; `None` means every rate.
    open_bauds: Option<Vec<u32>>,
    /// Reply per baud rate, falling back to `default_reply`.
    replies: HashMap<u32, MockReply>,
    default_reply: MockReply,
    write_fails_at: Vec<u32>,
    /// Per baud rate, the most bytes a single write accepts.
    write_limits: HashMap<u32, usize>,
    busy: bool,
}

impl MockDevice {
    /// A device that opens at any baud rate and never answers.
    pub fn new(name: impl Into<PortIdentifier>) -> Self {
        Self {
            name: name.into(),
            open_bauds: None,
            replies: HashMap::new(),
            default_reply: MockReply::Timeout,
            write_fails_at: Vec::new(),
            write_limits: HashMap::new(),
            busy: false,
        }
    }

    /// Only allow opening at the given baud rates.
    pub fn opens_only_at(mut self, bauds: &[u32]) -> Self {
        self.open_bauds = Some(bauds.to_vec());
        self
    }

    /// Answer with `reply` at `baud`.
    pub fn reply_at(mut self, baud: u32, reply: MockReply) -> Self {
        self.replies.insert(baud, reply);
        self
    }

    /// Answer with `reply` at every baud rate without a specific reply.
    pub fn reply_by_default(mut self, reply: MockReply) -> Self {
        self.default_reply = reply;
        self
    }

    /// Fail writes at `baud`.
    pub fn write_fails_at(mut self, baud: u32) -> Self {
        self.write_fails_at.push(baud);
        self
    }

    /// Accept at most `max_bytes` of each write at `baud` (a short write).
    pub fn write_accepts_at(mut self, baud: u32, max_bytes: usize) -> Self {
        self.write_limits.insert(baud, max_bytes);
        self
    }

    /// Simulate a port held by another process: every open fails.
    pub fn busy(mut self) -> Self {
        self.busy = true;
        self
    }

    pub fn name(&self) -> &PortIdentifier {
        &self.name
    }

    fn opens_at(&self, baud: u32) -> bool {
        self.open_bauds
            .as_ref()
            .map_or(true, |bauds| bauds.contains(&baud))
    }

    fn reply_for(&self, baud: u32) -> MockReply {
        self.replies
            .get(&baud)
            .cloned()
            .unwrap_or_else(|| self.default_reply.clone())
    }
}

/// One call to [`PortOpener::open`] as seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAttempt {
    pub port: PortIdentifier,
    pub baud_rate: u32,
    pub opened: bool,
}

#[derive(Debug, Default)]
struct Ledger {
    attempts: Vec<OpenAttempt>,
    writes: Vec<(PortIdentifier, u32, Vec<u8>)>,
    closes: usize,
}

/// Port opener backed by simulated devices.
///
/// Clones share the same devices and ledger.
#[derive(Debug, Clone, Default)]
pub struct MockPortOpener {
    devices: Arc<HashMap<PortIdentifier, MockDevice>>,
    ledger: Arc<Mutex<Ledger>>,
}

impl MockPortOpener {
    /// An opener with no devices: every open fails with `NotFound`.
    pub fn new() -> Self {
        Self::default()
    }

    /// An opener simulating the given devices.
    pub fn with_devices(devices: impl IntoIterator<Item = MockDevice>) -> Self {
        let devices = devices
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect();
        Self {
            devices: Arc::new(devices),
            ledger: Arc::default(),
        }
    }

    /// Every open attempt so far, in call order.
    pub fn attempts(&self) -> Vec<OpenAttempt> {
        self.ledger.lock().attempts.clone()
    }

    /// Baud rates attempted on `port`, in call order.
    pub fn attempted_bauds(&self, port: &str) -> Vec<u32> {
        self.ledger
            .lock()
            .attempts
            .iter()
            .filter(|a| a.port == port)
            .map(|a| a.baud_rate)
            .collect()
    }

    /// Number of opens that succeeded.
    pub fn open_count(&self) -> usize {
        self.ledger.lock().attempts.iter().filter(|a| a.opened).count()
    }

    /// Number of handles released so far.
    pub fn close_count(&self) -> usize {
        self.ledger.lock().closes
    }

    /// Every byte string written, with its port and baud rate.
    pub fn writes(&self) -> Vec<(PortIdentifier, u32, Vec<u8>)> {
        self.ledger.lock().writes.clone()
    }
}

impl PortOpener for MockPortOpener {
    fn open(&self, config: &SerialConfig) -> Result<Box<dyn SerialPortAdapter>, PortError> {
        let port = config.port();
        let baud = config.baud_rate();

        let result = match self.devices.get(port) {
            None => Err(PortError::not_found(port.as_str())),
            Some(device) if device.busy => Err(PortError::busy(port.as_str())),
            Some(device) if !device.opens_at(baud) => Err(PortError::config(format!(
                "{} rejected {} baud",
                port, baud
            ))),
            Some(device) => Ok(MockSerialPort {
                name: port.clone(),
                baud_rate: baud,
                timeout: config.read_timeout(),
                reply: device.reply_for(baud),
                write_fails: device.write_fails_at.contains(&baud),
                write_limit: device.write_limits.get(&baud).copied(),
                pending: None,
                ledger: Arc::clone(&self.ledger),
            }),
        };

        self.ledger.lock().attempts.push(OpenAttempt {
            port: port.clone(),
            baud_rate: baud,
            opened: result.is_ok(),
        });

        result.map(|p| Box::new(p) as Box<dyn SerialPortAdapter>)
    }
}

/// An open handle on a simulated device.
///
/// The device answers once per successful write; reading with nothing
/// pending times out.
pub struct MockSerialPort {
    name: PortIdentifier,
    baud_rate: u32,
    timeout: Duration,
    reply: MockReply,
    write_fails: bool,
    write_limit: Option<usize>,
    pending: Option<MockReply>,
    ledger: Arc<Mutex<Ledger>>,
}

impl SerialPortAdapter for MockSerialPort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        if self.write_fails {
            return Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "write rejected",
            )));
        }

        let n = self.write_limit.map_or(data.len(), |limit| limit.min(data.len()));
        self.ledger
            .lock()
            .writes
            .push((self.name.clone(), self.baud_rate, data[..n].to_vec()));
        self.pending = Some(self.reply.clone());
        Ok(n)
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        match self.pending.take() {
            Some(MockReply::Data(bytes)) => {
                let n = bytes.len().min(buffer.len());
                buffer[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            Some(MockReply::Empty) => Ok(0),
            Some(MockReply::Error) => Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "device error",
            ))),
            Some(MockReply::Timeout) | None => Err(PortError::timeout(self.timeout)),
        }
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}

impl Drop for MockSerialPort {
    fn drop(&mut self) {
        self.ledger.lock().closes += 1;
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("baud_rate", &self.baud_rate)
            .finish()
    }
}
