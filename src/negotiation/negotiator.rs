//! Trial-and-error baud rate detection.
//!
//! Each candidate rate gets one fresh probe: open, send the probe command,
//! read once. The first rate whose response the [`ResponsePolicy`] accepts
//! wins and no further rates are tried.

use super::policy::ResponsePolicy;
use crate::error::{ProbeError, ProbeResult};
use crate::port::{PortIdentifier, PortOpener, SerialConfig, DEFAULT_READ_TIMEOUT};
use crate::probe::{run_probe, ProbeOutcome, RESPONSE_BUFFER_SIZE};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Candidate baud rates, tried in this order.
///
/// Common low rates come first; most devices answer on one of the first few.
pub const CANDIDATE_BAUD_RATES: &[u32] = &[
    9600, 14400, 19200, 38400, 57600, 115200, 128000, 256000,
];

/// Command sent at each candidate rate.
pub const DEFAULT_PROBE_COMMAND: &[u8] = b"AT\r";

/// Detects the baud rate a device answers on.
#[derive(Debug, Clone)]
pub struct BaudNegotiator<O> {
    opener: O,
    candidates: Vec<u32>,
    probe_command: Vec<u8>,
    read_timeout: Duration,
    policy: ResponsePolicy,
}

impl<O: PortOpener> BaudNegotiator<O> {
    /// Negotiator with the standard candidate list, `AT\r` probe, two second
    /// read timeout and the default response policy.
    pub fn new(opener: O) -> Self {
        Self {
            opener,
            candidates: CANDIDATE_BAUD_RATES.to_vec(),
            probe_command: DEFAULT_PROBE_COMMAND.to_vec(),
            read_timeout: DEFAULT_READ_TIMEOUT,
            policy: ResponsePolicy::default(),
        }
    }

    /// Replace the candidate list. Order is kept, repeats are dropped, and a
    /// zero rate is rejected.
    pub fn with_candidates(mut self, rates: &[u32]) -> ProbeResult<Self> {
        let mut candidates = Vec::with_capacity(rates.len());
        for &rate in rates {
            if rate == 0 {
                return Err(ProbeError::InvalidBaudRate(rate));
            }
            if !candidates.contains(&rate) {
                candidates.push(rate);
            }
        }
        self.candidates = candidates;
        Ok(self)
    }

    pub fn with_probe_command(mut self, command: impl Into<Vec<u8>>) -> Self {
        self.probe_command = command.into();
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_response_policy(mut self, policy: ResponsePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn candidates(&self) -> &[u32] {
        &self.candidates
    }

    pub fn probe_command(&self) -> &[u8] {
        &self.probe_command
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub fn response_policy(&self) -> &ResponsePolicy {
        &self.policy
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    /// Try every candidate rate on `port` and return the first that answers.
    ///
    /// # Errors
    /// [`ProbeError::NoResponsiveBaudRate`] once the list is exhausted.
    pub fn detect_baud_rate(&self, port: &PortIdentifier) -> ProbeResult<u32> {
        info!(
            "Detecting baud rate on {} ({} candidates)",
            port,
            self.candidates.len()
        );

        for (attempt, &baud_rate) in self.candidates.iter().enumerate() {
            let config = SerialConfig::new(port.clone(), baud_rate, self.read_timeout)
                .map_err(|_| ProbeError::InvalidBaudRate(baud_rate))?;

            debug!("Probing {} at {} baud", port, baud_rate);
            match run_probe(
                &self.opener,
                &config,
                &self.probe_command,
                RESPONSE_BUFFER_SIZE,
            ) {
                ProbeOutcome::Success(response) if self.policy.accepts(&response) => {
                    info!(
                        "{} answered at {} baud after {} attempt(s)",
                        port,
                        baud_rate,
                        attempt + 1
                    );
                    return Ok(baud_rate);
                }
                ProbeOutcome::Success(response) => {
                    debug!(
                        "Response of {} bytes at {} baud rejected by {:?}",
                        response.len(),
                        baud_rate,
                        self.policy
                    );
                }
                ProbeOutcome::OpenFailed(e) => {
                    debug!("Failed to open at {} baud: {}", baud_rate, e);
                }
                ProbeOutcome::WriteFailed(e) => {
                    debug!("Write failed at {} baud: {}", baud_rate, e);
                }
                ProbeOutcome::ReadTimedOutOrFailed(e) => {
                    debug!("No response at {} baud: {}", baud_rate, e);
                }
            }
        }

        warn!(
            "No responsive baud rate on {} after {} attempts",
            port,
            self.candidates.len()
        );
        Err(ProbeError::NoResponsiveBaudRate {
            port: port.clone(),
            attempts: self.candidates.len(),
        })
    }
}
