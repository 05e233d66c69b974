//! Discovery by opening conventional port names.

use super::PortEnumerator;
use crate::error::ProbeResult;
use crate::port::{PortIdentifier, PortOpener, SerialConfig};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;
use tracing::trace;

/// Baud rate used for the liveness open.
pub const SCAN_BAUD_RATE: u32 = 9600;

const SCAN_TIMEOUT: Duration = Duration::from_millis(100);

/// A numbered family of port names, e.g. `COM1..=COM256`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortNameTemplate {
    pub prefix: String,
    pub first: u32,
    pub last: u32,
}

impl PortNameTemplate {
    pub fn new(prefix: impl Into<String>, range: RangeInclusive<u32>) -> Self {
        Self {
            prefix: prefix.into(),
            first: *range.start(),
            last: *range.end(),
        }
    }

    /// Every name in the family, lowest number first.
    pub fn names(&self) -> impl Iterator<Item = PortIdentifier> + '_ {
        (self.first..=self.last).map(move |n| PortIdentifier::new(format!("{}{}", self.prefix, n)))
    }

    /// Conventional names for the current platform.
    pub fn platform_defaults() -> Vec<Self> {
        if cfg!(windows) {
            vec![Self::new("COM", 1..=256)]
        } else {
            vec![
                Self::new("/dev/ttyS", 0..=31),
                Self::new("/dev/ttyUSB", 0..=31),
                Self::new("/dev/ttyACM", 0..=31),
            ]
        }
    }
}

/// Keeps every templated name that opens without error.
///
/// Each opened handle is closed straight after the check.
#[derive(Debug, Clone)]
pub struct ProbeScanEnumerator<O> {
    opener: O,
    templates: Vec<PortNameTemplate>,
}

impl<O: PortOpener> ProbeScanEnumerator<O> {
    pub fn new(opener: O) -> Self {
        Self::with_templates(opener, PortNameTemplate::platform_defaults())
    }

    pub fn with_templates(opener: O, templates: Vec<PortNameTemplate>) -> Self {
        Self { opener, templates }
    }

    pub fn templates(&self) -> &[PortNameTemplate] {
        &self.templates
    }
}

impl<O: PortOpener> PortEnumerator for ProbeScanEnumerator<O> {
    fn name(&self) -> &'static str {
        "probe"
    }

    fn list_candidates(&self) -> ProbeResult<Vec<PortIdentifier>> {
        let mut found = Vec::new();

        for template in &self.templates {
            for name in template.names() {
                let config = match SerialConfig::new(name.clone(), SCAN_BAUD_RATE, SCAN_TIMEOUT) {
                    Ok(config) => config,
                    Err(_) => continue,
                };
                match self.opener.open(&config) {
                    Ok(handle) => {
                        handle.close();
                        found.push(name);
                    }
                    Err(e) => trace!("{} not available: {}", name, e),
                }
            }
        }

        Ok(found)
    }
}
