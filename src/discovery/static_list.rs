//! Discovery from a fixed list.

use super::PortEnumerator;
use crate::error::ProbeResult;
use crate::port::PortIdentifier;

/// Returns a fixed list of port names without touching hardware.
///
/// Fast, but the list may name ports that do not exist and miss ones that do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticEnumerator {
    ports: Vec<PortIdentifier>,
}

impl StaticEnumerator {
    pub fn new<I, P>(ports: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PortIdentifier>,
    {
        Self {
            ports: ports.into_iter().map(Into::into).collect(),
        }
    }

    pub fn ports(&self) -> &[PortIdentifier] {
        &self.ports
    }

    /// `COM1`..`COM4` on Windows, `/dev/ttyS0`..`/dev/ttyS3` elsewhere.
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            Self::new((1..=4).map(|n| format!("COM{}", n)))
        } else {
            Self::new((0..=3).map(|n| format!("/dev/ttyS{}", n)))
        }
    }
}

impl Default for StaticEnumerator {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl PortEnumerator for StaticEnumerator {
    fn name(&self) -> &'static str {
        "static"
    }

    fn list_candidates(&self) -> ProbeResult<Vec<PortIdentifier>> {
        Ok(self.ports.clone())
    }
}
