//! Serial port discovery.
//!
//! Discovery strategies implement [`PortEnumerator`] so the rest of the
//! crate never depends on how a platform names or finds its ports:
//!
//! - [`ProbeScanEnumerator`]: open every name produced by a set of templates
//!   and keep those that open. A port busy in another process is missed.
//! - [`StaticEnumerator`]: a fixed list, no hardware access.
//! - [`SystemEnumerator`]: ask the operating system.

pub mod probe_scan;
pub mod static_list;
pub mod system;

pub use probe_scan::{PortNameTemplate, ProbeScanEnumerator};
pub use static_list::StaticEnumerator;
pub use system::SystemEnumerator;

use crate::error::{ProbeError, ProbeResult};
use crate::port::PortIdentifier;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// A strategy for listing candidate serial ports.
pub trait PortEnumerator {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// List candidate ports, in a stable order. An empty list is not an error.
    fn list_candidates(&self) -> ProbeResult<Vec<PortIdentifier>>;
}

/// Run `enumerator` and log what it found.
pub fn discover_ports(enumerator: &dyn PortEnumerator) -> ProbeResult<Vec<PortIdentifier>> {
    info!("Discovering serial ports ({} strategy)...", enumerator.name());
    let ports = enumerator.list_candidates()?;

    if ports.is_empty() {
        info!("No serial ports found");
    } else {
        info!("Found {} serial port(s)", ports.len());
        for port in &ports {
            info!("  {}", port);
        }
    }

    Ok(ports)
}

/// Which discovery strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryMode {
    /// Open conventional port names and keep those that open.
    Probe,
    /// Return a fixed list without touching hardware.
    Static,
    /// Ask the operating system.
    #[default]
    System,
}

impl fmt::Display for DiscoveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Probe => "probe",
            Self::Static => "static",
            Self::System => "system",
        })
    }
}

impl FromStr for DiscoveryMode {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "probe" => Ok(Self::Probe),
            "static" => Ok(Self::Static),
            "system" => Ok(Self::System),
            other => Err(ProbeError::Enumeration(format!(
                "unknown discovery mode '{}' (expected probe, static or system)",
                other
            ))),
        }
    }
}
