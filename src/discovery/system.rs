//! Discovery through the operating system's port list.

use super::PortEnumerator;
use crate::error::{ProbeError, ProbeResult};
use crate::port::PortIdentifier;
use serialport::{available_ports, SerialPortType};

/// Lists ports the operating system reports (device tree, registry, IOKit).
#[derive(Debug, Clone)]
pub struct SystemEnumerator {
    /// Skip ports whose name contains any of these.
    skip_patterns: Vec<String>,
}

impl SystemEnumerator {
    /// Skips macOS Bluetooth and debug console ports.
    pub fn new() -> Self {
        Self {
            skip_patterns: vec!["Bluetooth".to_string(), "debug".to_string()],
        }
    }

    pub fn with_skip_patterns(skip_patterns: Vec<String>) -> Self {
        Self { skip_patterns }
    }

    fn should_skip(&self, name: &str) -> bool {
        self.skip_patterns.iter().any(|p| name.contains(p.as_str()))
    }

    /// Ports with a short description of each, sorted by name.
    pub fn list_detailed(&self) -> ProbeResult<Vec<(PortIdentifier, String)>> {
        let mut ports: Vec<(String, String)> = available_ports()
            .map_err(|e| ProbeError::Enumeration(e.to_string()))?
            .into_iter()
            .filter(|p| !self.should_skip(&p.port_name))
            .map(|p| {
                let description = Self::describe(&p.port_type);
                (p.port_name, description)
            })
            .collect();
        ports.sort_by(|a, b| a.0.cmp(&b.0));
        ports.dedup_by(|a, b| a.0 == b.0);

        Ok(ports
            .into_iter()
            .map(|(name, description)| (PortIdentifier::from(name), description))
            .collect())
    }

    /// Short description of a port type for listings.
    pub fn describe(port_type: &SerialPortType) -> String {
        match port_type {
            SerialPortType::UsbPort(usb) => match &usb.product {
                Some(product) => format!("USB {:04x}:{:04x} {}", usb.vid, usb.pid, product),
                None => format!("USB {:04x}:{:04x}", usb.vid, usb.pid),
            },
            SerialPortType::BluetoothPort => "Bluetooth".to_string(),
            SerialPortType::PciPort => "PCI".to_string(),
            SerialPortType::Unknown => "Unknown".to_string(),
        }
    }
}

impl Default for SystemEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PortEnumerator for SystemEnumerator {
    fn name(&self) -> &'static str {
        "system"
    }

    fn list_candidates(&self) -> ProbeResult<Vec<PortIdentifier>> {
        Ok(self
            .list_detailed()?
            .into_iter()
            .map(|(port, _)| port)
            .collect())
    }
}
