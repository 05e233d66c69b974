//! Discovery, negotiation and query against a real device.

use super::utils::{require_port, HARDWARE_TIMEOUT};
use mkt_devinfo::discovery::{discover_ports, SystemEnumerator};
use mkt_devinfo::negotiation::BaudNegotiator;
use mkt_devinfo::port::{PortIdentifier, SystemPortOpener};
use mkt_devinfo::reader::{BaudSelection, DeviceInfoReader};

#[test]
#[ignore]
fn test_system_discovery_lists_test_port() {
    let Some(config) = require_port() else { return };

    let ports = discover_ports(&SystemEnumerator::new()).unwrap();

    assert!(
        ports.iter().any(|p| p == &PortIdentifier::from(config.port_name.as_str())),
        "{} not in {:?}",
        config.port_name,
        ports
    );
}

#[test]
#[ignore]
fn test_detect_and_read_device_info() {
    let Some(config) = require_port() else { return };
    let port = PortIdentifier::from(config.port_name.as_str());
    let negotiator = BaudNegotiator::new(SystemPortOpener).with_read_timeout(HARDWARE_TIMEOUT);

    let baud = negotiator.detect_baud_rate(&port).unwrap();
    println!("{} answered at {} baud", port, baud);
    if let Some(expected) = config.expected_baud {
        assert_eq!(baud, expected);
    }

    let reading = DeviceInfoReader::new(negotiator)
        .read(&port, BaudSelection::Fixed(baud))
        .unwrap();
    println!("Device Info: {}", reading.text);
}
