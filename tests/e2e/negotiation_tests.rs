//! E2E tests for baud negotiation across discovered ports.

use crate::common::{assert_all_closed, device_answering_at, negotiator};
use mkt_devinfo::discovery::{discover_ports, StaticEnumerator};
use mkt_devinfo::port::{MockDevice, MockPortOpener};
use mkt_devinfo::ProbeError;

#[test]
fn test_each_port_negotiates_independently() {
    let opener = MockPortOpener::with_devices([
        device_answering_at("COM1", 9600),
        device_answering_at("COM2", 115200),
        MockDevice::new("COM3"),
    ]);
    let ports = discover_ports(&StaticEnumerator::new(["COM1", "COM2", "COM3"])).unwrap();
    let negotiator = negotiator(&opener);

    let results: Vec<_> = ports
        .iter()
        .map(|port| negotiator.detect_baud_rate(port))
        .collect();

    assert_eq!(results[0].as_ref().unwrap(), &9600);
    assert_eq!(results[1].as_ref().unwrap(), &115200);
    assert!(matches!(
        results[2],
        Err(ProbeError::NoResponsiveBaudRate { .. })
    ));

    assert_eq!(opener.attempted_bauds("COM1"), vec![9600]);
    assert_eq!(opener.attempted_bauds("COM2").len(), 6);
    assert_eq!(opener.attempted_bauds("COM3").len(), 8);
    assert_all_closed(&opener);
}

#[test]
fn test_listed_port_that_does_not_exist() {
    let opener = MockPortOpener::new();
    let ports = discover_ports(&StaticEnumerator::new(["COM4"])).unwrap();

    let err = negotiator(&opener).detect_baud_rate(&ports[0]).unwrap_err();

    assert_eq!(err.port().map(|p| p.as_str()), Some("COM4"));
    assert_eq!(opener.open_count(), 0);
}
