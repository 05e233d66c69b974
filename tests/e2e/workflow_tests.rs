//! Complete workflow E2E tests: discover -> negotiate -> query
//!
//! These tests verify full workflows including:
//! - Negotiating a rate and querying the device at it
//! - Skipping negotiation when the rate is given
//! - Failing cleanly when nothing is discovered

use crate::common::{
    assert_all_closed, chatty_device, device_answering_at, negotiator, port, reader, TEST_TIMEOUT,
};
use mkt_devinfo::discovery::{discover_ports, StaticEnumerator};
use mkt_devinfo::port::{MockDevice, MockPortOpener, MockReply};
use mkt_devinfo::query::{query_device_info, DEFAULT_INFO_COMMAND};
use mkt_devinfo::reader::{BaudSelection, BaudSource};
use mkt_devinfo::ProbeError;
use pretty_assertions::assert_eq;

#[test]
fn test_negotiate_then_query_at_256000() {
    let opener = MockPortOpener::with_devices([device_answering_at("COM3", 256000)]);

    let baud = negotiator(&opener).detect_baud_rate(&port("COM3")).unwrap();
    assert_eq!(baud, 256000);

    let text = query_device_info(
        &opener,
        &port("COM3"),
        baud,
        DEFAULT_INFO_COMMAND,
        TEST_TIMEOUT,
    )
    .unwrap();

    assert_eq!(text, "OK\r\n");
    assert_eq!(opener.open_count(), 9);
    assert_all_closed(&opener);
}

#[test]
fn test_reader_runs_full_workflow() {
    let opener = MockPortOpener::with_devices([MockDevice::new("COM2")
        .reply_at(38400, MockReply::data(b"MT3333 FW:AXN_5.1.6\r\n"))]);
    let ports = discover_ports(&StaticEnumerator::new(["COM2", "COM5"])).unwrap();

    let reading = reader(&opener)
        .read_selected(&ports, None, BaudSelection::Auto)
        .unwrap();

    assert_eq!(reading.port, "COM2");
    assert_eq!(reading.baud_rate, 38400);
    assert_eq!(reading.baud_source, BaudSource::Negotiated);
    assert_eq!(reading.text, "MT3333 FW:AXN_5.1.6\r\n");

    let writes = opener.writes();
    assert_eq!(writes.last().unwrap().2, DEFAULT_INFO_COMMAND.to_vec());
    assert_all_closed(&opener);
}

#[test]
fn test_zero_ports_never_negotiates() {
    let opener = MockPortOpener::with_devices([chatty_device("COM1", b"OK")]);
    let ports = discover_ports(&StaticEnumerator::new(Vec::<String>::new())).unwrap();
    assert!(ports.is_empty());

    let err = reader(&opener)
        .read_selected(&ports, None, BaudSelection::Auto)
        .unwrap_err();

    assert!(matches!(err, ProbeError::NoPortsAvailable));
    assert!(opener.attempts().is_empty());
    assert!(opener.writes().is_empty());
}

#[test]
fn test_explicit_baud_skips_negotiation() {
    let opener = MockPortOpener::with_devices([chatty_device("COM1", b"ID")]);

    let reading = reader(&opener)
        .read(&port("COM1"), BaudSelection::Fixed(57600))
        .unwrap();

    assert_eq!(reading.baud_source, BaudSource::Explicit);
    assert_eq!(reading.text, "ID");
    assert_eq!(opener.attempted_bauds("COM1"), vec![57600]);
}

#[test]
fn test_requested_port_overrides_discovery() {
    let opener = MockPortOpener::with_devices([chatty_device("COM9", b"hello")]);
    let ports = discover_ports(&StaticEnumerator::new(["COM1"])).unwrap();

    let reading = reader(&opener)
        .read_selected(&ports, Some("COM9"), BaudSelection::Fixed(9600))
        .unwrap();

    assert_eq!(reading.port, "COM9");
    assert!(opener.attempted_bauds("COM1").is_empty());
}

#[test]
fn test_query_failures_release_the_port() {
    let opener = MockPortOpener::with_devices([MockDevice::new("COM1")
        .write_fails_at(9600)
        .reply_at(19200, MockReply::Timeout)
        .reply_at(38400, MockReply::Error)]);
    let reader = reader(&opener);

    assert!(matches!(
        reader.read(&port("COM1"), BaudSelection::Fixed(9600)),
        Err(ProbeError::WriteFailure { .. })
    ));
    assert!(reader
        .read(&port("COM1"), BaudSelection::Fixed(19200))
        .unwrap_err()
        .is_read_failure());
    assert!(reader
        .read(&port("COM1"), BaudSelection::Fixed(38400))
        .unwrap_err()
        .is_read_failure());
    assert!(matches!(
        reader.read(&port("COM8"), BaudSelection::Fixed(9600)),
        Err(ProbeError::PortOpenFailure { .. })
    ));

    assert_eq!(opener.open_count(), 3);
    assert_all_closed(&opener);
}

#[test]
fn test_empty_reply_reads_as_empty_text() {
    let opener = MockPortOpener::with_devices([MockDevice::new("COM1")
        .reply_by_default(MockReply::Empty)]);

    let reading = reader(&opener)
        .read(&port("COM1"), BaudSelection::Fixed(9600))
        .unwrap();

    assert_eq!(reading.text, "");
}

#[test]
fn test_reading_serializes_for_json_output() {
    let opener = MockPortOpener::with_devices([chatty_device("COM1", b"v1.2")]);

    let reading = reader(&opener)
        .read(&port("COM1"), BaudSelection::Fixed(115200))
        .unwrap();
    let value = serde_json::to_value(&reading).unwrap();

    assert_eq!(
        value,
        serde_json::json!({
            "port": "COM1",
            "baud_rate": 115200,
            "baud_source": "explicit",
            "text": "v1.2",
        })
    );
}
