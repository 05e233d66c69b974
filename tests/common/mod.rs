//! Shared test utilities.
//!
//! Builders for simulated devices and a few assertions on the mock ledger.

#![allow(dead_code)]

use mkt_devinfo::negotiation::BaudNegotiator;
use mkt_devinfo::port::{MockDevice, MockPortOpener, MockReply, PortIdentifier};
use mkt_devinfo::reader::DeviceInfoReader;
use std::time::Duration;

/// Short read timeout so tests never wait on real clocks.
pub const TEST_TIMEOUT: Duration = Duration::from_millis(50);

/// A device that answers `OK\r\n` at `baud` and times out everywhere else.
pub fn device_answering_at(name: &str, baud: u32) -> MockDevice {
    MockDevice::new(name).reply_at(baud, MockReply::data(b"OK\r\n"))
}

/// A device that only opens at `baud` and answers there with `reply`.
pub fn device_opening_only_at(name: &str, baud: u32, reply: &[u8]) -> MockDevice {
    MockDevice::new(name)
        .opens_only_at(&[baud])
        .reply_at(baud, MockReply::data(reply))
}

/// A device that answers every write with `reply`.
pub fn chatty_device(name: &str, reply: &[u8]) -> MockDevice {
    MockDevice::new(name).reply_by_default(MockReply::data(reply))
}

pub fn negotiator(opener: &MockPortOpener) -> BaudNegotiator<MockPortOpener> {
    BaudNegotiator::new(opener.clone()).with_read_timeout(TEST_TIMEOUT)
}

pub fn reader(opener: &MockPortOpener) -> DeviceInfoReader<MockPortOpener> {
    DeviceInfoReader::new(negotiator(opener))
}

pub fn port(name: &str) -> PortIdentifier {
    PortIdentifier::from(name)
}

/// Every handle the mock handed out has been released.
pub fn assert_all_closed(opener: &MockPortOpener) {
    assert_eq!(
        opener.open_count(),
        opener.close_count(),
        "leaked handles: {:?}",
        opener.attempts()
    );
}
