//! Integration tests for baud rate negotiation.

mod common;

use common::{assert_all_closed, device_answering_at, device_opening_only_at, negotiator, port};
use mkt_devinfo::negotiation::{BaudNegotiator, ResponsePolicy, CANDIDATE_BAUD_RATES};
use mkt_devinfo::port::{MockDevice, MockPortOpener, MockReply};
use mkt_devinfo::ProbeError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_device_only_opening_at_115200() {
    let opener = MockPortOpener::with_devices([device_opening_only_at("COM3", 115200, b"OK\r\n")]);

    let baud = negotiator(&opener).detect_baud_rate(&port("COM3")).unwrap();

    assert_eq!(baud, 115200);
    // Five rejected opens, then the sixth attempt answers
    let attempts = opener.attempts();
    assert_eq!(attempts.len(), 6);
    assert_eq!(attempts.iter().filter(|a| !a.opened).count(), 5);
    assert_eq!(
        opener.attempted_bauds("COM3"),
        vec![9600, 14400, 19200, 38400, 57600, 115200]
    );
    assert_all_closed(&opener);
}

#[test]
fn test_device_answering_only_at_256000() {
    let opener = MockPortOpener::with_devices([device_answering_at("COM3", 256000)]);

    let baud = negotiator(&opener).detect_baud_rate(&port("COM3")).unwrap();

    assert_eq!(baud, 256000);
    assert_eq!(opener.attempted_bauds("COM3"), CANDIDATE_BAUD_RATES.to_vec());
    assert_eq!(opener.open_count(), CANDIDATE_BAUD_RATES.len());
    assert_all_closed(&opener);
}

#[test]
fn test_silent_device_exhausts_candidates() {
    let opener = MockPortOpener::with_devices([MockDevice::new("COM3")]);

    let err = negotiator(&opener)
        .detect_baud_rate(&port("COM3"))
        .unwrap_err();

    match err {
        ProbeError::NoResponsiveBaudRate { port, attempts } => {
            assert_eq!(port, "COM3");
            assert_eq!(attempts, CANDIDATE_BAUD_RATES.len());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_all_closed(&opener);
}

#[test]
fn test_missing_port_fails_every_open() {
    let opener = MockPortOpener::new();

    let result = negotiator(&opener).detect_baud_rate(&port("COM42"));

    assert!(matches!(
        result,
        Err(ProbeError::NoResponsiveBaudRate { attempts: 8, .. })
    ));
    assert_eq!(opener.open_count(), 0);
    assert_eq!(opener.close_count(), 0);
}

#[test]
fn test_empty_read_is_not_a_response() {
    let opener = MockPortOpener::with_devices([MockDevice::new("COM3")
        .reply_at(9600, MockReply::Empty)
        .reply_at(19200, MockReply::data(b"OK"))]);

    let baud = negotiator(&opener).detect_baud_rate(&port("COM3")).unwrap();

    assert_eq!(baud, 19200);
}

#[test]
fn test_any_response_policy_accepts_empty_read() {
    let opener = MockPortOpener::with_devices([
        MockDevice::new("COM3").reply_at(14400, MockReply::Empty)
    ]);

    let baud = negotiator(&opener)
        .with_response_policy(ResponsePolicy::AnyResponse)
        .detect_baud_rate(&port("COM3"))
        .unwrap();

    assert_eq!(baud, 14400);
}

#[test]
fn test_at_ok_policy_skips_line_noise() {
    // Wrong baud rates usually yield garbage rather than silence
    let opener = MockPortOpener::with_devices([MockDevice::new("COM3")
        .reply_by_default(MockReply::data(&[0xfe, 0x00, 0x7f]))
        .reply_at(57600, MockReply::data(b"AT\r\r\nOK\r\n"))]);

    let baud = negotiator(&opener)
        .with_response_policy(ResponsePolicy::at_ok())
        .detect_baud_rate(&port("COM3"))
        .unwrap();

    assert_eq!(baud, 57600);
}

#[test]
fn test_write_and_read_errors_move_on() {
    let opener = MockPortOpener::with_devices([MockDevice::new("COM3")
        .write_fails_at(9600)
        .reply_at(14400, MockReply::Error)
        .reply_at(19200, MockReply::data(b"OK"))]);

    let baud = negotiator(&opener).detect_baud_rate(&port("COM3")).unwrap();

    assert_eq!(baud, 19200);
    assert_all_closed(&opener);
}

#[test]
fn test_truncated_probe_command_moves_on() {
    let opener = MockPortOpener::with_devices([MockDevice::new("COM3")
        .write_accepts_at(9600, 1)
        .reply_by_default(MockReply::data(b"OK"))]);

    let baud = negotiator(&opener).detect_baud_rate(&port("COM3")).unwrap();

    assert_eq!(baud, 14400);
    assert_eq!(opener.writes()[0].2, b"A".to_vec());
    assert_all_closed(&opener);
}

#[test]
fn test_custom_candidates_are_deduplicated() {
    let negotiator = BaudNegotiator::new(MockPortOpener::new())
        .with_candidates(&[115200, 9600, 115200])
        .unwrap();
    assert_eq!(negotiator.candidates(), &[115200, 9600]);

    let err = BaudNegotiator::new(MockPortOpener::new())
        .with_candidates(&[9600, 0])
        .unwrap_err();
    assert!(matches!(err, ProbeError::InvalidBaudRate(0)));
}

#[test]
fn test_repeated_detection_is_independent() {
    let opener = MockPortOpener::with_devices([device_answering_at("COM3", 38400)]);
    let negotiator = negotiator(&opener);

    assert_eq!(negotiator.detect_baud_rate(&port("COM3")).unwrap(), 38400);
    assert_eq!(negotiator.detect_baud_rate(&port("COM3")).unwrap(), 38400);

    assert_eq!(
        opener.attempted_bauds("COM3"),
        vec![9600, 14400, 19200, 38400, 9600, 14400, 19200, 38400]
    );
    assert_all_closed(&opener);
}

proptest! {
    #[test]
    fn prop_no_rate_tried_after_success(index in 0usize..CANDIDATE_BAUD_RATES.len()) {
        let winner = CANDIDATE_BAUD_RATES[index];
        let opener = MockPortOpener::with_devices([device_answering_at("COM3", winner)]);

        let baud = negotiator(&opener).detect_baud_rate(&port("COM3")).unwrap();

        prop_assert_eq!(baud, winner);
        prop_assert_eq!(
            opener.attempted_bauds("COM3"),
            CANDIDATE_BAUD_RATES[..=index].to_vec()
        );
        prop_assert_eq!(opener.open_count(), opener.close_count());
    }

    #[test]
    fn prop_rates_tried_in_given_order(rates in proptest::collection::vec(1u32..=1_000_000, 1..12)) {
        let negotiator = BaudNegotiator::new(MockPortOpener::with_devices([MockDevice::new("COM3")]))
            .with_read_timeout(common::TEST_TIMEOUT)
            .with_candidates(&rates)
            .unwrap();

        let mut expected: Vec<u32> = Vec::new();
        for rate in &rates {
            if !expected.contains(rate) {
                expected.push(*rate);
            }
        }

        prop_assert!(negotiator.detect_baud_rate(&port("COM3")).is_err());
        prop_assert_eq!(negotiator.opener().attempted_bauds("COM3"), expected);
    }
}
