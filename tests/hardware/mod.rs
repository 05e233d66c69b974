//! Tests against a real serial device.
//!
//! Set `TEST_PORT` to the device path; `TEST_BAUD` pins the expected rate.

pub mod real_port_tests;
pub mod utils;
