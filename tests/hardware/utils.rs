//! Helpers for hardware tests.

use std::env;
use std::time::Duration;

/// Device under test, from the environment.
pub struct TestPortConfig {
    pub port_name: String,
    pub expected_baud: Option<u32>,
}

impl TestPortConfig {
    pub fn from_env() -> Option<Self> {
        let port_name = env::var("TEST_PORT").ok()?;
        let expected_baud = env::var("TEST_BAUD").ok().and_then(|s| s.parse().ok());

        Some(TestPortConfig {
            port_name,
            expected_baud,
        })
    }
}

/// Real devices get a longer window than the mocks.
pub const HARDWARE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Print a skip notice and return `None` when no device is configured.
pub fn require_port() -> Option<TestPortConfig> {
    let config = TestPortConfig::from_env();
    if config.is_none() {
        println!("TEST_PORT not set, skipping");
    }
    config
}
