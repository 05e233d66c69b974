//! End-to-end tests against simulated devices.
//!
//! Each test runs the public workflow (discover, negotiate, query) the way
//! the command-line front end drives it.

pub mod discovery_tests;
pub mod negotiation_tests;
pub mod workflow_tests;
