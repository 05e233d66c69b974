//! Baud rate negotiation.
//!
//! Finds the rate a device answers on by probing a fixed, ordered list of
//! candidates one at a time.

pub mod negotiator;
pub mod policy;

pub use negotiator::{BaudNegotiator, CANDIDATE_BAUD_RATES, DEFAULT_PROBE_COMMAND};
pub use policy::ResponsePolicy;
