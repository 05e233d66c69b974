//! Port abstraction layer for serial communication.
//!
//! Provides the opener/handle traits the probing logic depends on, the
//! `serialport`-backed implementation, and a scripted mock for tests.

pub mod error;
pub mod mock;
pub mod sync_port;
pub mod traits;

pub use error::PortError;
pub use mock::{MockDevice, MockPortOpener, MockReply, MockSerialPort, OpenAttempt};
pub use sync_port::{SyncSerialPort, SystemPortOpener};
pub use traits::*;
