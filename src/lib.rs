//! mkt-devinfo library
//!
//! Finds serial ports, detects the baud rate a device answers on, and reads a
//! short identification string over an AT-command style protocol.
//!
//! Every operation is synchronous, opens its own port handle and releases it
//! before returning; nothing is cached between calls.
//!
//! # Modules
//!
//! - `port`: opener/handle traits, the `serialport` backend and a scripted mock
//! - `probe`: the single open → write → read exchange shared by everything else
//! - `discovery`: port enumeration strategies (probe scan, static, system)
//! - `negotiation`: baud rate detection over a fixed candidate list
//! - `query`: one-shot command/response
//! - `reader`: negotiation followed by a query, with explicit parameters
//! - `config`: TOML configuration for the command-line front end
//! - `logging`: tracing subscriber setup
//! - `error`: the probe error taxonomy
//!
//! # Example
//!
//! ```no_run
//! use mkt_devinfo::discovery::{discover_ports, SystemEnumerator};
//! use mkt_devinfo::negotiation::BaudNegotiator;
//! use mkt_devinfo::port::SystemPortOpener;
//! use mkt_devinfo::reader::{BaudSelection, DeviceInfoReader};
//!
//! let ports = discover_ports(&SystemEnumerator::new())?;
//! let reader = DeviceInfoReader::new(BaudNegotiator::new(SystemPortOpener));
//! let reading = reader.read_selected(&ports, None, BaudSelection::Auto)?;
//! println!("Device Info: {}", reading.text);
//! # Ok::<(), mkt_devinfo::ProbeError>(())
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod negotiation;
pub mod port;
pub mod probe;
pub mod query;
pub mod reader;

// Re-export commonly used types for convenience
pub use discovery::{discover_ports, DiscoveryMode, PortEnumerator};
pub use error::{ProbeError, ProbeResult};
pub use negotiation::{BaudNegotiator, ResponsePolicy, CANDIDATE_BAUD_RATES};
pub use port::{PortError, PortIdentifier, PortOpener, SerialConfig, SystemPortOpener};
pub use probe::{run_probe, ProbeOutcome};
pub use query::query_device_info;
pub use reader::{BaudSelection, DeviceInfoReader, DeviceInfoReading};

// Re-export config types
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
