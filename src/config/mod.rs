//! Configuration module for mkt-devinfo.
//!
//! TOML-based configuration with environment variable overrides. It is read
//! by the command-line front end only; the probing core takes every setting
//! as an explicit argument.
//!
//! # Configuration Resolution
//!
//! Configuration is loaded from the following locations (in order of priority):
//!
//! 1. `MKT_DEVINFO_CONFIG` environment variable (explicit path)
//! 2. `./mkt-devinfo.toml` (current directory)
//! 3. `<platform config dir>/mkt-devinfo/config.toml`
//! 4. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! The pattern is `MKT_DEVINFO_<SECTION>_<KEY>`:
//! - `MKT_DEVINFO_DISCOVERY_MODE=static`
//! - `MKT_DEVINFO_NEGOTIATION_BAUD_RATES=115200,9600`
//! - `MKT_DEVINFO_QUERY_COMMAND=ATI\r`
//!
//! # Example
//!
//! ```toml
//! [discovery]
//! mode = "probe"
//!
//! [negotiation]
//! probe_command = "AT\r"
//! response_policy = "contains"
//! expected_responses = ["OK"]
//!
//! [query]
//! command = "AT+DEVICEINFO\r"
//! timeout_ms = 2000
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    get_default_config_dir, get_default_config_path, resolve_config_path, ConfigLoader,
};
pub use schema::{
    unescape_command, Config, DiscoveryConfig, LogFormat, LoggingConfig, NegotiationConfig,
    PolicyKind, QueryConfig,
};
