//! Configuration schema definitions.
//!
//! Every section has defaults, so an empty file (or none) is a valid
//! configuration. Command strings go through [`unescape_command`] before
//! they are sent, so a literal string `'ATI\r'` and a basic string
//! `"ATI\r"` both end in a carriage return.

use super::error::{ConfigError, ConfigResult};
use crate::discovery::{
    DiscoveryMode, PortEnumerator, PortNameTemplate, ProbeScanEnumerator, StaticEnumerator,
    SystemEnumerator,
};
use crate::error::{ProbeError, ProbeResult};
use crate::negotiation::{
    BaudNegotiator, ResponsePolicy, CANDIDATE_BAUD_RATES, DEFAULT_PROBE_COMMAND,
};
use crate::port::{PortOpener, DEFAULT_READ_TIMEOUT};
use crate::query::DEFAULT_INFO_COMMAND;
use crate::reader::DeviceInfoReader;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Port discovery
    pub discovery: DiscoveryConfig,
    /// Baud rate negotiation
    pub negotiation: NegotiationConfig,
    /// Device info query
    pub query: QueryConfig,
    /// Logging
    pub logging: LoggingConfig,
}

impl Config {
    /// Check values that would make probing impossible.
    pub fn validate(&self) -> ConfigResult<()> {
        self.discovery.validate()?;
        self.negotiation.validate()?;
        self.query.validate()
    }

    /// Build a device info reader from the negotiation and query sections.
    pub fn reader<O: PortOpener>(&self, opener: O) -> ProbeResult<DeviceInfoReader<O>> {
        let command = self
            .query
            .command_bytes()
            .map_err(|e| ProbeError::InvalidCommand(e.to_string()))?;
        Ok(DeviceInfoReader::new(self.negotiation.negotiator(opener)?)
            .with_command(command)
            .with_timeout(self.query.timeout()))
    }
}

/// Port discovery section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Strategy: "probe", "static" or "system"
    pub mode: DiscoveryMode,
    /// Name families opened by the probe strategy
    pub templates: Vec<PortNameTemplate>,
    /// Ports returned by the static strategy
    pub static_ports: Vec<String>,
    /// Name fragments hidden from the system strategy
    pub skip_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            mode: DiscoveryMode::default(),
            templates: PortNameTemplate::platform_defaults(),
            static_ports: StaticEnumerator::platform_default()
                .ports()
                .iter()
                .map(|p| p.to_string())
                .collect(),
            skip_patterns: vec!["Bluetooth".to_string(), "debug".to_string()],
        }
    }
}

impl DiscoveryConfig {
    /// Build the enumerator for `mode`, defaulting to the configured one.
    pub fn enumerator<O: PortOpener + 'static>(
        &self,
        mode: Option<DiscoveryMode>,
        opener: O,
    ) -> Box<dyn PortEnumerator> {
        match mode.unwrap_or(self.mode) {
            DiscoveryMode::Probe => Box::new(ProbeScanEnumerator::with_templates(
                opener,
                self.templates.clone(),
            )),
            DiscoveryMode::Static => {
                Box::new(StaticEnumerator::new(self.static_ports.iter().cloned()))
            }
            DiscoveryMode::System => Box::new(SystemEnumerator::with_skip_patterns(
                self.skip_patterns.clone(),
            )),
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        for template in &self.templates {
            if template.first > template.last {
                return Err(ConfigError::validation(
                    "discovery.templates",
                    format!(
                        "range {}..={} for '{}' is empty",
                        template.first, template.last, template.prefix
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Which probe responses count as a live device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Any completed read, even zero bytes
    Any,
    /// At least one byte
    #[default]
    RequireBytes,
    /// Must contain one of `expected_responses`
    Contains,
}

/// Baud negotiation section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationConfig {
    /// Candidate baud rates, tried in order
    pub baud_rates: Vec<u32>,
    /// Probe command sent at each rate
    pub probe_command: String,
    /// Read timeout per candidate in milliseconds
    pub read_timeout_ms: u64,
    /// Response acceptance policy
    pub response_policy: PolicyKind,
    /// Patterns for the `contains` policy
    pub expected_responses: Vec<String>,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            baud_rates: CANDIDATE_BAUD_RATES.to_vec(),
            probe_command: String::from_utf8_lossy(DEFAULT_PROBE_COMMAND).into_owned(),
            read_timeout_ms: DEFAULT_READ_TIMEOUT.as_millis() as u64,
            response_policy: PolicyKind::default(),
            expected_responses: vec!["OK".to_string()],
        }
    }
}

impl NegotiationConfig {
    /// Get the read timeout as Duration
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Bytes sent at each candidate rate, escapes resolved.
    pub fn probe_command_bytes(&self) -> ConfigResult<Vec<u8>> {
        command_field("negotiation.probe_command", &self.probe_command)
    }

    pub fn response_policy(&self) -> ResponsePolicy {
        match self.response_policy {
            PolicyKind::Any => ResponsePolicy::AnyResponse,
            PolicyKind::RequireBytes => ResponsePolicy::RequireBytes,
            PolicyKind::Contains => ResponsePolicy::Contains(
                self.expected_responses
                    .iter()
                    .map(|s| s.as_bytes().to_vec())
                    .collect(),
            ),
        }
    }

    /// Build a negotiator with these settings.
    pub fn negotiator<O: PortOpener>(&self, opener: O) -> ProbeResult<BaudNegotiator<O>> {
        let probe_command = self
            .probe_command_bytes()
            .map_err(|e| ProbeError::InvalidCommand(e.to_string()))?;
        Ok(BaudNegotiator::new(opener)
            .with_candidates(&self.baud_rates)?
            .with_probe_command(probe_command)
            .with_read_timeout(self.read_timeout())
            .with_response_policy(self.response_policy()))
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.baud_rates.is_empty() {
            return Err(ConfigError::validation(
                "negotiation.baud_rates",
                "at least one baud rate is required",
            ));
        }
        if self.baud_rates.contains(&0) {
            return Err(ConfigError::validation(
                "negotiation.baud_rates",
                "baud rates must be positive",
            ));
        }
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::validation(
                "negotiation.read_timeout_ms",
                "timeout must be positive",
            ));
        }
        if self.probe_command_bytes()?.is_empty() {
            return Err(ConfigError::validation(
                "negotiation.probe_command",
                "probe command must not be empty",
            ));
        }
        if self.response_policy == PolicyKind::Contains
            && self.expected_responses.iter().all(|s| s.is_empty())
        {
            return Err(ConfigError::validation(
                "negotiation.expected_responses",
                "the contains policy needs at least one non-empty pattern",
            ));
        }
        Ok(())
    }
}

/// Device info query section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Command whose response is reported
    pub command: String,
    /// Read timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            command: String::from_utf8_lossy(DEFAULT_INFO_COMMAND).into_owned(),
            timeout_ms: DEFAULT_READ_TIMEOUT.as_millis() as u64,
        }
    }
}

impl QueryConfig {
    /// Get the timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Bytes of the info command, escapes resolved.
    pub fn command_bytes(&self) -> ConfigResult<Vec<u8>> {
        command_field("query.command", &self.command)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::validation(
                "query.timeout_ms",
                "timeout must be positive",
            ));
        }
        if self.command_bytes()?.is_empty() {
            return Err(ConfigError::validation(
                "query.command",
                "command must not be empty",
            ));
        }
        Ok(())
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Log format: "json", "pretty", "compact"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format
    Json,
    /// Pretty format with colors
    Pretty,
    /// Compact format
    #[default]
    Compact,
}

/// Unescape a command held in config key `key`, naming the key on failure.
fn command_field(key: &str, value: &str) -> ConfigResult<Vec<u8>> {
    unescape_command(value).map_err(|e| match e {
        ConfigError::ValidationError { message, .. } => ConfigError::validation(key, message),
        other => other,
    })
}

/// Turn `\r`, `\n`, `\t`, `\\` and `\xNN` escapes into raw bytes. Other
/// characters, including a raw carriage return, pass through unchanged.
pub fn unescape_command(input: &str) -> ConfigResult<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('r') => out.push(b'\r'),
            Some('n') => out.push(b'\n'),
            Some('t') => out.push(b'\t'),
            Some('\\') => out.push(b'\\'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                let byte = u8::from_str_radix(&hex, 16).map_err(|_| {
                    ConfigError::validation("command", format!("bad hex escape '\\x{}'", hex))
                })?;
                out.push(byte);
            }
            Some(other) => {
                return Err(ConfigError::validation(
                    "command",
                    format!("unknown escape '\\{}'", other),
                ))
            }
            None => {
                return Err(ConfigError::validation("command", "trailing backslash"));
            }
        }
    }

    Ok(out)
}
