//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::{unescape_command, Config};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "MKT_DEVINFO";

/// Config file name inside the platform config directory
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config file name looked up in the current directory
const LOCAL_CONFIG_FILE_NAME: &str = "mkt-devinfo.toml";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "MKT_DEVINFO_CONFIG";

/// Configuration loader with resolution and override logic.
///
/// Configuration is only ever read; nothing discovered at runtime is
/// written back.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `MKT_DEVINFO_CONFIG` environment variable (explicit path)
    /// 2. `./mkt-devinfo.toml` (current directory)
    /// 3. `<platform config dir>/mkt-devinfo/config.toml`
    /// 4. Built-in defaults (no file required)
    ///
    /// Environment variables override file values, then the result is
    /// validated.
    pub fn load() -> ConfigResult<Self> {
        let config_path = resolve_config_path();

        let mut config = match config_path {
            Some(ref path) => load_from_file(path)?,
            None => Config::default(),
        };

        apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut config = load_from_file(&path)?;
        apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Create a loader with default configuration (no file).
    pub fn with_defaults() -> Self {
        let mut config = Config::default();
        // Still apply env overrides even with defaults, keeping defaults on error
        let mut overridden = config.clone();
        if apply_env_overrides(&mut overridden).is_ok() && overridden.validate().is_ok() {
            config = overridden;
        }

        Self {
            config_path: None,
            config,
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }
}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    // 1. Explicit environment variable
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. Current directory
    let cwd_config = PathBuf::from(LOCAL_CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    // 3. Platform config directory
    if let Some(app_config) = get_default_config_path() {
        if app_config.exists() {
            return Some(app_config);
        }
    }

    None
}

/// Get the platform config directory for this tool.
pub fn get_default_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mkt-devinfo").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the default config file path.
pub fn get_default_config_path() -> Option<PathBuf> {
    get_default_config_dir().map(|d| d.join(CONFIG_FILE_NAME))
}

/// Load configuration from a file.
fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(ConfigError::ParseError)
}

fn env_var(key: &str) -> (String, Option<String>) {
    let name = format!("{}_{}", ENV_PREFIX, key);
    let value = std::env::var(&name).ok();
    (name, value)
}

/// Check a command override and keep it escaped, the same form the file uses.
fn env_command(name: &str, value: &str) -> ConfigResult<String> {
    unescape_command(value).map_err(|e| ConfigError::env_parse(name, e.to_string()))?;
    Ok(value.to_string())
}

/// Apply environment variable overrides to the configuration.
///
/// Environment variables follow the pattern: `MKT_DEVINFO_<SECTION>_<KEY>`
/// For example:
/// - `MKT_DEVINFO_DISCOVERY_MODE=probe`
/// - `MKT_DEVINFO_NEGOTIATION_PROBE_COMMAND=ATI\r`
/// - `MKT_DEVINFO_QUERY_TIMEOUT_MS=500`
fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    // Discovery overrides
    if let (name, Some(val)) = env_var("DISCOVERY_MODE") {
        config.discovery.mode = val
            .parse()
            .map_err(|_| ConfigError::env_parse(name, "expected probe, static or system"))?;
    }

    // Negotiation overrides
    if let (name, Some(val)) = env_var("NEGOTIATION_BAUD_RATES") {
        config.negotiation.baud_rates = val
            .split(',')
            .map(|s| s.trim().parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|_| ConfigError::env_parse(name, "Invalid baud rate list"))?;
    }
    if let (name, Some(val)) = env_var("NEGOTIATION_PROBE_COMMAND") {
        config.negotiation.probe_command = env_command(&name, &val)?;
    }
    if let (name, Some(val)) = env_var("NEGOTIATION_READ_TIMEOUT_MS") {
        config.negotiation.read_timeout_ms = val
            .parse()
            .map_err(|_| ConfigError::env_parse(name, "Invalid timeout"))?;
    }

    // Query overrides
    if let (name, Some(val)) = env_var("QUERY_COMMAND") {
        config.query.command = env_command(&name, &val)?;
    }
    if let (name, Some(val)) = env_var("QUERY_TIMEOUT_MS") {
        config.query.timeout_ms = val
            .parse()
            .map_err(|_| ConfigError::env_parse(name, "Invalid timeout"))?;
    }

    // Logging overrides
    if let (_, Some(val)) = env_var("LOGGING_LEVEL") {
        config.logging.level = val;
    }

    Ok(())
}
