//! # Runtime Configuration
//!
//! Loaded in two layers:
//!
//! 1. Optional JSON file named by `MSGBUS_CONFIG`
//! 2. Individual environment overrides (`MSGBUS_INBOUND_CAPACITY`,
//!    `MSGBUS_INBOX_CAPACITY`, `MSGBUS_TICK_MS`, `MSGBUS_TICKS`)
//!
//! Unparseable overrides are logged and ignored. The merged result is
//! validated before the bus is built.

use std::path::{Path, PathBuf};
use std::time::Duration;

use message_bus::{BusConfig, ConfigError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub const ENV_CONFIG_FILE: &str = "MSGBUS_CONFIG";
pub const ENV_INBOUND_CAPACITY: &str = "MSGBUS_INBOUND_CAPACITY";
pub const ENV_INBOX_CAPACITY: &str = "MSGBUS_INBOX_CAPACITY";
pub const ENV_TICK_MS: &str = "MSGBUS_TICK_MS";
pub const ENV_TICKS: &str = "MSGBUS_TICKS";

/// Errors while loading runtime configuration.
#[derive(Debug, Error)]
pub enum RuntimeConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigError),

    #[error("tick interval must be at least 1ms")]
    ZeroTickInterval,
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Queue sizes.
    pub bus: BusConfig,
    /// Time between ticks in milliseconds.
    pub tick_interval_ms: u64,
    /// Stop after this many ticks. `None` runs until Ctrl+C.
    pub ticks: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bus: BusConfig::default(),
            tick_interval_ms: 100,
            ticks: None,
        }
    }
}

impl RuntimeConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<(), RuntimeConfigError> {
        self.bus.validate()?;
        if self.tick_interval_ms == 0 {
            return Err(RuntimeConfigError::ZeroTickInterval);
        }
        Ok(())
    }

    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, RuntimeConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| RuntimeConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| RuntimeConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment-style overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(capacity) = parse_var(&lookup, ENV_INBOUND_CAPACITY) {
            self.bus.inbound_capacity = capacity;
        }
        if let Some(capacity) = parse_var(&lookup, ENV_INBOX_CAPACITY) {
            self.bus.inbox_capacity = capacity;
        }
        if let Some(ms) = parse_var(&lookup, ENV_TICK_MS) {
            self.tick_interval_ms = ms;
        }
        if let Some(ticks) = parse_var(&lookup, ENV_TICKS) {
            self.ticks = Some(ticks);
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable override");
            None
        }
    }
}

/// Load configuration from `lookup` (normally the process environment).
pub fn load_config_from<F>(lookup: F) -> Result<RuntimeConfig, RuntimeConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match lookup(ENV_CONFIG_FILE) {
        Some(path) => {
            let config = RuntimeConfig::from_file(Path::new(&path))?;
            info!(path = %path, "Loaded config file");
            config
        }
        None => RuntimeConfig::default(),
    };

    config.apply_overrides(lookup);
    config.validate()?;
    Ok(config)
}

/// Load configuration from the process environment.
pub fn load_config() -> Result<RuntimeConfig, RuntimeConfigError> {
    load_config_from(|key| std::env::var(key).ok())
}
