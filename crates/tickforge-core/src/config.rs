//! Configuration loading for the Tickforge simulation engine.
//!
//! The canonical configuration is a single YAML document. This module
//! defines strongly-typed structs that mirror its structure and a loader
//! that reads and validates it, the same shape as every other config in
//! this workspace: `serde_yml`, `#[serde(default)]` throughout, typed
//! `ConfigError` over a bare string.

use std::path::Path;

use serde::Deserialize;
use tickforge_agents::AgentsConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings: name, seed, dimensions, tick pacing.
    #[serde(default)]
    pub world: WorldConfig,

    /// Gameplay tunables for the brain, actions, and bookkeeping.
    /// Loads from the same document rather than a separate file so the
    /// whole tunable surface lives in one place.
    #[serde(default)]
    pub agents: AgentsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yml::from_str(&contents)?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility. Every deterministic roll in the
    /// simulation derives from this plus the acting entity, the tick, and
    /// a domain-specific subkey.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Grid width in tiles, used only when the embedder has not supplied
    /// a pre-generated grid.
    #[serde(default = "default_width")]
    pub width: i32,

    /// Grid height in tiles, used only when the embedder has not supplied
    /// a pre-generated grid.
    #[serde(default = "default_height")]
    pub height: i32,

    /// Real-time milliseconds the engine manager sleeps between ticks
    /// while running.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Milliseconds the worker pool waits for every ready actor's
    /// proposal before synthesizing Rest for any stragglers.
    #[serde(default = "default_agent_decision_timeout_ms")]
    pub agent_decision_timeout_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            width: default_width(),
            height: default_height(),
            tick_interval_ms: default_tick_interval_ms(),
            agent_decision_timeout_ms: default_agent_decision_timeout_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_world_name() -> String {
    "tickforge".to_string()
}

const fn default_seed() -> u64 {
    1
}

const fn default_width() -> i32 {
    64
}

const fn default_height() -> i32 {
    64
}

const fn default_tick_interval_ms() -> u64 {
    250
}

const fn default_agent_decision_timeout_ms() -> u64 {
    40
}

fn default_log_level() -> String {
    "info".to_string()
}
