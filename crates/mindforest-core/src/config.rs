//! Configuration loading and typed config structures for the Mindforest
//! garden.
//!
//! The canonical configuration lives in `mindforest-config.yaml` at the
//! project root. Every field has a default, so an empty file (or no file at
//! all) yields a working in-memory garden.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use mindforest_growth::{
    DEFAULT_SPEED_BOOST_MULTIPLIER, DEFAULT_STAGE_DURATION_MS, GrowthSettings, HarvestYield,
};
use mindforest_ledger::starter_fruits;
use mindforest_types::{CommunityFruit, UserId};

/// User id used when the configuration names none.
pub const DEFAULT_USER_ID: UserId =
    UserId(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0001));

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

    /// A value parsed but makes no sense.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level garden configuration. Mirrors `mindforest-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MindforestConfig {
    /// Growth timing and harvest policy.
    #[serde(default)]
    pub growth: GrowthConfig,

    /// Community market contents.
    #[serde(default)]
    pub market: MarketConfig,

    /// The garden owner.
    #[serde(default)]
    pub session: SessionConfig,

    /// Connection settings.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MindforestConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Self::parse_with_env(yaml, |key| std::env::var(key).ok())
    }

    /// Parse configuration using `lookup` in place of the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse_with_env(
        yaml: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty map.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Override connection settings and the session user from the
    /// environment:
    ///
    /// - `DATABASE_URL` overrides `infrastructure.postgres_url`
    /// - `OBSERVER_PORT` overrides `infrastructure.observer_port`
    /// - `MINDFOREST_USER_ID` overrides `session.user_id`
    fn apply_env_overrides(
        &mut self,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup("DATABASE_URL") {
            self.infrastructure.postgres_url = Some(url);
        }
        if let Some(port) = lookup("OBSERVER_PORT") {
            self.infrastructure.observer_port =
                port.parse().map_err(|e| ConfigError::Invalid {
                    reason: format!("OBSERVER_PORT {port:?}: {e}"),
                })?;
        }
        if let Some(id) = lookup("MINDFOREST_USER_ID") {
            let uuid = Uuid::parse_str(&id).map_err(|e| ConfigError::Invalid {
                reason: format!("MINDFOREST_USER_ID {id:?}: {e}"),
            })?;
            self.session.user_id = UserId(uuid);
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.growth.base_stage_duration_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "growth.base_stage_duration_ms must be at least 1".to_owned(),
            });
        }
        if self.growth.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "growth.tick_interval_ms must be at least 1".to_owned(),
            });
        }
        if self.growth.speed_boost_multiplier <= Decimal::ZERO {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "growth.speed_boost_multiplier must be positive, got {}",
                    self.growth.speed_boost_multiplier
                ),
            });
        }
        Ok(())
    }
}

/// Growth timing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GrowthConfig {
    /// Time spent in one stage at multiplier `1.0`, in milliseconds.
    #[serde(default = "default_base_stage_duration_ms")]
    pub base_stage_duration_ms: u64,

    /// Real-time milliseconds between growth ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Global duration factor while the speed boost is held.
    #[serde(default = "default_speed_boost_multiplier")]
    pub speed_boost_multiplier: Decimal,

    /// Fruit credited per harvest: `flat` or `species`.
    #[serde(default)]
    pub harvest_yield: HarvestYield,
}

impl GrowthConfig {
    /// The growth-engine view of this configuration.
    pub const fn settings(&self) -> GrowthSettings {
        GrowthSettings {
            base_stage_duration_ms: self.base_stage_duration_ms,
            speed_boost_multiplier: self.speed_boost_multiplier,
            harvest_yield: self.harvest_yield,
        }
    }
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            base_stage_duration_ms: default_base_stage_duration_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            speed_boost_multiplier: default_speed_boost_multiplier(),
            harvest_yield: HarvestYield::default(),
        }
    }
}

/// Community market configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarketConfig {
    /// Fruit offered to a new garden.
    #[serde(default = "starter_fruits")]
    pub fruits: Vec<CommunityFruit>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            fruits: starter_fruits(),
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Owner of the garden; keys all persisted rows.
    #[serde(default = "default_user_id")]
    pub user_id: UserId,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID,
        }
    }
}

/// Infrastructure connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// `PostgreSQL` connection URL. Without one the garden runs in memory.
    #[serde(default)]
    pub postgres_url: Option<String>,

    /// Maximum pooled database connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Address the HTTP API binds to.
    #[serde(default = "default_observer_host")]
    pub observer_host: String,

    /// Port the HTTP API binds to.
    #[serde(default = "default_observer_port")]
    pub observer_port: u16,
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            postgres_url: None,
            max_connections: default_max_connections(),
            observer_host: default_observer_host(),
            observer_port: default_observer_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_base_stage_duration_ms() -> u64 {
    DEFAULT_STAGE_DURATION_MS
}

const fn default_tick_interval_ms() -> u64 {
    2_000
}

const fn default_speed_boost_multiplier() -> Decimal {
    DEFAULT_SPEED_BOOST_MULTIPLIER
}

const fn default_user_id() -> UserId {
    DEFAULT_USER_ID
}

const fn default_max_connections() -> u32 {
    5
}

fn default_observer_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}
