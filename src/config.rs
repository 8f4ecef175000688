//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file with a `DATABASE_URL`
//! environment variable override for the database location.

use serde::Deserialize;
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

use crate::batch::{SkipPolicy, DEFAULT_CHUNK_SIZE};
use crate::error::{ConfigError, Result};

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub job: JobConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database location. `DATABASE_URL` env var takes precedence.
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_database_url() -> String {
    "storebatch.db".into()
}

const fn default_pool_size() -> u32 {
    5
}

/// What a transform failure does to the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformFailurePolicy {
    #[default]
    Fail,
    Skip,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// Snapshots per atomic persist.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Persist attempts per chunk before the step fails.
    #[serde(default = "default_write_attempts")]
    pub write_attempts: u32,
    /// Transform failure handling.
    #[serde(default)]
    pub on_transform_error: TransformFailurePolicy,
    /// Maximum skipped items when `on_transform_error = "skip"`.
    #[serde(default)]
    pub skip_limit: u32,
}

const fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

const fn default_write_attempts() -> u32 {
    3
}

impl JobConfig {
    /// The configured policy as the engine's [`SkipPolicy`].
    #[must_use]
    pub fn skip_policy(&self) -> SkipPolicy {
        match self.on_transform_error {
            TransformFailurePolicy::Fail => SkipPolicy::FailFast,
            TransformFailurePolicy::Skip => SkipPolicy::Skip {
                limit: self.skip_limit,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            pool_size: default_pool_size(),
        }
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            write_attempts: default_write_attempts(),
            on_transform_error: TransformFailurePolicy::default(),
            skip_limit: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut config = Self {
            database: DatabaseConfig::default(),
            job: JobConfig::default(),
            logging: LoggingConfig::default(),
        };
        config.apply_env();
        config
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;

        let mut config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.apply_env();
        config.validate()?;

        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            return Err(ConfigError::MissingField { field: "database.url" }.into());
        }
        if self.database.pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.pool_size",
                reason: "must be positive".into(),
            }
            .into());
        }
        if self.job.chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "job.chunk_size",
                reason: "must be positive".into(),
            }
            .into());
        }
        if self.job.write_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "job.write_attempts",
                reason: "must be positive".into(),
            }
            .into());
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("unknown format '{}'", self.logging.format),
            }
            .into());
        }
        Ok(())
    }

    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}
