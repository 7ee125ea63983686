use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    /// Persistence is disabled when absent
    #[serde(default)]
    pub database: Option<DatabaseSettings>,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_max_batch_size() -> usize { 5000 }
fn default_limit() -> u16 { 50 }
fn default_max_limit() -> u16 { 500 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_sector_weight")]
    pub sector: f64,
    #[serde(default = "default_stage_weight")]
    pub stage: f64,
    #[serde(default = "default_check_size_weight")]
    pub check_size: f64,
    #[serde(default = "default_geography_weight")]
    pub geography: f64,
    #[serde(default = "default_keywords_weight")]
    pub keywords: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            sector: default_sector_weight(),
            stage: default_stage_weight(),
            check_size: default_check_size_weight(),
            geography: default_geography_weight(),
            keywords: default_keywords_weight(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            sector: config.sector,
            stage: config.stage,
            check_size: config.check_size,
            geography: config.geography,
            keywords: config.keywords,
        }
    }
}

fn default_sector_weight() -> f64 { 30.0 }
fn default_stage_weight() -> f64 { 20.0 }
fn default_check_size_weight() -> f64 { 25.0 }
fn default_geography_weight() -> f64 { 10.0 }
fn default_keywords_weight() -> f64 { 15.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with THESIS_MATCH__)
    /// 5. DATABASE_URL, which enables persistence
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., THESIS_MATCH__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?;

        let settings = apply_database_url(settings, std::env::var("DATABASE_URL").ok())?;

        settings.try_deserialize::<Settings>()?.validated()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        settings.try_deserialize::<Settings>()?.validated()
    }

    /// Scoring weights as used by the matcher
    pub fn scoring_weights(&self) -> ScoringWeights {
        ScoringWeights::from(&self.scoring.weights)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        self.scoring_weights()
            .validate()
            .map_err(|e| ConfigError::Message(format!("scoring.weights: {}", e)))?;

        if self.matching.max_limit == 0 || self.matching.max_batch_size == 0 {
            return Err(ConfigError::Message(
                "matching.max_limit and matching.max_batch_size must be positive".to_string(),
            ));
        }

        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("THESIS_MATCH")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Override `database.url` when a DATABASE_URL is provided
fn apply_database_url(settings: Config, database_url: Option<String>) -> Result<Config, ConfigError> {
    match database_url {
        Some(url) => Config::builder()
            .add_source(settings)
            .set_override("database.url", url)?
            .build(),
        None => Ok(settings),
    }
}
