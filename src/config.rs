use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::{domain, MatchWeights};
use crate::services::RecordTables;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub tables: TableSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub performance: PerformanceSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Hosted backend REST gateway
#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    pub endpoint: String,
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    pub events: String,
    pub service_requirements: String,
    pub business_profiles: String,
    pub contractor_services: String,
    pub jobs: String,
    pub ab_tests: String,
    pub ab_test_results: String,
}

impl Default for TableSettings {
    fn default() -> Self {
        let tables = RecordTables::default();
        Self {
            events: tables.events,
            service_requirements: tables.service_requirements,
            business_profiles: tables.business_profiles,
            contractor_services: tables.contractor_services,
            jobs: tables.jobs,
            ab_tests: tables.ab_tests,
            ab_test_results: tables.ab_test_results,
        }
    }
}

impl From<TableSettings> for RecordTables {
    fn from(value: TableSettings) -> Self {
        Self {
            events: value.events,
            service_requirements: value.service_requirements,
            business_profiles: value.business_profiles,
            contractor_services: value.contractor_services,
            jobs: value.jobs,
            ab_tests: value.ab_tests,
            ab_test_results: value.ab_test_results,
        }
    }
}

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
    #[serde(default)]
    pub weights: WeightsConfig,
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            weights: WeightsConfig::default(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_limit() -> u16 { 20 }
fn default_max_limit() -> u16 { 100 }

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_base_weight")]
    pub base: f64,
    #[serde(default = "default_category_weight")]
    pub category_overlap: f64,
    #[serde(default = "default_rating_weight")]
    pub rating: f64,
    #[serde(default = "default_review_weight")]
    pub review_volume: f64,
    #[serde(default = "default_location_weight")]
    pub location: f64,
    #[serde(default = "default_review_saturation")]
    pub review_saturation: u32,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            base: default_base_weight(),
            category_overlap: default_category_weight(),
            rating: default_rating_weight(),
            review_volume: default_review_weight(),
            location: default_location_weight(),
            review_saturation: default_review_saturation(),
        }
    }
}

impl From<&WeightsConfig> for MatchWeights {
    fn from(value: &WeightsConfig) -> Self {
        Self {
            base: value.base.max(0.0),
            category_overlap: value.category_overlap.max(0.0),
            rating: value.rating.max(0.0),
            review_volume: value.review_volume.max(0.0),
            location: value.location.max(0.0),
            review_saturation: value.review_saturation,
        }
    }
}

fn default_base_weight() -> f64 { domain::BASE_SCORE }
fn default_category_weight() -> f64 { domain::CATEGORY_OVERLAP_WEIGHT }
fn default_rating_weight() -> f64 { domain::RATING_WEIGHT }
fn default_review_weight() -> f64 { domain::REVIEW_VOLUME_WEIGHT }
fn default_location_weight() -> f64 { domain::LOCATION_BONUS }
fn default_review_saturation() -> u32 { domain::REVIEW_SATURATION }

/// Which estimator fills in missing response time / satisfaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimatorKind {
    /// Leave missing metrics empty
    None,
    /// Random values, for demo and staging deployments only
    Placeholder,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PerformanceSettings {
    #[serde(default = "default_estimator")]
    pub estimator: EstimatorKind,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            estimator: default_estimator(),
        }
    }
}

fn default_estimator() -> EstimatorKind { EstimatorKind::None }

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, e.g. `info` or `event_match=debug,actix_web=info`
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
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
fn default_log_format() -> LogFormat { LogFormat::Json }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with EVENTMATCH__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., EVENTMATCH__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("EVENTMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = apply_env_overrides(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("EVENTMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn match_weights(&self) -> MatchWeights {
        MatchWeights::from(&self.matching.weights)
    }
}

/// Apply the conventional deployment variables on top of the layered config
///
/// `DATABASE_URL`, `BACKEND_URL`, `BACKEND_SERVICE_KEY`, `LOG_LEVEL` and
/// `LOG_FORMAT` win over file values when present.
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(endpoint) = env::var("BACKEND_URL") {
        builder = builder.set_override("backend.endpoint", endpoint)?;
    }
    if let Ok(api_key) = env::var("BACKEND_SERVICE_KEY") {
        builder = builder.set_override("backend.api_key", api_key)?;
    }
    if let Ok(level) = env::var("LOG_LEVEL") {
        builder = builder.set_override("logging.level", level)?;
    }
    if let Ok(format) = env::var("LOG_FORMAT") {
        builder = builder.set_override("logging.format", format.to_lowercase())?;
    }

    builder.build()
}
