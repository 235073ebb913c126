use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::core::matcher::DEFAULT_MAX_ROUNDS;
use crate::models::{ScoringWeights, TeamSizing};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    pub database: Option<DatabaseSettings>,
    pub supabase: Option<SupabaseSettings>,
    pub cache: Option<CacheSettings>,
    #[serde(default)]
    pub event: EventSettings,
    #[serde(default)]
    pub teams: TeamSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Which persistence backend holds the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
    Supabase,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
        }
    }
}

fn default_backend() -> StoreBackend { StoreBackend::Memory }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_participants_table")]
    pub participants_table: String,
    #[serde(default = "default_matches_table")]
    pub matches_table: String,
    #[serde(default = "default_teams_table")]
    pub teams_table: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_participants_table() -> String { "participants".to_string() }
fn default_matches_table() -> String { "matches".to_string() }
fn default_teams_table() -> String { "teams".to_string() }
fn default_timeout_secs() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub redis_url: String,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventSettings {
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u8,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
        }
    }
}

fn default_max_rounds() -> u8 { DEFAULT_MAX_ROUNDS }

#[derive(Debug, Clone, Deserialize)]
pub struct TeamSettings {
    #[serde(default = "default_target_size")]
    pub target_size: usize,
    #[serde(default = "default_min_size")]
    pub min_size: usize,
    #[serde(default = "default_max_size")]
    pub max_size: usize,
    /// Refuse team formation until the last round has been played
    #[serde(default = "default_require_final_round")]
    pub require_final_round: bool,
}

impl Default for TeamSettings {
    fn default() -> Self {
        Self {
            target_size: default_target_size(),
            min_size: default_min_size(),
            max_size: default_max_size(),
            require_final_round: default_require_final_round(),
        }
    }
}

impl TeamSettings {
    pub fn sizing(&self) -> TeamSizing {
        TeamSizing {
            target_size: self.target_size,
            min_size: self.min_size,
            max_size: self.max_size,
        }
    }
}

fn default_target_size() -> usize { 4 }
fn default_min_size() -> usize { 3 }
fn default_max_size() -> usize { 5 }
fn default_require_final_round() -> bool { true }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_mutual_help_weight")]
    pub mutual_help: f64,
    #[serde(default = "default_business_diversity_weight")]
    pub business_diversity: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            mutual_help: default_mutual_help_weight(),
            business_diversity: default_business_diversity_weight(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            mutual_help: config.mutual_help,
            business_diversity: config.business_diversity,
        }
    }
}

fn default_mutual_help_weight() -> f64 { 4.0 }
fn default_business_diversity_weight() -> f64 { 1.0 }

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Compact,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
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
fn default_log_format() -> LogFormat { LogFormat::Compact }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with NETEVENT__)
    ///
    /// `DATABASE_URL`, `SUPABASE_URL` and `SUPABASE_KEY` are honoured as well,
    /// since hosting platforms usually inject them under those names.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., NETEVENT__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        apply_platform_env(settings)?.try_deserialize()
    }

    /// Matcher weights in core form
    pub fn scoring_weights(&self) -> ScoringWeights {
        ScoringWeights::from(&self.scoring.weights)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("NETEVENT")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Override connection settings from the conventional platform variables
fn apply_platform_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", url)?;
    }
    if let Ok(url) = env::var("SUPABASE_URL") {
        builder = builder.set_override("supabase.url", url)?;
    }
    if let Ok(key) = env::var("SUPABASE_KEY") {
        builder = builder.set_override("supabase.api_key", key)?;
    }

    builder.build()
}
