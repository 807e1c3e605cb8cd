//! Configuration management for the EcoGuardian server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with EG_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Sensor history database configuration
    pub database: DatabaseConfig,

    /// NASA POWER hourly data configuration
    pub nasa_power: NasaPowerConfig,

    /// Risk classification model configuration
    pub model: ModelConfig,

    /// Conversational assistant configuration
    pub assistant: AssistantConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL; the history store is disabled without one
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NasaPowerConfig {
    /// Hourly point endpoint
    pub base_url: String,

    /// NASA POWER user community
    pub community: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Path to the exported network artifact
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssistantConfig {
    /// Gemini API key
    pub api_key: Option<String>,

    /// Generative Language API base URL
    pub base_url: String,

    /// Models tried in order until one answers
    pub candidate_models: Vec<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl AssistantConfig {
    /// API key with whitespace and wrapping quotes removed, if any remains
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(|k| k.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
            .filter(|k| !k.is_empty())
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("EG_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default(
                "nasa_power.base_url",
                "https://power.larc.nasa.gov/api/temporal/hourly/point",
            )?
            .set_default("nasa_power.community", "SB")?
            .set_default("nasa_power.timeout_secs", 10)?
            .set_default("model.path", "models/rancha_model.json")?
            .set_default(
                "assistant.base_url",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default(
                "assistant.candidate_models",
                vec![
                    "models/gemini-1.5-flash",
                    "models/gemini-1.5-pro",
                    "models/gemini-pro",
                ],
            )?
            .set_default("assistant.timeout_secs", 30)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (EG_ prefix)
            .add_source(
                Environment::with_prefix("EG")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("assistant.candidate_models")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
