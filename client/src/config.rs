//! Configuration management for the Sommelier client
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with SOMMELIER_ prefix

use std::collections::HashMap;
use std::time::Duration;

use config::{Environment, File};
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

/// Local development API origin
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Path prefix of every versioned endpoint
pub const API_PREFIX: &str = "/api/v1";
const DEFAULT_ENVIRONMENT: &str = "development";
const ENV_PREFIX: &str = "SOMMELIER";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid API URL '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },
}

/// Main client configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Current environment (development, production)
    pub environment: String,

    /// API origin, e.g. "http://localhost:8000"
    pub api_url: String,

    /// HTTP transport configuration
    pub http: HttpConfig,

    /// Notification channel configuration
    pub notifications: NotificationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    /// Notifications buffered per subscriber before the oldest are dropped
    pub capacity: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ClientConfig {
    /// Configuration with defaults for everything but the API origin
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            api_url: api_url.into(),
            http: HttpConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.http.timeout_secs = timeout_secs;
        self
    }

    pub fn with_notification_capacity(mut self, capacity: usize) -> Self {
        self.notifications.capacity = capacity;
        self
    }

    /// Load configuration from `.env`, files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let environment = std::env::var("SOMMELIER_ENVIRONMENT")
            .unwrap_or_else(|_| DEFAULT_ENVIRONMENT.into());
        Self::layered(&environment, Self::env_source())
    }

    /// Same layering as [`ClientConfig::load`], reading variables from
    /// `vars` instead of the process environment
    pub fn from_vars(environment: &str, vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::layered(environment, Self::env_source().source(Some(vars)))
    }

    fn env_source() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn layered(environment: &str, env: Environment) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment)?
            .set_default("api_url", defaults.api_url)?
            .set_default("http.timeout_secs", defaults.http.timeout_secs as i64)?
            .set_default("notifications.capacity", defaults.notifications.capacity as i64)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (SOMMELIER_ prefix)
            .add_source(env)
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidApiUrl {
            url: self.api_url.clone(),
            reason: reason.to_string(),
        };
        let url = Url::parse(&self.api_url).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        Ok(())
    }

    /// Base of every endpoint path, e.g. "http://localhost:8000/api/v1"
    pub fn api_base(&self) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), API_PREFIX)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }
}
