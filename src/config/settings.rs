//! Environment settings
//!
//! Loads the base client configuration and logging options from the environment

use super::magic::{MagicConfig, DEFAULT_API_URL, DEFAULT_RETRIES};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Settings read from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Client configuration
    pub client: ClientSettings,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Service base URL
    pub api_url: String,
    /// OpenAI key forwarded to the service (optional)
    pub openai_key: Option<String>,
    /// Templates database for `run` (optional)
    pub templates_database_id: Option<String>,
    /// Upvotes database (optional)
    pub upvotes_database_id: Option<String>,
    /// Postprocess retry budget
    pub retries: u32,
    /// HTTP request timeout in seconds
    pub timeout: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the environment
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let settings = Self {
            client: ClientSettings {
                api_url: get_env_or_default("MAGIC_API_URL", DEFAULT_API_URL),
                openai_key: get_env_optional("OPENAI_KEY"),
                templates_database_id: get_env_optional("MAGIC_TEMPLATES_DB_ID"),
                upvotes_database_id: get_env_optional("MAGIC_UPVOTES_DB_ID"),
                retries: get_env_or_default("MAGIC_RETRIES", &DEFAULT_RETRIES.to_string())
                    .parse()
                    .context("Invalid retries value")?,
                timeout: get_env_or_default("MAGIC_TIMEOUT", "60")
                    .parse()
                    .context("Invalid timeout value")?,
            },
            logging: LoggingConfig {
                level: get_env_or_default("RUST_LOG", "info"),
                format: get_env_or_default("LOG_FORMAT", "text"),
            },
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    pub fn validate(&self) -> Result<()> {
        if !self.client.api_url.starts_with("http") {
            anyhow::bail!("Invalid API URL format, should start with 'http'");
        }

        if let Some(key) = &self.client.openai_key {
            if key.contains(char::is_whitespace) {
                anyhow::bail!("OpenAI key cannot contain whitespace characters");
            }
        }

        if self.client.timeout == 0 {
            anyhow::bail!("Timeout value cannot be 0");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }

    /// Base client configuration built from these settings
    pub fn to_magic_config(&self) -> MagicConfig {
        MagicConfig {
            api_url: Some(self.client.api_url.clone()),
            openai_key: self.client.openai_key.clone(),
            templates_database_id: self.client.templates_database_id.clone(),
            upvotes_database_id: self.client.upvotes_database_id.clone(),
            retries: Some(self.client.retries),
            ..MagicConfig::default()
        }
    }
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a non-empty environment variable
fn get_env_optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
