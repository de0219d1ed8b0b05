//! Application configuration module
//!
//! Server settings are read from an optional TOML file and then overridden by
//! environment variables. The binary loads a `.env` file first, so the same
//! variables can live there during development.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Default delete-for-everyone window: four hours
pub const DEFAULT_DELETE_WINDOW_SECS: u64 = 4 * 60 * 60;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// PostgreSQL URL; the in-memory store is used when absent
    pub database_url: Option<String>,
    /// HS256 secret shared with the authentication service
    pub jwt_secret: String,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
    /// Upload endpoint of the image storage service
    pub image_upload_url: Option<String>,
    /// Upload preset sent along with each image
    pub image_upload_preset: Option<String>,
    /// How long after creation a sender may delete for everyone
    pub delete_for_everyone_window_secs: u64,
    /// Maximum message length in characters
    pub max_message_length: usize,
    /// Capacity of the directory-wide event channel
    pub event_buffer: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: None,
            jwt_secret: String::new(),
            cors_origins: vec!["http://localhost:5173".to_string()],
            image_upload_url: None,
            image_upload_preset: None,
            delete_for_everyone_window_secs: DEFAULT_DELETE_WINDOW_SECS,
            max_message_length: 4000,
            event_buffer: 1000,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and parse a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Load configuration from `DMCHAT_CONFIG` (if set) and the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match std::env::var("DMCHAT_CONFIG") {
            Ok(path) => Self::from_toml_file(path)?,
            Err(_) => Self::default(),
        };
        let config = base.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides on top of `self`
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(host) = env_var("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = env_var("SERVER_PORT") {
            self.port = parse_var("SERVER_PORT", &port)?;
        }
        if let Some(url) = env_var("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(secret) = env_var("JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Some(origins) = env_var("CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
        }
        if let Some(url) = env_var("IMAGE_UPLOAD_URL") {
            self.image_upload_url = Some(url);
        }
        if let Some(preset) = env_var("IMAGE_UPLOAD_PRESET") {
            self.image_upload_preset = Some(preset);
        }
        if let Some(secs) = env_var("DELETE_FOR_EVERYONE_WINDOW_SECS") {
            self.delete_for_everyone_window_secs =
                parse_var("DELETE_FOR_EVERYONE_WINDOW_SECS", &secs)?;
        }
        if let Some(len) = env_var("MAX_MESSAGE_LENGTH") {
            self.max_message_length = parse_var("MAX_MESSAGE_LENGTH", &len)?;
        }
        if let Some(buffer) = env_var("EVENT_BUFFER") {
            self.event_buffer = parse_var("EVENT_BUFFER", &buffer)?;
        }
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingValue("JWT_SECRET"));
        }
        if self.max_message_length == 0 {
            return Err(ConfigError::InvalidValue {
                key: "MAX_MESSAGE_LENGTH",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.event_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                key: "EVENT_BUFFER",
                message: "must be greater than zero".to_string(),
            });
        }
        if let Some(url) = &self.image_upload_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        Ok(())
    }

    /// `host:port` string to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        message: format!("cannot parse '{}'", value),
    })
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.jwt_secret = secret.into();
        self
    }

    pub fn cors_origins(mut self, origins: Vec<String>) -> Self {
        self.config.cors_origins = origins;
        self
    }

    pub fn image_upload_url(mut self, url: impl Into<String>) -> Self {
        self.config.image_upload_url = Some(url.into());
        self
    }

    pub fn delete_for_everyone_window_secs(mut self, secs: u64) -> Self {
        self.config.delete_for_everyone_window_secs = secs;
        self
    }

    pub fn max_message_length(mut self, len: usize) -> Self {
        self.config.max_message_length = len;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
    #[error("failed to parse config file: {0}")]
    Parse(String),
    #[error("failed to read config file: {0}")]
    Io(String),
}
