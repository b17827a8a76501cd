use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::google::calendar_api::DEFAULT_CALENDAR_BASE_URL;
use crate::google::gmail_api::DEFAULT_GMAIL_BASE_URL;
use crate::validation::is_email;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub google: GoogleConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Service-account credentials and the identity invitations are sent as.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoogleConfig {
    pub calendar_id: String,
    pub client_email: String,
    pub private_key: String,
    /// Delegated sender: organizer, From and Bcc of every invitation.
    pub subject: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub calendar_base_url: String,
    pub gmail_base_url: String,
    pub token_uri: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            calendar_base_url: DEFAULT_CALENDAR_BASE_URL.to_string(),
            gmail_base_url: DEFAULT_GMAIL_BASE_URL.to_string(),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Loads `path`, writing a template there first if nothing exists yet.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!("No config at {}, writing template", path.display());
            let config = Self::default();
            config.save(path)?;
            Ok(config)
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gcal-integration")
            .join("config.toml")
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let google = &self.google;

        if google.calendar_id.trim().is_empty() {
            return Err(ConfigError::Invalid("google.calendar_id must not be empty".to_string()));
        }
        if google.private_key.trim().is_empty() {
            return Err(ConfigError::Invalid("google.private_key must not be empty".to_string()));
        }
        if !is_email(&google.client_email) {
            return Err(ConfigError::Invalid(format!(
                "google.client_email is not an email address: '{}'",
                google.client_email
            )));
        }
        if !is_email(&google.subject) {
            return Err(ConfigError::Invalid(format!(
                "google.subject is not an email address: '{}'",
                google.subject
            )));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google: GoogleConfig {
                calendar_id: "primary".to_string(),
                client_email: String::new(),
                private_key: String::new(),
                subject: String::new(),
            },
            api: ApiConfig::default(),
        }
    }
}
