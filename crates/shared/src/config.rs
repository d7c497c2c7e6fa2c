use thiserror::Error;
use url::Url;

use crate::config_env::{env_or, optional_trimmed_env};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_PROJECT_NAME: &str = "Chronos API";
const DEFAULT_SIMULATION_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";
const DEFAULT_AUDIO_MODEL: &str = "gemini-2.5-flash-preview-tts";

const ENV_FILES: [&str; 2] = [".env.local", ".env"];

/// Provider model identifiers, one per endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub simulation_model: String,
    pub image_model: String,
    pub audio_model: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            simulation_model: DEFAULT_SIMULATION_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            audio_model: DEFAULT_AUDIO_MODEL.to_string(),
        }
    }
}

impl ModelConfig {
    pub fn from_env() -> Self {
        Self {
            simulation_model: env_or("SIMULATION_MODEL", DEFAULT_SIMULATION_MODEL),
            image_model: env_or("IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
            audio_model: env_or("AUDIO_MODEL", DEFAULT_AUDIO_MODEL),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub project_name: String,
    /// Serialized origin of the browser client allowed to call the API.
    pub client_origin: Option<String>,
    pub models: ModelConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingVar(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let client_origin = optional_trimmed_env("CLIENT_URL")
            .map(|raw| parse_client_origin(&raw))
            .transpose()?;

        Ok(Self {
            bind_addr: env_or("API_BIND_ADDR", DEFAULT_BIND_ADDR),
            project_name: env_or("PROJECT_NAME", DEFAULT_PROJECT_NAME),
            client_origin,
            models: ModelConfig::from_env(),
        })
    }
}

/// Loads `.env.local` and then `.env` into the process environment.
///
/// Variables already set win over file values. Missing files are skipped;
/// the names of the files that were loaded are returned.
pub fn load_env_files() -> Vec<&'static str> {
    ENV_FILES
        .into_iter()
        .filter(|file| dotenvy::from_filename(file).is_ok())
        .collect()
}

pub(crate) fn parse_client_origin(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw).map_err(|err| {
        ConfigError::InvalidConfiguration(format!("CLIENT_URL is not a valid url: {err}"))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidConfiguration(
            "CLIENT_URL must start with http:// or https://".to_string(),
        ));
    }

    Ok(url.origin().ascii_serialization())
}
