//! Runtime configuration loaded from the environment.
//!
//! A `Config` is built once at startup and handed by reference to whatever
//! needs it. Nothing here is global.

use std::path::Path;

use thiserror::Error;

/// Environment variable holding the Gemini API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Environment variable overriding the model name.
pub const MODEL_VAR: &str = "GEMINI_MODEL";

/// Environment variable overriding the API base URL.
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";

/// Model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// API base URL used when `GEMINI_BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The API key is absent or empty.
    #[error("GEMINI_API_KEY not found. Please set it in your environment or .env file.")]
    MissingApiKey,

    /// A settings file was named explicitly but could not be read.
    #[error("Failed to load settings file {path}: {source}")]
    SettingsFile {
        path: String,
        #[source]
        source: dotenvy::Error,
    },
}

/// Configuration shared by the model client and both front ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl Config {
    /// Creates a configuration from explicit values.
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    /// Reads configuration from variables already present in the process
    /// environment. Does not touch any `.env` file.
    pub fn from_env() -> Self {
        let api_key = std::env::var(API_KEY_VAR).ok();
        let model = non_empty_var(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url =
            non_empty_var(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self::new(api_key, model, base_url)
    }

    /// Loads `.env` from the working directory if one exists, then reads the
    /// environment. Variables already set in the process take precedence.
    pub fn load() -> Self {
        // Missing .env is fine
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    /// Loads a specific settings file, then reads the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::SettingsFile` if the file is missing or malformed.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        dotenvy::from_path(path).map_err(|source| ConfigError::SettingsFile {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_env())
    }

    /// Returns the API key, if one is configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Returns the API key or `ConfigError::MissingApiKey`.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key().ok_or(ConfigError::MissingApiKey)
    }

    /// Returns the configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the configured API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, DEFAULT_MODEL, DEFAULT_BASE_URL)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}
