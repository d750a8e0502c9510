//! Startup configuration for the chat server.
//!
//! Everything is resolved once, before the server accepts input:
//! - The API key comes from the JSON secrets file, then from the environment.
//! - Endpoint, model catalog, port and static directory come from `FUTEE_*`
//!   environment variables, with defaults.

use core::fmt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

use crate::chat::catalog::ModelCatalog;
use crate::llm::groq_client::GROQ_API_URL;

/// Name of the API key, both in the secrets file and in the environment.
pub const API_KEY_VAR: &str = "GROQ_API_KEY";
/// Environment variable pointing at the JSON secrets file.
pub const SECRETS_FILE_ENV: &str = "FUTEE_SECRETS_FILE";
/// Secrets file used when [`SECRETS_FILE_ENV`] is unset.
pub const DEFAULT_SECRETS_FILE: &str = ".futee/secrets.json";
/// Environment variable overriding the completion endpoint.
pub const API_URL_ENV: &str = "FUTEE_API_URL";
/// Environment variable holding extra models as `Label=id;Label=id`.
pub const MODELS_ENV: &str = "FUTEE_MODELS";
/// Environment variable for the listening port.
pub const PORT_ENV: &str = "FUTEE_PORT";
/// Environment variable for the static files directory.
pub const STATIC_DIR_ENV: &str = "FUTEE_STATIC_DIR";
/// Default listening port.
pub const DEFAULT_PORT: u16 = 8501;
/// Default static files directory.
pub const DEFAULT_STATIC_DIR: &str = "static";
/// Where to get a key when none is configured.
pub const API_KEY_HELP_URL: &str = "https://console.groq.com/keys";

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No API key in the secrets file nor in the environment.
    #[error("API key not found: add {var} to the secrets file or the environment")]
    MissingApiKey {
        /// Name of the missing variable.
        var: &'static str,
    },
    /// The secrets file exists but cannot be read.
    #[error("cannot read secrets file {path}: {source}")]
    SecretsRead {
        /// Path of the secrets file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The secrets file is not a JSON object.
    #[error("malformed secrets file {path}: {source}")]
    SecretsParse {
        /// Path of the secrets file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// The completion endpoint is not a valid URL.
    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The models list could not be parsed.
    #[error("invalid models list: {0}")]
    InvalidModels(String),
    /// The port is not a valid `u16`.
    #[error("invalid port: {0}")]
    InvalidPort(String),
    /// The model catalog has no entries.
    #[error("model catalog is empty")]
    EmptyCatalog,
}

/// Convenience result alias for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Bearer credential for the completion API. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Raw key, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Resolved configuration of the chat server.
#[derive(Clone, Debug)]
pub struct ChatConfig {
    /// Chat-completions endpoint.
    pub api_url: String,
    /// Bearer credential.
    pub api_key: ApiKey,
    /// Selectable models; the first one is the default.
    pub models: ModelCatalog,
    /// Listening port.
    pub port: u16,
    /// Directory served at `/`.
    pub static_dir: PathBuf,
}

impl ChatConfig {
    /// Configuration with default settings around `api_key`.
    #[must_use]
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_url: GROQ_API_URL.to_string(),
            api_key,
            models: ModelCatalog::default(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }

    /// Set the completion endpoint.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set the model catalog.
    #[must_use]
    pub fn with_models(mut self, models: ModelCatalog) -> Self {
        self.models = models;
        self
    }

    /// Set the listening port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the static files directory.
    #[must_use]
    pub fn with_static_dir(mut self, static_dir: impl Into<PathBuf>) -> Self {
        self.static_dir = static_dir.into();
        self
    }

    /// Resolve configuration from the process environment and secrets file.
    ///
    /// # Errors
    /// Returns an error if the key is missing or any setting is malformed.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration through `lookup`, which plays the environment.
    ///
    /// # Errors
    /// Returns an error if the key is missing or any setting is malformed.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secrets_path = lookup(SECRETS_FILE_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_SECRETS_FILE), PathBuf::from);
        let secrets = read_secrets(&secrets_path)?;

        let api_key = secrets
            .get(API_KEY_VAR)
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .and_then(non_blank)
            .or_else(|| lookup(API_KEY_VAR).and_then(non_blank))
            .ok_or(ConfigError::MissingApiKey { var: API_KEY_VAR })?;

        let mut config = Self::new(ApiKey::new(api_key));

        if let Some(url) = lookup(API_URL_ENV).and_then(non_blank) {
            config = config.with_api_url(url);
        }
        if let Some(models) = lookup(MODELS_ENV).and_then(non_blank) {
            config = config.with_models(parse_models(&models)?);
        }
        if let Some(port) = lookup(PORT_ENV).and_then(non_blank) {
            let port = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;
            config = config.with_port(port);
        }
        if let Some(dir) = lookup(STATIC_DIR_ENV).and_then(non_blank) {
            config = config.with_static_dir(dir);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the catalog is empty.
    pub fn validate(&self) -> ConfigResult<()> {
        Url::parse(&self.api_url)?;
        if self.models.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        Ok(())
    }
}

/// Parse `Label=id;Label=id` into a catalog, keeping the given order.
///
/// # Errors
/// Returns an error if an entry is not `label=id` or the list is empty.
pub fn parse_models(raw: &str) -> ConfigResult<ModelCatalog> {
    let mut catalog = ModelCatalog::empty();
    for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let (label, id) = entry
            .split_once('=')
            .map(|(l, i)| (l.trim(), i.trim()))
            .filter(|(l, i)| !l.is_empty() && !i.is_empty())
            .ok_or_else(|| ConfigError::InvalidModels(format!("expected `label=id`, got `{entry}`")))?;
        catalog = catalog.with_model(label, id);
    }

    if catalog.is_empty() {
        return Err(ConfigError::EmptyCatalog);
    }
    Ok(catalog)
}

// Only the key entry is read; other entries may hold any JSON value.
fn read_secrets(path: &Path) -> ConfigResult<HashMap<String, serde_json::Value>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(source) => {
            return Err(ConfigError::SecretsRead {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&raw).map_err(|source| ConfigError::SecretsParse {
        path: path.to_path_buf(),
        source,
    })
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}
