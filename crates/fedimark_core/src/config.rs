//! Client configuration model and loading.
//!
//! # Responsibility
//! - Describe server, OAuth client and token settings for a directory client.
//! - Load them from JSON or YAML files and validate the minimum required set.
//!
//! # Invariants
//! - Secrets never appear in `Display`/log output; use `redacted()`.
//! - Unknown file extensions are rejected instead of guessed.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// User agent sent when the configuration does not override it.
pub const DEFAULT_USER_AGENT: &str = concat!("fedimark/", env!("CARGO_PKG_VERSION"));

const REDACTED: &str = "***";

/// Connection settings for a Mastodon-compatible server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL, e.g. `https://botsin.space`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub server: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub client_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub client_secret: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub client_name: String,
    /// Space separated OAuth scopes, e.g. `read write follow`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub scopes: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub website: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub redirect_uri: String,
    /// OAuth access token.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub token: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_agent: String,
}

/// Errors from loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
    Yaml(serde_yaml::Error),
    UnsupportedFormat(PathBuf),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Json(err) => write!(f, "invalid JSON config: {err}"),
            Self::Yaml(err) => write!(f, "invalid YAML config: {err}"),
            Self::UnsupportedFormat(path) => write!(
                f,
                "unsupported config format `{}`; expected .json, .yaml or .yml",
                path.display()
            ),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::Yaml(err) => Some(err),
            Self::UnsupportedFormat(_) | Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Yaml(value)
    }
}

impl Config {
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Loads and validates a config file; format follows the extension.
    ///
    /// # Errors
    /// - `UnsupportedFormat` for extensions other than `json`, `yaml`, `yml`.
    /// - `Io`, `Json`, `Yaml` for read/parse failures.
    /// - `Invalid` when `validate` fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_ascii_lowercase);
        let parse: fn(&str) -> Result<Self, ConfigError> = match extension.as_deref() {
            Some("json") => Self::from_json_str,
            Some("yaml" | "yml") => Self::from_yaml_str,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = parse(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the settings every directory client needs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let server = self.server.trim();
        if server.is_empty() {
            return Err(ConfigError::Invalid("server must not be empty".to_string()));
        }
        if !(server.starts_with("https://") || server.starts_with("http://")) {
            return Err(ConfigError::Invalid(format!(
                "server must be an http(s) URL, got `{server}`"
            )));
        }
        if self.token.trim().is_empty() {
            return Err(ConfigError::Invalid("token must not be empty".to_string()));
        }
        Ok(())
    }

    /// Configured user agent, or `DEFAULT_USER_AGENT`.
    pub fn user_agent(&self) -> &str {
        if self.user_agent.trim().is_empty() {
            DEFAULT_USER_AGENT
        } else {
            self.user_agent.as_str()
        }
    }

    /// Copy with `client_secret` and `token` masked.
    pub fn redacted(&self) -> Self {
        Self {
            client_secret: mask(&self.client_secret),
            token: mask(&self.token),
            ..self.clone()
        }
    }
}

fn mask(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        REDACTED.to_string()
    }
}
