//! Configuration file parser for ~/.config/wikifeed/config.toml.
//!
//! The file is optional; a missing file yields `Config::default()`.
//! Environment variables override the file for the backend address and
//! token, and the command line overrides both for the address.
use crate::api::DEFAULT_API_URL;
use crate::content::DEFAULT_ENDPOINT;
use crate::controller::{FeedSettings, INITIAL_BATCH, MORE_BATCH, PREFETCH_THRESHOLD};
use crate::theme::ThemeVariant;
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Overrides `api_url`.
pub const API_URL_ENV: &str = "WIKIFEED_API_URL";
/// Overrides `api_token`.
pub const API_TOKEN_ENV: &str = "WIKIFEED_API_TOKEN";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

/// Top-level application configuration.
///
/// Every key is optional. `api_token` is masked in `Debug` output.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL; `/api` is appended per call.
    pub api_url: Option<String>,

    /// Bearer token sent alongside the session cookie.
    pub api_token: Option<String>,

    /// MediaWiki `api.php` endpoint.
    pub content_api_url: String,

    pub initial_batch: usize,
    pub more_batch: usize,
    pub prefetch_threshold: u64,

    /// Per-request timeout for both Wikipedia and backend calls.
    pub request_timeout_secs: u64,

    /// "dark" or "light".
    pub theme: String,

    /// Keybinding overrides: action name to key string.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            api_token: None,
            content_api_url: DEFAULT_ENDPOINT.to_string(),
            initial_batch: INITIAL_BATCH,
            more_batch: MORE_BATCH,
            prefetch_threshold: PREFETCH_THRESHOLD,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            theme: "dark".to_string(),
            keybindings: HashMap::new(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("content_api_url", &self.content_api_url)
            .field("initial_batch", &self.initial_batch)
            .field("more_batch", &self.more_batch)
            .field("prefetch_threshold", &self.prefetch_threshold)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("theme", &self.theme)
            .field("keybindings", &self.keybindings)
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 9] = [
        "api_url",
        "api_token",
        "content_api_url",
        "initial_batch",
        "more_batch",
        "prefetch_threshold",
        "request_timeout_secs",
        "theme",
        "keybindings",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or blank file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)`
    /// - Unknown keys → accepted, logged as a warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parse TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        tracing::info!(
            api_url = ?config.api_url,
            content_api_url = %config.content_api_url,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Backend base URL: CLI flag, then environment, then file, then default.
    pub fn resolve_api_url(&self, cli: Option<&str>) -> String {
        let env = std::env::var(API_URL_ENV).ok();
        pick_api_url(cli, env.as_deref(), self.api_url.as_deref())
    }

    /// Bearer token: environment, then file.
    pub fn resolve_api_token(&self) -> Option<SecretString> {
        let env = std::env::var(API_TOKEN_ENV).ok();
        env.filter(|t| !t.trim().is_empty())
            .or_else(|| self.api_token.clone().filter(|t| !t.trim().is_empty()))
            .map(SecretString::from)
    }

    /// Controller tuning. Zero values fall back to the defaults.
    pub fn feed_settings(&self) -> FeedSettings {
        let defaults = FeedSettings::default();
        let or_default = |value: usize, default: usize, key: &str| {
            if value == 0 {
                tracing::warn!(key, "Zero is not a valid batch size, using default");
                default
            } else {
                value
            }
        };
        FeedSettings {
            initial_batch: or_default(self.initial_batch, defaults.initial_batch, "initial_batch"),
            more_batch: or_default(self.more_batch, defaults.more_batch, "more_batch"),
            prefetch_threshold: self.prefetch_threshold,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Configured theme; unknown names fall back to dark.
    pub fn theme_variant(&self) -> ThemeVariant {
        ThemeVariant::from_str_name(&self.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %self.theme, "Unknown theme, using dark");
            ThemeVariant::Dark
        })
    }
}

fn pick_api_url(cli: Option<&str>, env: Option<&str>, file: Option<&str>) -> String {
    [cli, env, file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())
        .unwrap_or(DEFAULT_API_URL)
        .to_string()
}
