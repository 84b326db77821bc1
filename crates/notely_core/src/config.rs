//! Client configuration loaded from `notely.toml`.
//!
//! # Responsibility
//! - Describe where the notes backend lives and how the client behaves.
//! - Load from TOML with every field defaulted.
//!
//! # Invariants
//! - A missing or empty file is equivalent to `ClientConfig::default()`.
//! - `validate` must pass before the config is used to build collaborators.
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:3001"
//! timeout_ms = 10000
//!
//! [session]
//! storage_key = "loggedNoteappUser"
//! default_ttl_ms = 3600000
//!
//! [notifications]
//! ttl_ms = 5000
//!
//! [notes]
//! on_failure = "keep"
//!
//! [storage]
//! path = "notely.sqlite3"
//!
//! [logging]
//! level = "info"
//! dir = ""
//! ```

use crate::service::note_service::FailurePolicy;
use crate::service::session_service::DEFAULT_SESSION_KEY;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration load/validation failure.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Invalid(details) => write!(f, "invalid config: {details}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Top-level client configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub notes: NotesConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Lifetime stamped on sessions whose login reply carries no expiration.
    #[serde(default = "default_session_ttl_ms")]
    pub default_ttl_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            default_ttl_ms: default_session_ttl_ms(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_notification_ttl_ms")]
    pub ttl_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_notification_ttl_ms(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NotesConfig {
    #[serde(default)]
    pub on_failure: FailurePolicy,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file holding local storage. Relative paths resolve against the
    /// config file's directory.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level_name")]
    pub level: String,
    /// Absolute directory for rolling log files. Empty disables file logging.
    #[serde(default)]
    pub dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level_name(),
            dir: String::new(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_storage_key() -> String {
    DEFAULT_SESSION_KEY.to_string()
}

fn default_session_ttl_ms() -> u64 {
    60 * 60 * 1000
}

fn default_notification_ttl_ms() -> u64 {
    5000
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("notely.sqlite3")
}

fn default_log_level_name() -> String {
    crate::logging::default_log_level().to_string()
}

impl ClientConfig {
    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "notely.toml"
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Loads and validates the config at `path`; a missing file yields defaults.
    ///
    /// A relative `storage.path` is rebased onto the config file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if config.storage.path.is_relative() {
            if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                config.storage.path = parent.join(&config.storage.path);
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::Invalid("api.base_url cannot be empty".into()));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api.base_url must start with http:// or https://, got `{base_url}`"
            )));
        }
        if self.api.timeout_ms == 0 {
            return Err(ConfigError::Invalid("api.timeout_ms must be > 0".into()));
        }
        if self.notifications.ttl_ms == 0 {
            return Err(ConfigError::Invalid(
                "notifications.ttl_ms must be > 0".into(),
            ));
        }
        if self.session.default_ttl_ms == 0 {
            return Err(ConfigError::Invalid(
                "session.default_ttl_ms must be > 0".into(),
            ));
        }
        if self.session.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "session.storage_key cannot be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.api.timeout_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notifications.ttl_ms)
    }

    pub fn session_default_ttl(&self) -> Duration {
        Duration::from_millis(self.session.default_ttl_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientConfig, ConfigError};
    use crate::service::note_service::FailurePolicy;

    #[test]
    fn empty_document_is_default() {
        let config = ClientConfig::from_toml("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.notifications.ttl_ms, 5000);
        assert_eq!(config.session.storage_key, "loggedNoteappUser");
        assert_eq!(config.notes.on_failure, FailurePolicy::Keep);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = ClientConfig::from_toml(
            "[api]\nbase_url = \"https://notes.example.com\"\n\n[notes]\non_failure = \"evict\"\n",
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://notes.example.com");
        assert_eq!(config.api.timeout_ms, 10_000);
        assert_eq!(config.notes.on_failure, FailurePolicy::Evict);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = ClientConfig::default();
        config.api.base_url = "ftp://x".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ClientConfig::default();
        config.notifications.ttl_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unknown_failure_policy_is_a_parse_error() {
        let err = ClientConfig::from_toml("[notes]\non_failure = \"retry\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn toml_round_trip_preserves_values() {
        let mut config = ClientConfig::default();
        config.api.base_url = "http://127.0.0.1:9000".into();
        let text = config.to_toml().unwrap();
        assert_eq!(ClientConfig::from_toml(&text).unwrap(), config);
    }
}
