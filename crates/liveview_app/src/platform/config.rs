use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use liveview_core::{Identity, DEFAULT_CONVERSATION_ID};
use liveview_engine::{BackendSettings, SettingsError, DEFAULT_BACKEND_URL};
use liveview_logging::{live_info, live_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::LogDestination;

pub const CONFIG_FILENAME: &str = "liveview.ron";

const ENV_BACKEND_URL: &str = "LIVEVIEW_BACKEND_URL";
const ENV_USER_ID: &str = "LIVEVIEW_USER_ID";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("LIVEVIEW_USER_ID must be a positive integer, got `{0}`")]
    InvalidUserId(String),
}

/// Contents of `liveview.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    pub user_id: u64,
    pub conversation_id: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub log: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        let identity = Identity::default();
        let settings = BackendSettings::default();
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            user_id: identity.user_id,
            conversation_id: identity.conversation_id,
            connect_timeout_ms: duration_ms(settings.connect_timeout),
            request_timeout_ms: duration_ms(settings.request_timeout),
            log: LogDestination::default(),
        }
    }
}

impl AppConfig {
    /// Applies `LIVEVIEW_BACKEND_URL` and `LIVEVIEW_USER_ID` from `lookup`.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup(ENV_BACKEND_URL).filter(|url| !url.trim().is_empty()) {
            self.backend_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_USER_ID) {
            self.user_id = match raw.trim().parse::<u64>() {
                Ok(user_id) if user_id > 0 => user_id,
                _ => return Err(ConfigError::InvalidUserId(raw)),
            };
        }
        Ok(())
    }

    pub fn identity(&self) -> Identity {
        let conversation_id = if self.conversation_id.trim().is_empty() {
            DEFAULT_CONVERSATION_ID.to_string()
        } else {
            self.conversation_id.clone()
        };
        Identity {
            user_id: self.user_id,
            conversation_id,
        }
    }

    pub fn backend_settings(&self) -> Result<BackendSettings, SettingsError> {
        let mut settings = BackendSettings::new(&self.backend_url)?;
        settings.connect_timeout = Duration::from_millis(self.connect_timeout_ms);
        settings.request_timeout = Duration::from_millis(self.request_timeout_ms);
        Ok(settings)
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Loads the config file, falling back to defaults when it is missing or
/// unreadable.
pub fn load_config(path: &Path) -> AppConfig {
    match read_config(path) {
        Ok(Some(config)) => {
            live_info!("Loaded config from {:?}", path);
            config
        }
        Ok(None) => AppConfig::default(),
        Err(err) => {
            live_warn!("{}; using defaults", err);
            AppConfig::default()
        }
    }
}

fn read_config(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    ron::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}
