use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
const DEFAULT_CHANNEL_PATH: &str = "ws";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("invalid backend url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("backend url must use http or https, got `{0}`")]
    UnsupportedScheme(String),
}

/// Where the backend lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    base_url: Url,
    pub channel_path: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Supervisor calls run an agent server-side and answer slowly.
    pub action_timeout: Duration,
}

impl BackendSettings {
    pub fn new(base_url: &str) -> Result<Self, SettingsError> {
        let mut base_url = Url::parse(base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(SettingsError::UnsupportedScheme(base_url.scheme().to_string()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            channel_path: DEFAULT_CHANNEL_PATH.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            action_timeout: Duration::from_secs(300),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resource URL under the base; segments are percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Push channel address, with the scheme switched to `ws`/`wss`.
    pub fn channel_endpoint(&self) -> Url {
        let segments: Vec<&str> = self
            .channel_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        let mut url = self.endpoint(&segments);
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        // http(s) -> ws(s) stays within the special schemes and cannot fail.
        let _ = url.set_scheme(scheme);
        url
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BACKEND_URL).expect("default backend url is valid"),
            channel_path: DEFAULT_CHANNEL_PATH.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            action_timeout: Duration::from_secs(300),
        }
    }
}
