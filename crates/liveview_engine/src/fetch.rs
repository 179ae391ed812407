use std::time::Duration;

use liveview_core::{ChatMessage, Notification, Task};
use liveview_logging::live_warn;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{BackendSettings, FailureKind, FetchError};

/// Read side of the backend: one call per list resource.
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    async fn tasks(&self) -> Result<Vec<Task>, FetchError>;

    async fn notifications(&self) -> Result<Vec<Notification>, FetchError>;

    async fn messages(
        &self,
        user_id: u64,
        conversation_id: &str,
    ) -> Result<Vec<ChatMessage>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestSource {
    settings: BackendSettings,
    client: reqwest::Client,
}

impl ReqwestSource {
    pub fn new(settings: BackendSettings) -> Result<Self, FetchError> {
        let client = build_client(&settings, settings.request_timeout)?;
        Ok(Self { settings, client })
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        field: &'static str,
    ) -> Result<Vec<T>, FetchError> {
        let url = self.settings.endpoint(segments);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let body: Value = serde_json::from_slice(&body)
            .map_err(|err| FetchError::new(FailureKind::MalformedBody, err.to_string()))?;
        decode_list(body, field)
    }
}

#[async_trait::async_trait]
impl RecordSource for ReqwestSource {
    async fn tasks(&self) -> Result<Vec<Task>, FetchError> {
        self.fetch_list(&["tasks"], "tasks").await
    }

    async fn notifications(&self) -> Result<Vec<Notification>, FetchError> {
        self.fetch_list(&["notifications"], "notifications").await
    }

    async fn messages(
        &self,
        user_id: u64,
        conversation_id: &str,
    ) -> Result<Vec<ChatMessage>, FetchError> {
        let user_id = user_id.to_string();
        self.fetch_list(&["messages", user_id.as_str(), conversation_id], "messages")
            .await
    }
}

/// Pulls the named top-level array out of a response body. Records that do
/// not match the schema are logged and skipped; the rest are kept in order.
pub(crate) fn decode_list<T: DeserializeOwned>(
    body: Value,
    field: &'static str,
) -> Result<Vec<T>, FetchError> {
    let Value::Object(mut object) = body else {
        return Err(FetchError::new(
            FailureKind::MalformedBody,
            "expected a JSON object",
        ));
    };
    let Some(Value::Array(items)) = object.remove(field) else {
        return Err(FetchError::new(
            FailureKind::MalformedBody,
            format!("missing `{field}` array"),
        ));
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value(item) {
            Ok(record) => records.push(record),
            Err(err) => live_warn!("Skipping malformed {} record #{}: {}", field, index, err),
        }
    }
    Ok(records)
}

pub(crate) fn build_client(
    settings: &BackendSettings,
    timeout: Duration,
) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(timeout)
        .build()
        .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return FetchError::new(FailureKind::InvalidUrl, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
