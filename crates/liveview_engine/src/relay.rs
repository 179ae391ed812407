use liveview_core::{ChatContent, OutgoingMessage, Sender};
use liveview_logging::{live_debug, live_error};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::fetch::{build_client, map_reqwest_error};
use crate::{BackendSettings, FailureKind, FetchError};

#[derive(Debug, Serialize)]
struct MessageBody<'a> {
    client_id: &'a str,
    conversation_id: &'a str,
    text: Option<&'a str>,
    #[serde(rename = "audioUrl")]
    audio_url: Option<&'a str>,
    #[serde(rename = "audioDuration")]
    audio_duration: Option<u32>,
    sender: Sender,
    #[serde(rename = "type")]
    kind: &'static str,
}

impl<'a> From<&'a OutgoingMessage> for MessageBody<'a> {
    fn from(message: &'a OutgoingMessage) -> Self {
        let (text, audio_url, audio_duration) = match &message.content {
            ChatContent::Text(text) => (Some(text.as_str()), None, None),
            ChatContent::Audio { url, duration_secs } => {
                (None, Some(url.as_str()), Some(*duration_secs))
            }
        };
        Self {
            client_id: &message.client_id,
            conversation_id: &message.conversation_id,
            text,
            audio_url,
            audio_duration,
            sender: Sender::Me,
            kind: message.content.kind(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SupervisorBody<'a> {
    message: &'a str,
}

/// Write side of the backend. The spawning entry points are fire-and-forget:
/// failures are logged and never reach the page state.
#[derive(Debug, Clone)]
pub struct ActionRelay {
    settings: BackendSettings,
    client: reqwest::Client,
    runtime: Handle,
}

impl ActionRelay {
    pub fn new(settings: BackendSettings, runtime: Handle) -> Result<Self, FetchError> {
        let client = build_client(&settings, settings.action_timeout)?;
        Ok(Self {
            settings,
            client,
            runtime,
        })
    }

    pub fn submit_message(&self, message: OutgoingMessage) -> JoinHandle<()> {
        let relay = self.clone();
        self.runtime.spawn(async move {
            if let Err(err) = relay.post_message(&message).await {
                live_error!("Submitting chat message failed: {}", err);
            }
        })
    }

    pub fn call_supervisor(&self, summary: String) -> JoinHandle<()> {
        let relay = self.clone();
        self.runtime.spawn(async move {
            if let Err(err) = relay.post_summary(&summary).await {
                live_error!("Supervisor call failed: {}", err);
            }
        })
    }

    /// `POST /messages`.
    pub async fn post_message(&self, message: &OutgoingMessage) -> Result<(), FetchError> {
        self.post(&["messages"], &MessageBody::from(message)).await
    }

    /// `POST /call_supervisor`.
    pub async fn post_summary(&self, summary: &str) -> Result<(), FetchError> {
        self.post(&["call_supervisor"], &SupervisorBody { message: summary })
            .await
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<(), FetchError> {
        let url = self.settings.endpoint(segments);
        live_debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
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
        Ok(())
    }
}
