//! Push channel: one WebSocket per page, carrying subject-only triggers.
//!
//! The channel never reconnects by itself. A failed connect or a dropped
//! connection leaves it closed for the rest of the page's life.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use liveview_core::Trigger;
use liveview_logging::{live_debug, live_info, live_warn};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::DispatchTable;

/// Why a channel ended without the page asking for it.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("connect failed: {0}")]
    Connect(#[source] tungstenite::Error),
    #[error("closed by peer{}", peer_reason(.0))]
    ClosedByPeer(Option<String>),
    #[error("stream error: {0}")]
    Stream(#[source] tungstenite::Error),
    #[error("stream ended")]
    StreamEnded,
}

fn peer_reason(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|reason| format!(" ({reason})"))
        .unwrap_or_default()
}

/// Lifecycle callbacks of one channel.
pub trait ChannelObserver: Send + Sync {
    fn on_open(&self);

    /// Called for every well-formed trigger, before it is dispatched.
    fn on_message(&self, trigger: &Trigger);

    /// Called exactly once when the channel ends, with the cause unless the
    /// page closed it.
    fn on_close(&self, error: Option<&ChannelError>);
}

/// Owns the background task of one open channel. Dropping the handle closes
/// the channel, so it cannot outlive its page.
pub struct ChannelHandle {
    endpoint: Url,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ChannelHandle {
    pub fn open(
        runtime: &Handle,
        endpoint: Url,
        dispatch: Arc<DispatchTable>,
        observer: Arc<dyn ChannelObserver>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let task = runtime.spawn(run_channel(
            endpoint.clone(),
            cancel.clone(),
            dispatch,
            observer,
        ));
        Self {
            endpoint,
            cancel,
            task: Some(task),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Releases the connection. The returned task completes once the close
    /// handshake was attempted and the observer was told.
    pub fn close(mut self) -> Option<JoinHandle<()>> {
        self.cancel.cancel();
        self.task.take()
    }
}

impl Drop for ChannelHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_channel(
    endpoint: Url,
    cancel: CancellationToken,
    dispatch: Arc<DispatchTable>,
    observer: Arc<dyn ChannelObserver>,
) {
    let connected = tokio::select! {
        _ = cancel.cancelled() => {
            observer.on_close(None);
            return;
        }
        result = connect_async(endpoint.as_str()) => result,
    };
    let (stream, _) = match connected {
        Ok(connected) => connected,
        Err(err) => {
            let error = ChannelError::Connect(err);
            live_warn!("Channel {}: {}", endpoint, error);
            observer.on_close(Some(&error));
            return;
        }
    };

    live_info!("Channel open: {}", endpoint);
    observer.on_open();

    let (mut outgoing, mut incoming) = stream.split();
    let reason = loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = outgoing.send(Message::Close(None)).await;
                break None;
            }
            frame = incoming.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    handle_frame(text.as_str(), &dispatch, observer.as_ref());
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|frame| frame.reason.as_str().to_string())
                        .filter(|reason| !reason.is_empty());
                    break Some(ChannelError::ClosedByPeer(reason));
                }
                // Binary frames carry nothing for us; ping/pong is answered
                // by the library.
                Some(Ok(_)) => {}
                Some(Err(err)) => break Some(ChannelError::Stream(err)),
                None => break Some(ChannelError::StreamEnded),
            }
        }
    };

    match &reason {
        Some(error) => live_warn!("Channel {} closed: {}", endpoint, error),
        None => live_info!("Channel {} closed by page", endpoint),
    }
    observer.on_close(reason.as_ref());
}

fn handle_frame(text: &str, dispatch: &DispatchTable, observer: &dyn ChannelObserver) {
    match Trigger::parse(text) {
        Ok(trigger) => {
            live_debug!("Trigger received: {}", trigger.subject);
            observer.on_message(&trigger);
            dispatch.dispatch(&trigger);
        }
        Err(err) => live_warn!("Dropping malformed channel frame: {}", err),
    }
}
