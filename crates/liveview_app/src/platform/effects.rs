use std::sync::mpsc;
use std::thread;

use liveview_core::{Effect, Identity, Msg, PageKind};
use liveview_engine::{BackendSettings, SyncError, SyncEvent, SyncEvents, SyncHandle};
use liveview_logging::{live_debug, live_info, live_warn};

/// Carries effects from the pure update loop into the synchronizer and
/// feeds its events back as messages.
pub struct EffectRunner {
    sync: SyncHandle,
}

impl EffectRunner {
    pub fn new(
        settings: BackendSettings,
        kind: PageKind,
        identity: Identity,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Result<Self, SyncError> {
        live_info!(
            "Starting {} page against {} as user {}",
            kind.as_str(),
            settings.base_url(),
            identity.user_id
        );
        let (sync, events) = SyncHandle::new(settings, kind, identity)?;
        spawn_event_loop(events, msg_tx);
        Ok(Self { sync })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::OpenChannel => self.sync.open_channel(),
                Effect::CloseChannel => self.sync.close_channel(),
                Effect::Refresh(subject) => {
                    live_debug!("Refresh requested for `{}`", subject);
                    self.sync.refresh(subject);
                }
                Effect::SubmitMessage(message) => {
                    live_info!(
                        "SubmitMessage conversation={} type={}",
                        message.conversation_id,
                        message.content.kind()
                    );
                    self.sync.submit_message(message);
                }
                Effect::CallSupervisor { summary } => {
                    live_info!("CallSupervisor summary_len={}", summary.len());
                    self.sync.call_supervisor(summary);
                }
            }
        }
    }

    /// Waits for outbound requests still in flight, then stops the engine.
    pub fn finish(self) {
        self.sync.shutdown();
    }
}

fn spawn_event_loop(events: SyncEvents, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        while let Some(event) = events.recv() {
            if msg_tx.send(map_event(event)).is_err() {
                break;
            }
        }
    });
}

fn map_event(event: SyncEvent) -> Msg {
    match event {
        SyncEvent::ChannelOpened => Msg::ChannelOpened,
        SyncEvent::ChannelClosed { reason } => {
            if let Some(reason) = reason {
                live_warn!("Channel closed: {}", reason);
            }
            Msg::ChannelClosed
        }
        SyncEvent::TriggerReceived(subject) => Msg::TriggerReceived(subject),
        SyncEvent::Refreshed(update) => Msg::Refreshed(update),
        SyncEvent::RefreshFailed { subject, error } => Msg::RefreshFailed {
            subject,
            error: error.to_string(),
        },
    }
}
