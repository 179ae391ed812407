use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use liveview_core::{Identity, OutgoingMessage, PageKind, Subject, Trigger, ViewUpdate};
use liveview_logging::{live_debug, live_info, live_warn};
use thiserror::Error;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use crate::channel::{ChannelError, ChannelHandle, ChannelObserver};
use crate::dispatch::{DispatchTable, PageLifetime, RefreshSink};
use crate::{
    handlers_for, ActionRelay, BackendSettings, FetchError, RecordSource, ReqwestSource,
    SyncEvent,
};

/// How long shutdown waits for outbound writes still in flight.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build http client: {0}")]
    Client(#[from] FetchError),
}

enum SyncCommand {
    OpenChannel,
    CloseChannel,
    Refresh(Subject),
    SubmitMessage(OutgoingMessage),
    CallSupervisor(String),
}

/// Command side of one page's synchronizer. All IO runs on a tokio runtime
/// owned by a background thread; dropping the handle stops it.
pub struct SyncHandle {
    cmd_tx: mpsc::Sender<SyncCommand>,
    worker: thread::JoinHandle<()>,
}

/// Event side of the synchronizer, consumed by the page loop.
pub struct SyncEvents {
    event_rx: mpsc::Receiver<SyncEvent>,
}

impl SyncHandle {
    pub fn new(
        settings: BackendSettings,
        kind: PageKind,
        identity: Identity,
    ) -> Result<(Self, SyncEvents), SyncError> {
        let source: Arc<dyn RecordSource> = Arc::new(ReqwestSource::new(settings.clone())?);
        Self::with_source(settings, kind, identity, source)
    }

    pub fn with_source(
        settings: BackendSettings,
        kind: PageKind,
        identity: Identity,
        source: Arc<dyn RecordSource>,
    ) -> Result<(Self, SyncEvents), SyncError> {
        let runtime = Runtime::new()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let events = Arc::new(ChannelEventSink::new(event_tx));
        let lifetime = PageLifetime::new();
        let dispatch = Arc::new(DispatchTable::new(
            runtime.handle().clone(),
            events.clone(),
            lifetime.clone(),
        ));
        for (subject, handler) in handlers_for(kind, source, &identity) {
            dispatch.register(subject, handler);
        }
        live_info!(
            "{} page registered subjects {:?}",
            kind.as_str(),
            dispatch.registered_subjects()
        );

        let relay = ActionRelay::new(settings.clone(), runtime.handle().clone())?;
        let mut worker = SyncWorker {
            runtime,
            settings,
            dispatch,
            lifetime,
            relay,
            events,
            channel: None,
            in_flight: Vec::new(),
        };

        let join = thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                worker.handle(command);
            }
            worker.shutdown();
        });

        Ok((
            Self {
                cmd_tx,
                worker: join,
            },
            SyncEvents { event_rx },
        ))
    }

    pub fn open_channel(&self) {
        self.send(SyncCommand::OpenChannel);
    }

    /// Page teardown: closes the channel and stops writes from in-flight
    /// refreshes.
    pub fn close_channel(&self) {
        self.send(SyncCommand::CloseChannel);
    }

    pub fn refresh(&self, subject: Subject) {
        self.send(SyncCommand::Refresh(subject));
    }

    pub fn submit_message(&self, message: OutgoingMessage) {
        self.send(SyncCommand::SubmitMessage(message));
    }

    pub fn call_supervisor(&self, summary: impl Into<String>) {
        self.send(SyncCommand::CallSupervisor(summary.into()));
    }

    /// Stops the synchronizer, giving pending message submissions and
    /// supervisor calls a bounded time to finish.
    pub fn shutdown(self) {
        let Self { cmd_tx, worker } = self;
        drop(cmd_tx);
        if worker.join().is_err() {
            live_warn!("Synchronizer thread panicked");
        }
    }

    fn send(&self, command: SyncCommand) {
        if self.cmd_tx.send(command).is_err() {
            live_warn!("Synchronizer thread is gone; command dropped");
        }
    }
}

impl SyncEvents {
    /// Blocks until the next event; `None` once the synchronizer stopped.
    pub fn recv(&self) -> Option<SyncEvent> {
        self.event_rx.recv().ok()
    }

    pub fn try_recv(&self) -> Option<SyncEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<SyncEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

struct SyncWorker {
    runtime: Runtime,
    settings: BackendSettings,
    dispatch: Arc<DispatchTable>,
    lifetime: PageLifetime,
    relay: ActionRelay,
    events: Arc<ChannelEventSink>,
    channel: Option<ChannelHandle>,
    in_flight: Vec<JoinHandle<()>>,
}

impl SyncWorker {
    fn handle(&mut self, command: SyncCommand) {
        match command {
            SyncCommand::OpenChannel => self.open_channel(),
            SyncCommand::CloseChannel => {
                self.lifetime.end();
                if let Some(channel) = self.channel.take() {
                    live_info!("Closing channel {}", channel.endpoint());
                    let _ = channel.close();
                }
            }
            SyncCommand::Refresh(subject) => {
                self.dispatch.refresh(&subject);
            }
            SyncCommand::SubmitMessage(message) => {
                let task = self.relay.submit_message(message);
                self.track(task);
            }
            SyncCommand::CallSupervisor(summary) => {
                let task = self.relay.call_supervisor(summary);
                self.track(task);
            }
        }
    }

    fn open_channel(&mut self) {
        if !self.lifetime.is_alive() {
            live_warn!("Page already torn down; a new page is needed to reconnect");
            return;
        }
        if self
            .channel
            .as_ref()
            .is_some_and(|channel| !channel.is_finished())
        {
            live_debug!("Channel already open; ignoring open request");
            return;
        }

        let endpoint = self.settings.channel_endpoint();
        live_info!("Opening channel {}", endpoint);
        self.channel = Some(ChannelHandle::open(
            self.runtime.handle(),
            endpoint,
            self.dispatch.clone(),
            self.events.clone(),
        ));
    }

    fn track(&mut self, task: JoinHandle<()>) {
        self.in_flight.retain(|task| !task.is_finished());
        self.in_flight.push(task);
    }

    fn shutdown(mut self) {
        self.lifetime.end();
        self.channel.take();

        let in_flight = std::mem::take(&mut self.in_flight);
        if !in_flight.is_empty() {
            live_info!("Waiting for {} outbound request(s)", in_flight.len());
            let flushed = self.runtime.block_on(tokio::time::timeout(
                FLUSH_TIMEOUT,
                futures_util::future::join_all(in_flight),
            ));
            if flushed.is_err() {
                live_warn!("Outbound requests still pending at shutdown were dropped");
            }
        }
        live_debug!("Synchronizer stopped");
    }
}

/// Forwards channel and refresh outcomes into the page loop's queue.
struct ChannelEventSink {
    tx: mpsc::Sender<SyncEvent>,
}

impl ChannelEventSink {
    fn new(tx: mpsc::Sender<SyncEvent>) -> Self {
        Self { tx }
    }

    fn emit(&self, event: SyncEvent) {
        let _ = self.tx.send(event);
    }
}

impl ChannelObserver for ChannelEventSink {
    fn on_open(&self) {
        self.emit(SyncEvent::ChannelOpened);
    }

    fn on_message(&self, trigger: &Trigger) {
        self.emit(SyncEvent::TriggerReceived(trigger.subject.clone()));
    }

    fn on_close(&self, error: Option<&ChannelError>) {
        self.emit(SyncEvent::ChannelClosed {
            reason: error.map(ToString::to_string),
        });
    }
}

impl RefreshSink for ChannelEventSink {
    fn deliver(&self, update: ViewUpdate) {
        self.emit(SyncEvent::Refreshed(update));
    }

    fn report(&self, subject: Subject, error: FetchError) {
        self.emit(SyncEvent::RefreshFailed { subject, error });
    }
}
