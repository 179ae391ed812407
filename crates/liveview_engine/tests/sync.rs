use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use liveview_core::{
    update, ChannelStatus, ChatContent, ChatMessage, Effect, Identity, Msg, Notification,
    PageKind, PageState, Sender, Subject, Task, TaskStatus, ViewUpdate,
};
use liveview_engine::{BackendSettings, FetchError, RecordSource, SyncEvent, SyncEvents, SyncHandle};
use pretty_assertions::assert_eq;

const WAIT: Duration = Duration::from_secs(5);

struct FixedSource;

#[async_trait::async_trait]
impl RecordSource for FixedSource {
    async fn tasks(&self) -> Result<Vec<Task>, FetchError> {
        Ok(vec![
            Task {
                id: 1,
                title: "Pour slab".to_string(),
                assignee: None,
                due_date: None,
                status: TaskStatus::Completed,
            },
            Task {
                id: 2,
                title: "Strip formwork".to_string(),
                assignee: Some("Ana".to_string()),
                due_date: None,
                status: TaskStatus::Pending,
            },
        ])
    }

    async fn notifications(&self) -> Result<Vec<Notification>, FetchError> {
        Ok(Vec::new())
    }

    async fn messages(
        &self,
        _user_id: u64,
        conversation_id: &str,
    ) -> Result<Vec<ChatMessage>, FetchError> {
        Ok(vec![ChatMessage {
            id: Some(5),
            conversation_id: conversation_id.to_string(),
            sender: Sender::Counterpart,
            timestamp: String::new(),
            content: ChatContent::Text("hello".to_string()),
        }])
    }
}

/// Backend address nobody listens on.
fn unreachable_settings() -> BackendSettings {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    let mut settings = BackendSettings::new(&format!("http://{addr}")).expect("valid url");
    settings.connect_timeout = Duration::from_millis(500);
    settings
}

#[test]
fn refresh_delivers_partitioned_tasks() {
    let (sync, events) = SyncHandle::with_source(
        unreachable_settings(),
        PageKind::Dashboard,
        Identity::default(),
        Arc::new(FixedSource),
    )
    .expect("synchronizer starts");

    sync.refresh(Subject::Task);
    let Some(SyncEvent::Refreshed(ViewUpdate::Tasks(buckets))) = events.recv_timeout(WAIT) else {
        panic!("expected a task refresh");
    };
    assert_eq!(buckets.matched.len(), 1);
    assert_eq!(buckets.unmatched[0].id, 2);
}

#[test]
fn chat_page_only_registers_message_subject() {
    let (sync, events) = SyncHandle::with_source(
        unreachable_settings(),
        PageKind::Chat,
        Identity::default(),
        Arc::new(FixedSource),
    )
    .expect("synchronizer starts");

    sync.refresh(Subject::Task);
    sync.refresh(Subject::Message);
    match events.recv_timeout(WAIT) {
        Some(SyncEvent::Refreshed(ViewUpdate::Messages(messages))) => {
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].conversation_id, "conv_1");
        }
        other => panic!("expected chat history, got {other:?}"),
    }
    assert_eq!(events.recv_timeout(Duration::from_millis(200)), None);
}

#[test]
fn failed_connect_reports_channel_closed() {
    let (sync, events) = SyncHandle::with_source(
        unreachable_settings(),
        PageKind::Dashboard,
        Identity::default(),
        Arc::new(FixedSource),
    )
    .expect("synchronizer starts");

    sync.open_channel();
    match events.recv_timeout(WAIT) {
        Some(SyncEvent::ChannelClosed { reason: Some(_) }) => {}
        other => panic!("expected a failed connect, got {other:?}"),
    }
}

#[test]
fn nothing_is_delivered_after_teardown() {
    let (sync, events) = SyncHandle::with_source(
        unreachable_settings(),
        PageKind::Dashboard,
        Identity::default(),
        Arc::new(FixedSource),
    )
    .expect("synchronizer starts");

    sync.close_channel();
    sync.refresh(Subject::Task);
    sync.open_channel();
    assert_eq!(events.recv_timeout(Duration::from_millis(300)), None);
}

fn start_dashboard() -> (SyncHandle, SyncEvents) {
    SyncHandle::with_source(
        unreachable_settings(),
        PageKind::Dashboard,
        Identity::default(),
        Arc::new(FixedSource),
    )
    .expect("synchronizer starts")
}

fn run_effects(sync: &SyncHandle, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::OpenChannel => sync.open_channel(),
            Effect::CloseChannel => sync.close_channel(),
            Effect::Refresh(subject) => sync.refresh(subject),
            Effect::SubmitMessage(message) => sync.submit_message(message),
            Effect::CallSupervisor { summary } => sync.call_supervisor(summary),
        }
    }
}

/// Feeds engine events into the page until `refreshes` updates arrived.
fn settle(mut page: PageState, events: &SyncEvents, refreshes: usize) -> PageState {
    let mut seen = 0;
    while seen < refreshes {
        let msg = match events.recv_timeout(WAIT) {
            Some(SyncEvent::ChannelOpened) => Msg::ChannelOpened,
            Some(SyncEvent::ChannelClosed { .. }) => Msg::ChannelClosed,
            Some(SyncEvent::TriggerReceived(subject)) => Msg::TriggerReceived(subject),
            Some(SyncEvent::Refreshed(update)) => {
                seen += 1;
                Msg::Refreshed(update)
            }
            Some(SyncEvent::RefreshFailed { subject, error }) => Msg::RefreshFailed {
                subject,
                error: error.to_string(),
            },
            None => panic!("only {seen} of {refreshes} refreshes arrived"),
        };
        page = update(page, msg).0;
    }
    page
}

#[test]
fn remount_takes_a_new_page_and_synchronizer() {
    let (sync, events) = start_dashboard();
    let (page, effects) = update(
        PageState::new(PageKind::Dashboard, Identity::default()),
        Msg::Mounted,
    );
    run_effects(&sync, effects);
    let page = settle(page, &events, 2);
    assert_eq!(page.completed_tasks().len(), 1);

    let (page, effects) = update(page, Msg::Unmounted);
    run_effects(&sync, effects);
    let (page, effects) = update(page, Msg::Mounted);
    assert!(effects.is_empty());
    assert_eq!(page.channel(), ChannelStatus::Closed);
    sync.shutdown();

    let (sync, events) = start_dashboard();
    let (page, effects) = update(
        PageState::new(PageKind::Dashboard, Identity::default()),
        Msg::Mounted,
    );
    run_effects(&sync, effects);
    let page = settle(page, &events, 2);
    assert!(page.is_mounted());
    assert_eq!(page.open_tasks()[0].id, 2);
}
