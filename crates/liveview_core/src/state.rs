use crate::view_model::{
    format_duration, ChatRowView, NotificationRowView, PageViewModel, TaskRowView,
};
use crate::{
    BucketPair, ChatContent, ChatMessage, Identity, Notification, PageKind, Sender, Subject, Task,
    ViewUpdate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelStatus {
    Connecting,
    Open,
    #[default]
    Closed,
}

/// Where the page stands on the reply to its last outgoing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ReplyWait {
    #[default]
    Idle,
    /// Sent; no message trigger seen since.
    Sent,
    /// A message trigger arrived; the next history ending with the
    /// counterpart releases compose.
    Notified,
}

/// View state owned by exactly one page instance. Only [`crate::update`]
/// mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageState {
    kind: PageKind,
    identity: Identity,
    mounted: bool,
    /// Set on unmount; a torn-down page is never mounted again.
    torn_down: bool,
    channel: ChannelStatus,
    last_trigger: Option<Subject>,
    tasks: BucketPair<Task>,
    notifications: BucketPair<Notification>,
    chat: Vec<ChatMessage>,
    compose: String,
    reply: ReplyWait,
    recording: bool,
    alert: Option<String>,
    last_error: Option<String>,
    dirty: bool,
}

impl PageState {
    pub fn new(kind: PageKind, identity: Identity) -> Self {
        Self {
            kind,
            identity,
            ..Self::default()
        }
    }

    pub fn kind(&self) -> PageKind {
        self.kind
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn channel(&self) -> ChannelStatus {
        self.channel
    }

    pub fn completed_tasks(&self) -> &[Task] {
        &self.tasks.matched
    }

    pub fn open_tasks(&self) -> &[Task] {
        &self.tasks.unmatched
    }

    pub fn triggered_notifications(&self) -> &[Notification] {
        &self.notifications.matched
    }

    /// Untriggered notifications, shown as actionable news.
    pub fn pending_notifications(&self) -> &[Notification] {
        &self.notifications.unmatched
    }

    pub fn chat(&self) -> &[ChatMessage] {
        &self.chat
    }

    /// We sent something and the counterpart has not answered yet. A
    /// refreshed history alone does not release this: it takes a message
    /// trigger followed by a history that ends with the counterpart.
    pub fn awaiting_reply(&self) -> bool {
        self.reply != ReplyWait::Idle
            || self
                .chat
                .last()
                .is_some_and(|message| message.sender == Sender::Me)
    }

    pub fn compose_enabled(&self) -> bool {
        self.kind == PageKind::Chat && self.mounted && !self.recording && !self.awaiting_reply()
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self) -> PageViewModel {
        let mut previous_sender = None;
        let messages = self
            .chat
            .iter()
            .map(|message| {
                let show_sender = previous_sender != Some(message.sender);
                previous_sender = Some(message.sender);
                ChatRowView {
                    sender: message.sender,
                    timestamp: message.timestamp.clone(),
                    body: match &message.content {
                        ChatContent::Text(text) => text.clone(),
                        ChatContent::Audio { duration_secs, .. } => {
                            format!("[audio {}]", format_duration(*duration_secs))
                        }
                    },
                    pending: message.id.is_none(),
                    show_sender,
                }
            })
            .collect();

        PageViewModel {
            kind: self.kind,
            channel: self.channel,
            last_trigger: self.last_trigger.clone(),
            open_tasks: self.tasks.unmatched.iter().map(TaskRowView::from).collect(),
            completed_tasks: self.tasks.matched.iter().map(TaskRowView::from).collect(),
            news: self
                .notifications
                .unmatched
                .iter()
                .map(NotificationRowView::from)
                .collect(),
            notifications: self
                .notifications
                .matched
                .iter()
                .map(NotificationRowView::from)
                .collect(),
            messages,
            compose: self.compose.clone(),
            compose_enabled: self.compose_enabled(),
            awaiting_reply: self.awaiting_reply(),
            recording: self.recording,
            alert: self.alert.clone(),
            last_error: self.last_error.clone(),
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn mount(&mut self) {
        self.mounted = true;
        self.channel = ChannelStatus::Connecting;
        self.mark_dirty();
    }

    pub(crate) fn unmount(&mut self) {
        self.mounted = false;
        self.torn_down = true;
        self.channel = ChannelStatus::Closed;
        self.recording = false;
        self.mark_dirty();
    }

    pub(crate) fn set_channel(&mut self, status: ChannelStatus) {
        if self.channel != status {
            self.channel = status;
            self.mark_dirty();
        }
    }

    pub(crate) fn record_trigger(&mut self, subject: Subject) {
        if subject == Subject::Message && self.reply == ReplyWait::Sent {
            self.reply = ReplyWait::Notified;
        }
        self.last_trigger = Some(subject);
        self.mark_dirty();
    }

    /// Full replacement of the buckets behind one subject.
    pub(crate) fn apply_refresh(&mut self, update: ViewUpdate) {
        match update {
            ViewUpdate::Tasks(buckets) => self.tasks = buckets,
            ViewUpdate::Notifications(buckets) => self.notifications = buckets,
            ViewUpdate::Messages(messages) => {
                let answered = messages
                    .last()
                    .is_some_and(|message| message.sender == Sender::Counterpart);
                if answered && self.reply == ReplyWait::Notified {
                    self.reply = ReplyWait::Idle;
                }
                self.chat = messages;
            }
        }
        self.last_error = None;
        self.mark_dirty();
    }

    pub(crate) fn record_error(&mut self, subject: &Subject, error: &str) {
        self.last_error = Some(format!("{subject}: {error}"));
        self.mark_dirty();
    }

    pub(crate) fn set_compose(&mut self, text: String) {
        if self.compose != text {
            self.compose = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn take_compose(&mut self) -> String {
        self.mark_dirty();
        std::mem::take(&mut self.compose)
    }

    pub(crate) fn compose(&self) -> &str {
        &self.compose
    }

    /// Optimistically appends a message we are about to send.
    pub(crate) fn append_local(&mut self, timestamp: String, content: ChatContent) {
        self.chat.push(ChatMessage {
            id: None,
            conversation_id: self.identity.conversation_id.clone(),
            sender: Sender::Me,
            timestamp,
            content,
        });
        self.reply = ReplyWait::Sent;
        self.mark_dirty();
    }

    pub(crate) fn is_recording(&self) -> bool {
        self.recording
    }

    pub(crate) fn set_recording(&mut self, recording: bool) {
        if self.recording != recording {
            self.recording = recording;
            self.mark_dirty();
        }
    }

    pub(crate) fn raise_alert(&mut self, alert: String) {
        self.alert = Some(alert);
        self.mark_dirty();
    }

    pub(crate) fn dismiss_alert(&mut self) {
        if self.alert.take().is_some() {
            self.mark_dirty();
        }
    }

    /// Looks up an untriggered news row; fired notifications offer no action.
    pub(crate) fn find_news(&self, id: u64) -> Option<&Notification> {
        self.notifications
            .unmatched
            .iter()
            .find(|notification| notification.id == id)
    }
}
