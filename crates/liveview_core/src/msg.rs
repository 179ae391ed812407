use crate::{BucketPair, ChatMessage, Notification, Subject, Task};

/// Replacement contents for the buckets of one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewUpdate {
    Tasks(BucketPair<Task>),
    Notifications(BucketPair<Notification>),
    Messages(Vec<ChatMessage>),
}

impl ViewUpdate {
    pub fn subject(&self) -> Subject {
        match self {
            ViewUpdate::Tasks(_) => Subject::Task,
            ViewUpdate::Notifications(_) => Subject::Notification,
            ViewUpdate::Messages(_) => Subject::Message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Page became visible; opens the channel and runs the initial fetch.
    Mounted,
    /// Page is being torn down.
    Unmounted,
    ChannelOpened,
    ChannelClosed,
    /// A trigger arrived on the channel and was dispatched.
    TriggerReceived(Subject),
    /// A subject handler finished a successful fetch.
    Refreshed(ViewUpdate),
    /// User asked to re-fetch every subject of the page.
    RefreshRequested,
    /// A subject handler failed; buckets stay as they are.
    RefreshFailed { subject: Subject, error: String },
    /// User edited the compose box.
    ComposeChanged(String),
    /// User pressed send. `sent_at` is the local display timestamp.
    SendClicked { sent_at: String },
    /// User clicked "Apply Change" on a news row.
    ApplyChangeClicked { notification_id: u64 },
    /// Microphone capture began.
    RecordingStarted,
    /// Microphone capture produced a clip.
    RecordingStopped {
        audio_url: String,
        duration_secs: u32,
        sent_at: String,
    },
    /// Microphone permission was refused.
    RecordingDenied { reason: String },
    AlertDismissed,
    /// Render tick to coalesce redraws.
    Tick,
    NoOp,
}
