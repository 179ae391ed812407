//! Liveview core: page state container, record schemas and the pure update
//! function behind the live-update synchronizer.
mod effect;
mod msg;
mod page;
mod partition;
mod records;
mod state;
mod subject;
mod summary;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::{Msg, ViewUpdate};
pub use page::{Identity, PageKind, DEFAULT_CONVERSATION_ID};
pub use partition::{BucketPair, Partition};
pub use records::{
    ChatContent, ChatMessage, Notification, OutgoingMessage, RecordError, RecordId, Sender, Task,
    TaskStatus,
};
pub use state::{ChannelStatus, PageState};
pub use subject::{Subject, Trigger, TriggerError};
pub use summary::{apply_change_summary, chat_summary};
pub use update::update;
pub use view_model::{
    format_duration, ChatRowView, NotificationRowView, PageViewModel, TaskRowView,
};
