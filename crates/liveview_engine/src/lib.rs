//! Liveview engine: push channel, dispatch table, REST handlers and the
//! outbound action relay.
mod channel;
mod dispatch;
mod engine;
mod fetch;
mod gate;
mod handler;
mod relay;
mod settings;
mod types;

pub use channel::{ChannelError, ChannelHandle, ChannelObserver};
pub use dispatch::{DispatchTable, PageLifetime, RefreshSink};
pub use engine::{SyncError, SyncEvents, SyncHandle};
pub use fetch::{RecordSource, ReqwestSource};
pub use handler::{
    handlers_for, ChatHistoryHandler, NotificationListHandler, SubjectHandler, TaskListHandler,
};
pub use relay::ActionRelay;
pub use settings::{BackendSettings, SettingsError, DEFAULT_BACKEND_URL};
pub use types::{FailureKind, FetchError, SyncEvent};
