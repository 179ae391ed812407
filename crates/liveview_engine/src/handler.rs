use std::sync::Arc;

use liveview_core::{BucketPair, Identity, PageKind, Subject, ViewUpdate};

use crate::{FetchError, RecordSource};

/// Fetch-and-partition routine bound to one trigger subject.
#[async_trait::async_trait]
pub trait SubjectHandler: Send + Sync {
    async fn refresh(&self) -> Result<ViewUpdate, FetchError>;
}

/// `GET /tasks`, split into completed and open tasks.
pub struct TaskListHandler {
    source: Arc<dyn RecordSource>,
}

impl TaskListHandler {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self { source }
    }
}

#[async_trait::async_trait]
impl SubjectHandler for TaskListHandler {
    async fn refresh(&self) -> Result<ViewUpdate, FetchError> {
        let tasks = self.source.tasks().await?;
        Ok(ViewUpdate::Tasks(BucketPair::partition(tasks)))
    }
}

/// `GET /notifications`, split into triggered and pending notifications.
pub struct NotificationListHandler {
    source: Arc<dyn RecordSource>,
}

impl NotificationListHandler {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self { source }
    }
}

#[async_trait::async_trait]
impl SubjectHandler for NotificationListHandler {
    async fn refresh(&self) -> Result<ViewUpdate, FetchError> {
        let notifications = self.source.notifications().await?;
        Ok(ViewUpdate::Notifications(BucketPair::partition(
            notifications,
        )))
    }
}

/// Conversation history for one user; a single ordered bucket.
pub struct ChatHistoryHandler {
    source: Arc<dyn RecordSource>,
    identity: Identity,
}

impl ChatHistoryHandler {
    pub fn new(source: Arc<dyn RecordSource>, identity: Identity) -> Self {
        Self { source, identity }
    }
}

#[async_trait::async_trait]
impl SubjectHandler for ChatHistoryHandler {
    async fn refresh(&self) -> Result<ViewUpdate, FetchError> {
        let mut messages = self
            .source
            .messages(self.identity.user_id, &self.identity.conversation_id)
            .await?;
        // The history endpoint does not echo the conversation id back.
        for message in messages
            .iter_mut()
            .filter(|message| message.conversation_id.is_empty())
        {
            message.conversation_id = self.identity.conversation_id.clone();
        }
        Ok(ViewUpdate::Messages(messages))
    }
}

/// The handler set a page registers at mount.
pub fn handlers_for(
    kind: PageKind,
    source: Arc<dyn RecordSource>,
    identity: &Identity,
) -> Vec<(Subject, Arc<dyn SubjectHandler>)> {
    kind.subjects()
        .iter()
        .filter_map(|subject| {
            let handler: Arc<dyn SubjectHandler> = match subject {
                Subject::Task => Arc::new(TaskListHandler::new(source.clone())),
                Subject::Notification => Arc::new(NotificationListHandler::new(source.clone())),
                Subject::Message => {
                    Arc::new(ChatHistoryHandler::new(source.clone(), identity.clone()))
                }
                Subject::Other(_) => return None,
            };
            Some((subject.clone(), handler))
        })
        .collect()
}
