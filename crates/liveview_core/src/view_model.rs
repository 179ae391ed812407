use crate::{ChannelStatus, Notification, PageKind, Sender, Subject, Task, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageViewModel {
    pub kind: PageKind,
    pub channel: ChannelStatus,
    pub last_trigger: Option<Subject>,
    pub open_tasks: Vec<TaskRowView>,
    pub completed_tasks: Vec<TaskRowView>,
    /// Untriggered notifications offering an "apply change" action.
    pub news: Vec<NotificationRowView>,
    /// Notifications that already fired.
    pub notifications: Vec<NotificationRowView>,
    pub messages: Vec<ChatRowView>,
    pub compose: String,
    pub compose_enabled: bool,
    pub awaiting_reply: bool,
    pub recording: bool,
    /// Blocking alert the user has to dismiss.
    pub alert: Option<String>,
    pub last_error: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRowView {
    pub id: u64,
    pub title: String,
    pub assignee: String,
    pub due_date: String,
    pub status: TaskStatus,
}

impl From<&Task> for TaskRowView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            assignee: task.assignee.clone().unwrap_or_default(),
            // Keep only the calendar date of ISO timestamps.
            due_date: task
                .due_date
                .as_deref()
                .map(|date| date.split('T').next().unwrap_or(date).to_string())
                .unwrap_or_default(),
            status: task.status.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRowView {
    pub id: u64,
    pub message: String,
    pub detail: Option<String>,
    pub suggestion: Option<String>,
    pub actionable: bool,
}

impl From<&Notification> for NotificationRowView {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id,
            message: notification.message.clone(),
            detail: notification.what_you_need_to_know.clone(),
            suggestion: notification.what_we_can_trigger.clone(),
            actionable: notification.action.is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRowView {
    pub sender: Sender,
    pub timestamp: String,
    pub body: String,
    /// Optimistically appended and not yet confirmed by a refresh.
    pub pending: bool,
    /// First message of a run from the same sender.
    pub show_sender: bool,
}

/// `m:ss` rendering for clip durations.
pub fn format_duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
