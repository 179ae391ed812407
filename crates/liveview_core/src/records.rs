//! Record schemas for the three list resources the backend serves.
//!
//! The backend returns loosely typed rows straight from its database, so each
//! record decodes through a lenient wire shape and is validated on the way in.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

pub type RecordId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("unknown message type `{0}`")]
    UnknownMessageType(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Blocked,
    Other(String),
}

impl TaskStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => TaskStatus::Pending,
            "in_progress" => TaskStatus::InProgress,
            "completed" => TaskStatus::Completed,
            "cancelled" => TaskStatus::Cancelled,
            "blocked" => TaskStatus::Blocked,
            _ => TaskStatus::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Blocked => "blocked",
            TaskStatus::Other(raw) => raw,
        }
    }

    pub fn is_completed(&self) -> bool {
        *self == TaskStatus::Completed
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|raw| TaskStatus::parse(&raw)).unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "TaskWire")]
pub struct Task {
    pub id: RecordId,
    pub title: String,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
    pub status: TaskStatus,
}

#[derive(Deserialize)]
struct TaskWire {
    id: RecordId,
    title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    assignee: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    assigned_workers: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    assigned_to: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    due_date: Option<String>,
    #[serde(default)]
    status: TaskStatus,
}

impl From<TaskWire> for Task {
    fn from(wire: TaskWire) -> Self {
        Self {
            id: wire.id,
            title: wire.title,
            assignee: wire
                .assignee
                .or(wire.assigned_workers)
                .or(wire.assigned_to),
            due_date: wire.due_date,
            status: wire.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "NotificationWire")]
pub struct Notification {
    pub id: RecordId,
    pub message: String,
    pub triggered: bool,
    /// Opaque action descriptor relayed back to the backend on "apply change".
    pub action: Option<String>,
    pub what_we_can_trigger: Option<String>,
    pub what_you_need_to_know: Option<String>,
    pub date: Option<String>,
}

#[derive(Deserialize)]
struct NotificationWire {
    id: RecordId,
    #[serde(default, deserialize_with = "lenient_text")]
    message: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    is_triggered: bool,
    #[serde(default, deserialize_with = "lenient_text")]
    action_list: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    what_we_can_trigger: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    what_you_need_to_know: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    date: Option<String>,
}

impl From<NotificationWire> for Notification {
    fn from(wire: NotificationWire) -> Self {
        Self {
            id: wire.id,
            message: wire.message.or(wire.title).unwrap_or_default(),
            triggered: wire.is_triggered,
            action: wire.action_list,
            what_we_can_trigger: wire.what_we_can_trigger,
            what_you_need_to_know: wire.what_you_need_to_know,
            date: wire.date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    #[serde(rename = "me")]
    Me,
    #[serde(rename = "helmet")]
    Counterpart,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::Me => "me",
            Sender::Counterpart => "helmet",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatContent {
    Text(String),
    Audio { url: String, duration_secs: u32 },
}

impl ChatContent {
    /// Wire name of the content variant.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatContent::Text(_) => "text",
            ChatContent::Audio { .. } => "audio",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ChatMessageWire")]
pub struct ChatMessage {
    /// `None` for a locally composed message the backend has not stored yet.
    pub id: Option<RecordId>,
    pub conversation_id: String,
    pub sender: Sender,
    pub timestamp: String,
    pub content: ChatContent,
}

#[derive(Deserialize)]
struct ChatMessageWire {
    id: RecordId,
    #[serde(default, deserialize_with = "lenient_text")]
    conversation_id: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "audioUrl", alias = "audio_url")]
    audio_url: Option<String>,
    #[serde(default, rename = "audioDuration", alias = "audio_duration")]
    audio_duration: Option<u32>,
    sender: Sender,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

impl TryFrom<ChatMessageWire> for ChatMessage {
    type Error = RecordError;

    fn try_from(wire: ChatMessageWire) -> Result<Self, Self::Error> {
        let duration_secs = wire.audio_duration.unwrap_or(0);
        let content = match wire.kind.as_deref() {
            Some("text") => ChatContent::Text(wire.text.ok_or(RecordError::MissingField("text"))?),
            Some("audio") => ChatContent::Audio {
                url: wire
                    .audio_url
                    .ok_or(RecordError::MissingField("audioUrl"))?,
                duration_secs,
            },
            Some(other) => return Err(RecordError::UnknownMessageType(other.to_string())),
            None => match (wire.text, wire.audio_url) {
                (Some(text), _) => ChatContent::Text(text),
                (None, Some(url)) => ChatContent::Audio { url, duration_secs },
                (None, None) => return Err(RecordError::MissingField("text")),
            },
        };

        Ok(Self {
            id: Some(wire.id),
            conversation_id: wire.conversation_id.unwrap_or_default(),
            sender: wire.sender,
            timestamp: wire.timestamp.unwrap_or_default(),
            content,
        })
    }
}

/// A chat message the page is about to write to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub client_id: String,
    pub conversation_id: String,
    pub content: ChatContent,
}

/// Accepts strings as-is and renders any other non-null JSON value as text.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

/// Accepts booleans and the 0/1 integers MySQL uses for boolean columns.
fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(false),
        Value::Bool(flag) => Ok(flag),
        Value::Number(number) => Ok(number.as_f64().is_some_and(|n| n != 0.0)),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => Ok(true),
            "0" | "false" | "" => Ok(false),
            _ => Err(D::Error::custom(format!("invalid flag `{text}`"))),
        },
        other => Err(D::Error::custom(format!("invalid flag `{other}`"))),
    }
}
