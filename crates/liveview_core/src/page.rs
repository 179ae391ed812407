use crate::Subject;

const DASHBOARD_SUBJECTS: [Subject; 2] = [Subject::Task, Subject::Notification];
const CHAT_SUBJECTS: [Subject; 1] = [Subject::Message];

pub const DEFAULT_CONVERSATION_ID: &str = "conv_1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageKind {
    /// Task board plus the news/notification panel.
    #[default]
    Dashboard,
    /// Conversation with the site assistant.
    Chat,
}

impl PageKind {
    /// Subjects this page registers handlers for and fetches on mount.
    pub fn subjects(self) -> &'static [Subject] {
        match self {
            PageKind::Dashboard => &DASHBOARD_SUBJECTS,
            PageKind::Chat => &CHAT_SUBJECTS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PageKind::Dashboard => "dashboard",
            PageKind::Chat => "chat",
        }
    }
}

/// Who is looking at the page. Resolved once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: u64,
    pub conversation_id: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            user_id: 1,
            conversation_id: DEFAULT_CONVERSATION_ID.to_string(),
        }
    }
}
