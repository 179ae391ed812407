use crate::{OutgoingMessage, Subject};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenChannel,
    CloseChannel,
    /// Fetch the resource behind `Subject` through its registered handler.
    Refresh(Subject),
    /// Fire-and-forget write of a locally composed chat message.
    SubmitMessage(OutgoingMessage),
    /// Fire-and-forget hand-off of a human-readable summary to the backend.
    CallSupervisor { summary: String },
}
