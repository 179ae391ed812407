use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Field names accepted as the subject tag of a push trigger, in lookup order.
/// The deployed backend still emits the older `ding` name.
const SUBJECT_FIELDS: [&str; 2] = ["subject", "ding"];

/// The kind of resource a trigger invalidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subject {
    Task,
    Notification,
    Message,
    /// A tag this client has no handler for yet.
    Other(String),
}

impl Subject {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "task" => Subject::Task,
            "notification" => Subject::Notification,
            "message" => Subject::Message,
            other => Subject::Other(other.to_string()),
        }
    }

    pub fn as_tag(&self) -> &str {
        match self {
            Subject::Task => "task",
            Subject::Notification => "notification",
            Subject::Message => "message",
            Subject::Other(tag) => tag,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// A push message carrying only a subject tag. It invalidates cached view
/// state; it never carries the data itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub subject: Subject,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    #[error("payload is not valid JSON: {0}")]
    NotJson(String),
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("payload has no non-empty string subject")]
    MissingSubject,
}

impl Trigger {
    pub fn new(subject: Subject) -> Self {
        Self { subject }
    }

    /// Parses a raw channel frame. Extra fields are ignored.
    pub fn parse(payload: &str) -> Result<Self, TriggerError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|err| TriggerError::NotJson(err.to_string()))?;
        let object = value.as_object().ok_or(TriggerError::NotAnObject)?;
        let tag = SUBJECT_FIELDS
            .iter()
            .find_map(|field| object.get(*field))
            .and_then(Value::as_str)
            .filter(|tag| !tag.is_empty())
            .ok_or(TriggerError::MissingSubject)?;
        Ok(Self::new(Subject::from_tag(tag)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subject_and_legacy_ding_field() {
        assert_eq!(
            Trigger::parse(r#"{"subject":"task"}"#),
            Ok(Trigger::new(Subject::Task))
        );
        assert_eq!(
            Trigger::parse(r#"{"ding":"notification","extra":3}"#),
            Ok(Trigger::new(Subject::Notification))
        );
    }

    #[test]
    fn unknown_tags_are_kept_verbatim() {
        let trigger = Trigger::parse(r#"{"subject":"news"}"#).unwrap();
        assert_eq!(trigger.subject, Subject::Other("news".to_string()));
        assert_eq!(trigger.subject.to_string(), "news");
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert!(matches!(
            Trigger::parse("ding!"),
            Err(TriggerError::NotJson(_))
        ));
        assert_eq!(Trigger::parse("[1,2]"), Err(TriggerError::NotAnObject));
        assert_eq!(Trigger::parse("{}"), Err(TriggerError::MissingSubject));
        assert_eq!(
            Trigger::parse(r#"{"subject":7}"#),
            Err(TriggerError::MissingSubject)
        );
        assert_eq!(
            Trigger::parse(r#"{"subject":""}"#),
            Err(TriggerError::MissingSubject)
        );
    }
}
