//! Summary strings handed to the backend supervisor endpoint.

/// Routing tag the supervisor expects in front of dashboard actions.
const DASHBOARD_ACTION_TAG: u32 = 999;

pub fn apply_change_summary(user_id: u64, action: &str) -> String {
    format!("[{DASHBOARD_ACTION_TAG}][User ID: {user_id} : {action}]")
}

pub fn chat_summary(user_id: u64, sent_at: &str, text: &str) -> String {
    format!("[User ID: {user_id} - Message Date: {sent_at}]: {text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summaries_match_supervisor_format() {
        assert_eq!(
            apply_change_summary(3, r#"["reschedule"]"#),
            r#"[999][User ID: 3 : ["reschedule"]]"#
        );
        assert_eq!(
            chat_summary(1, "2025-09-12T10:00:00", "crane is down"),
            "[User ID: 1 - Message Date: 2025-09-12T10:00:00]: crane is down"
        );
    }
}
