use std::fmt::Write;

use liveview_core::{
    ChannelStatus, ChatRowView, Msg, NotificationRowView, PageKind, PageViewModel, Sender,
    TaskRowView,
};

/// One line typed by the user, resolved against the mounted page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Msgs(Vec<Msg>),
    Quit,
    Rejected(String),
}

const DENIED_REASON: &str = "permission denied by user";

pub fn parse_input(kind: PageKind, line: &str, now: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Msgs(Vec::new());
    }

    let Some(command) = line.strip_prefix('/') else {
        return match kind {
            PageKind::Chat => Input::Msgs(vec![
                Msg::ComposeChanged(line.to_string()),
                Msg::SendClicked {
                    sent_at: now.to_string(),
                },
            ]),
            PageKind::Dashboard => {
                Input::Rejected("the dashboard takes commands only; try /help".to_string())
            }
        };
    };

    let mut words = command.split_whitespace();
    match (words.next().unwrap_or_default(), kind) {
        ("quit", _) => Input::Quit,
        ("refresh", _) => Input::Msgs(vec![Msg::RefreshRequested]),
        ("dismiss", _) => Input::Msgs(vec![Msg::AlertDismissed]),
        ("help", _) => Input::Rejected(help(kind).to_string()),
        ("apply", PageKind::Dashboard) => match words.next().map(str::parse::<u64>) {
            Some(Ok(notification_id)) => {
                Input::Msgs(vec![Msg::ApplyChangeClicked { notification_id }])
            }
            _ => Input::Rejected("usage: /apply <notification-id>".to_string()),
        },
        ("audio", PageKind::Chat) => {
            let url = words.next();
            let duration = words.next().map(str::parse::<u32>);
            match (url, duration) {
                (Some(url), Some(Ok(duration_secs))) => Input::Msgs(vec![
                    Msg::RecordingStarted,
                    Msg::RecordingStopped {
                        audio_url: url.to_string(),
                        duration_secs,
                        sent_at: now.to_string(),
                    },
                ]),
                _ => Input::Rejected("usage: /audio <url> <seconds>".to_string()),
            }
        }
        ("deny", PageKind::Chat) => Input::Msgs(vec![
            Msg::RecordingStarted,
            Msg::RecordingDenied {
                reason: DENIED_REASON.to_string(),
            },
        ]),
        (other, _) => Input::Rejected(format!("unknown command `/{other}`; try /help")),
    }
}

fn help(kind: PageKind) -> &'static str {
    match kind {
        PageKind::Dashboard => "commands: /apply <id>, /refresh, /dismiss, /quit",
        PageKind::Chat => concat!(
            "type a line to send; ",
            "commands: /audio <url> <seconds>, /deny, /refresh, /dismiss, /quit"
        ),
    }
}

pub fn render(view: &PageViewModel) -> String {
    let mut out = String::new();
    let title = match view.kind {
        PageKind::Dashboard => "Dashboard",
        PageKind::Chat => "Chat",
    };
    let _ = write!(out, "== {title} == [{}]", channel_label(view.channel));
    if let Some(subject) = &view.last_trigger {
        let _ = write!(out, " last trigger: {subject}");
    }
    out.push('\n');

    match view.kind {
        PageKind::Dashboard => render_dashboard(&mut out, view),
        PageKind::Chat => render_chat(&mut out, view),
    }

    if let Some(error) = &view.last_error {
        let _ = writeln!(out, "! refresh failed: {error}");
    }
    if let Some(alert) = &view.alert {
        let _ = writeln!(out, "!! {alert} (/dismiss)");
    }
    out
}

fn channel_label(status: ChannelStatus) -> &'static str {
    match status {
        ChannelStatus::Connecting => "connecting",
        ChannelStatus::Open => "live",
        ChannelStatus::Closed => "offline",
    }
}

fn render_dashboard(out: &mut String, view: &PageViewModel) {
    task_section(out, "Open tasks", &view.open_tasks);
    task_section(out, "Completed tasks", &view.completed_tasks);
    notification_section(out, "News", &view.news, true);
    notification_section(out, "Notifications", &view.notifications, false);
}

fn task_section(out: &mut String, heading: &str, rows: &[TaskRowView]) {
    let _ = writeln!(out, "{heading} ({})", rows.len());
    for row in rows {
        let _ = write!(out, "  #{} {} [{}]", row.id, row.title, row.status);
        if !row.assignee.is_empty() {
            let _ = write!(out, " @{}", row.assignee);
        }
        if !row.due_date.is_empty() {
            let _ = write!(out, " due {}", row.due_date);
        }
        out.push('\n');
    }
}

fn notification_section(
    out: &mut String,
    heading: &str,
    rows: &[NotificationRowView],
    offer_apply: bool,
) {
    let _ = writeln!(out, "{heading} ({})", rows.len());
    for row in rows {
        let _ = write!(out, "  #{} {}", row.id, row.message);
        if offer_apply && row.actionable {
            let _ = write!(out, " (/apply {})", row.id);
        }
        out.push('\n');
        if let Some(detail) = &row.detail {
            let _ = writeln!(out, "      {detail}");
        }
        if let Some(suggestion) = &row.suggestion {
            let _ = writeln!(out, "      -> {suggestion}");
        }
    }
}

fn render_chat(out: &mut String, view: &PageViewModel) {
    for row in &view.messages {
        chat_row(out, row);
    }

    if view.recording {
        out.push_str("(recording...)\n");
    } else if view.awaiting_reply {
        out.push_str("(waiting for a reply)\n");
    } else if view.compose_enabled {
        let _ = writeln!(out, "> {}", view.compose);
    }
}

fn chat_row(out: &mut String, row: &ChatRowView) {
    if row.show_sender {
        let label = match row.sender {
            Sender::Me => "You",
            Sender::Counterpart => "Helmet",
        };
        let _ = writeln!(out, "{label}:");
    }
    let _ = write!(out, "  {}", row.body);
    if !row.timestamp.is_empty() {
        let _ = write!(out, "  {}", row.timestamp);
    }
    if row.pending {
        out.push_str("  (sending)");
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use liveview_core::{Subject, TaskStatus};

    const NOW: &str = "2025-09-12T10:00:00";

    #[test]
    fn chat_line_composes_and_sends() {
        assert_eq!(
            parse_input(PageKind::Chat, "  crane is down ", NOW),
            Input::Msgs(vec![
                Msg::ComposeChanged("crane is down".to_string()),
                Msg::SendClicked {
                    sent_at: NOW.to_string()
                },
            ])
        );
    }

    #[test]
    fn dashboard_rejects_free_text_and_chat_commands() {
        assert!(matches!(
            parse_input(PageKind::Dashboard, "hello", NOW),
            Input::Rejected(_)
        ));
        assert!(matches!(
            parse_input(PageKind::Dashboard, "/audio a 3", NOW),
            Input::Rejected(_)
        ));
        assert_eq!(
            parse_input(PageKind::Dashboard, "/apply 4", NOW),
            Input::Msgs(vec![Msg::ApplyChangeClicked { notification_id: 4 }])
        );
        assert!(matches!(
            parse_input(PageKind::Dashboard, "/apply four", NOW),
            Input::Rejected(_)
        ));
    }

    #[test]
    fn audio_and_deny_drive_the_recorder() {
        assert_eq!(
            parse_input(PageKind::Chat, "/audio https://cdn.example/a.wav 75", NOW),
            Input::Msgs(vec![
                Msg::RecordingStarted,
                Msg::RecordingStopped {
                    audio_url: "https://cdn.example/a.wav".to_string(),
                    duration_secs: 75,
                    sent_at: NOW.to_string(),
                },
            ])
        );
        assert!(matches!(
            parse_input(PageKind::Chat, "/deny", NOW),
            Input::Msgs(msgs) if matches!(msgs.last(), Some(Msg::RecordingDenied { .. }))
        ));
    }

    #[test]
    fn shared_commands() {
        assert_eq!(parse_input(PageKind::Chat, "/quit", NOW), Input::Quit);
        assert_eq!(
            parse_input(PageKind::Dashboard, "/refresh", NOW),
            Input::Msgs(vec![Msg::RefreshRequested])
        );
        assert_eq!(parse_input(PageKind::Chat, "", NOW), Input::Msgs(Vec::new()));
    }

    #[test]
    fn dashboard_lists_buckets_and_apply_hints() {
        let view = PageViewModel {
            kind: PageKind::Dashboard,
            channel: ChannelStatus::Open,
            last_trigger: Some(Subject::Task),
            open_tasks: vec![TaskRowView {
                id: 2,
                title: "Strip formwork".to_string(),
                assignee: "Ana".to_string(),
                due_date: "2025-09-20".to_string(),
                status: TaskStatus::Pending,
            }],
            news: vec![NotificationRowView {
                id: 5,
                message: "Delivery moved".to_string(),
                detail: None,
                suggestion: Some("Reschedule crane".to_string()),
                actionable: true,
            }],
            ..PageViewModel::default()
        };

        let text = render(&view);
        assert!(text.starts_with("== Dashboard == [live] last trigger: task\n"));
        assert!(text.contains(
            "Open tasks (1)\n  #2 Strip formwork [pending] @Ana due 2025-09-20\n"
        ));
        assert!(text.contains("Completed tasks (0)\n"));
        assert!(text.contains("  #5 Delivery moved (/apply 5)\n      -> Reschedule crane\n"));
    }

    #[test]
    fn chat_shows_sender_only_on_change() {
        let row = |sender, body: &str, pending, show_sender| ChatRowView {
            sender,
            timestamp: String::new(),
            body: body.to_string(),
            pending,
            show_sender,
        };
        let view = PageViewModel {
            kind: PageKind::Chat,
            messages: vec![
                row(Sender::Counterpart, "hi", false, true),
                row(Sender::Counterpart, "[audio 0:07]", false, false),
                row(Sender::Me, "on my way", true, true),
            ],
            awaiting_reply: true,
            ..PageViewModel::default()
        };

        let text = render(&view);
        assert!(text.contains("Helmet:\n  hi\n  [audio 0:07]\nYou:\n  on my way  (sending)\n"));
        assert!(text.contains("(waiting for a reply)"));
        assert!(text.starts_with("== Chat == [offline]\n"));
    }
}
