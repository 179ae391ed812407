use crate::summary::{apply_change_summary, chat_summary};
use crate::{ChannelStatus, ChatContent, Effect, Msg, OutgoingMessage, PageKind, PageState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: PageState, msg: Msg) -> (PageState, Vec<Effect>) {
    let effects = match msg {
        Msg::Mounted => {
            // A page instance mounts once; after teardown a new page is needed.
            if state.is_mounted() || state.is_torn_down() {
                return (state, Vec::new());
            }
            state.mount();
            let mut effects = Vec::with_capacity(1 + state.kind().subjects().len());
            effects.push(Effect::OpenChannel);
            effects.extend(state.kind().subjects().iter().cloned().map(Effect::Refresh));
            effects
        }
        Msg::Unmounted => {
            if !state.is_mounted() {
                return (state, Vec::new());
            }
            state.unmount();
            vec![Effect::CloseChannel]
        }
        // Everything below writes page state and must not run after teardown:
        // fetches started before unmount still resolve later.
        _ if !state.is_mounted() => Vec::new(),
        Msg::ChannelOpened => {
            state.set_channel(ChannelStatus::Open);
            Vec::new()
        }
        Msg::ChannelClosed => {
            // No reconnect; a new mount opens a new channel.
            state.set_channel(ChannelStatus::Closed);
            Vec::new()
        }
        Msg::TriggerReceived(subject) => {
            state.record_trigger(subject);
            Vec::new()
        }
        Msg::Refreshed(update) => {
            state.apply_refresh(update);
            Vec::new()
        }
        Msg::RefreshRequested => state
            .kind()
            .subjects()
            .iter()
            .cloned()
            .map(Effect::Refresh)
            .collect(),
        Msg::RefreshFailed { subject, error } => {
            state.record_error(&subject, &error);
            Vec::new()
        }
        Msg::ComposeChanged(text) => {
            if state.kind() == PageKind::Chat {
                state.set_compose(text);
            }
            Vec::new()
        }
        Msg::SendClicked { sent_at } => {
            if !state.compose_enabled() || state.compose().trim().is_empty() {
                return (state, Vec::new());
            }
            let text = state.take_compose();
            state.append_local(sent_at.clone(), ChatContent::Text(text.clone()));

            let identity = state.identity();
            let summary = chat_summary(identity.user_id, &sent_at, &text);
            vec![
                Effect::SubmitMessage(OutgoingMessage {
                    client_id: identity.user_id.to_string(),
                    conversation_id: identity.conversation_id.clone(),
                    content: ChatContent::Text(text),
                }),
                Effect::CallSupervisor { summary },
            ]
        }
        Msg::ApplyChangeClicked { notification_id } => {
            if state.kind() != PageKind::Dashboard {
                return (state, Vec::new());
            }
            let action = state
                .find_news(notification_id)
                .and_then(|notification| notification.action.clone());
            match action {
                Some(action) => vec![Effect::CallSupervisor {
                    summary: apply_change_summary(state.identity().user_id, &action),
                }],
                None => Vec::new(),
            }
        }
        Msg::RecordingStarted => {
            if state.compose_enabled() {
                state.set_recording(true);
            }
            Vec::new()
        }
        Msg::RecordingStopped {
            audio_url,
            duration_secs,
            sent_at,
        } => {
            if !state.is_recording() {
                return (state, Vec::new());
            }
            state.set_recording(false);
            let content = ChatContent::Audio {
                url: audio_url,
                duration_secs,
            };
            state.append_local(sent_at, content.clone());

            let identity = state.identity();
            vec![Effect::SubmitMessage(OutgoingMessage {
                client_id: identity.user_id.to_string(),
                conversation_id: identity.conversation_id.clone(),
                content,
            })]
        }
        Msg::RecordingDenied { reason } => {
            state.set_recording(false);
            state.raise_alert(format!(
                "Microphone access denied ({reason}). Allow microphone access to record audio."
            ));
            Vec::new()
        }
        Msg::AlertDismissed => {
            state.dismiss_alert();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
