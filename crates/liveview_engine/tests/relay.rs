use std::time::Duration;

use liveview_core::{chat_summary, ChatContent, OutgoingMessage};
use liveview_engine::{ActionRelay, BackendSettings, FailureKind};
use serde_json::json;
use tokio::runtime::Handle;
use tokio::time::timeout;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn relay_for(server: &MockServer) -> ActionRelay {
    let settings = BackendSettings::new(&server.uri()).expect("valid mock uri");
    ActionRelay::new(settings, Handle::current()).expect("client builds")
}

#[tokio::test(flavor = "multi_thread")]
async fn text_message_is_posted_with_backend_field_names() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(body_json(json!({
            "client_id": "1",
            "conversation_id": "conv_1",
            "text": "Need more bricks",
            "audioUrl": null,
            "audioDuration": null,
            "sender": "me",
            "type": "text"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let message = OutgoingMessage {
        client_id: "1".to_string(),
        conversation_id: "conv_1".to_string(),
        content: ChatContent::Text("Need more bricks".to_string()),
    };
    relay_for(&server)
        .post_message(&message)
        .await
        .expect("post ok");
}

#[tokio::test(flavor = "multi_thread")]
async fn audio_message_carries_url_and_duration() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(body_json(json!({
            "client_id": "4",
            "conversation_id": "conv_9",
            "text": null,
            "audioUrl": "https://cdn.example/clip.wav",
            "audioDuration": 12,
            "sender": "me",
            "type": "audio"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let message = OutgoingMessage {
        client_id: "4".to_string(),
        conversation_id: "conv_9".to_string(),
        content: ChatContent::Audio {
            url: "https://cdn.example/clip.wav".to_string(),
            duration_secs: 12,
        },
    };
    let task = relay_for(&server).submit_message(message);
    timeout(Duration::from_secs(5), task)
        .await
        .expect("relay task finished")
        .expect("relay task did not panic");
}

#[tokio::test(flavor = "multi_thread")]
async fn supervisor_call_posts_the_summary() {
    let server = MockServer::start().await;
    let summary = chat_summary(1, "2025-09-12T10:00:00", "crane is down");
    Mock::given(method("POST"))
        .and(path("/call_supervisor"))
        .and(body_json(json!({ "message": summary })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let task = relay_for(&server).call_supervisor(summary);
    timeout(Duration::from_secs(5), task)
        .await
        .expect("relay task finished")
        .expect("relay task did not panic");
}

#[tokio::test(flavor = "multi_thread")]
async fn server_errors_are_returned_but_never_panic_the_spawned_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/call_supervisor"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let relay = relay_for(&server);
    let err = relay.post_summary("anything").await.expect_err("500");
    assert_eq!(err.kind, FailureKind::HttpStatus(500));

    let task = relay.call_supervisor("anything".to_string());
    timeout(Duration::from_secs(5), task)
        .await
        .expect("relay task finished")
        .expect("relay task did not panic");
}
