use std::time::Duration;

use liveview_core::{ChatContent, Sender, TaskStatus};
use liveview_engine::{BackendSettings, FailureKind, RecordSource, ReqwestSource};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source_for(server: &MockServer) -> ReqwestSource {
    let settings = BackendSettings::new(&server.uri()).expect("valid mock uri");
    ReqwestSource::new(settings).expect("client builds")
}

#[tokio::test]
async fn tasks_are_decoded_in_backend_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tasks": [
                {
                    "id": 7,
                    "title": "Inspect scaffold",
                    "status": "completed",
                    "assigned_workers": "Ana"
                },
                {
                    "id": 3,
                    "title": "Order rebar",
                    "status": "in_progress",
                    "due_date": "2025-09-20T00:00:00"
                }
            ],
            "count": 2
        })))
        .mount(&server)
        .await;

    let tasks = source_for(&server).tasks().await.expect("fetch ok");
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, 7);
    assert_eq!(tasks[0].assignee.as_deref(), Some("Ana"));
    assert_eq!(tasks[0].status, TaskStatus::Completed);
    assert_eq!(tasks[1].id, 3);
    assert_eq!(tasks[1].status, TaskStatus::InProgress);
}

#[tokio::test]
async fn http_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notifications"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = source_for(&server)
        .notifications()
        .await
        .expect_err("404 must fail");
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = source_for(&server).tasks().await.expect_err("html body");
    assert_eq!(err.kind, FailureKind::MalformedBody);
}

#[tokio::test]
async fn missing_list_field_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0})))
        .mount(&server)
        .await;

    let err = source_for(&server)
        .notifications()
        .await
        .expect_err("no list");
    assert_eq!(err.kind, FailureKind::MalformedBody);
}

#[tokio::test]
async fn malformed_records_are_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "notifications": [
                {"id": 1, "message": "Crane inspection due", "is_triggered": 1},
                {"message": "no id"},
                {
                    "id": 2,
                    "title": "Delivery window moved",
                    "is_triggered": 0,
                    "action_list": ["reschedule"]
                }
            ]
        })))
        .mount(&server)
        .await;

    let notifications = source_for(&server)
        .notifications()
        .await
        .expect("fetch ok");
    let ids: Vec<u64> = notifications.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(notifications[0].triggered);
    assert!(!notifications[1].triggered);
    assert_eq!(notifications[1].message, "Delivery window moved");
    assert!(notifications[1].action.is_some());
}

#[tokio::test]
async fn messages_are_fetched_per_user_and_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/messages/42/conv_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [
                {
                    "id": 1,
                    "text": "hi",
                    "sender": "me",
                    "type": "text",
                    "timestamp": "2025-09-12T10:00:00"
                },
                {
                    "id": 2,
                    "audioUrl": "https://cdn.example/r.wav",
                    "audioDuration": 65,
                    "sender": "helmet",
                    "type": "audio"
                }
            ]
        })))
        .mount(&server)
        .await;

    let messages = source_for(&server)
        .messages(42, "conv_1")
        .await
        .expect("fetch ok");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, ChatContent::Text("hi".to_string()));
    assert_eq!(messages[1].sender, Sender::Counterpart);
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"tasks": []}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let mut settings = BackendSettings::new(&server.uri()).expect("valid mock uri");
    settings.request_timeout = Duration::from_millis(50);
    let source = ReqwestSource::new(settings).expect("client builds");

    let err = source.tasks().await.expect_err("must time out");
    assert_eq!(err.kind, FailureKind::Timeout);
}
