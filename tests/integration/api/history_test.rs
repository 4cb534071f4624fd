//! Conversation history integration tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use xfchat::backend::store::OrderedLog;
use xfchat::shared::Message;

use crate::assert_response;
use crate::common::{token_for, TestApp};

async fn seed_history(app: &TestApp) {
    for (id, text, ts) in [("a", "first", 1_000), ("b", "second", 2_000), ("c", "third", 3_000)] {
        let member = Message::new(id, "u1", text, ts).to_log_member().unwrap();
        app.store
            .append("chat:u1--u2:messages", ts, &member)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_history_returns_whole_conversation() {
    let app = TestApp::spawn().await;
    seed_history(&app).await;

    let response = app
        .server
        .get("/api/message/u1--u2")
        .authorization_bearer(token_for("u2"))
        .await;
    assert_response!(response, StatusCode::OK);

    let messages: Vec<Message> = response.json();
    let texts: Vec<_> = messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_history_honours_range() {
    let app = TestApp::spawn().await;
    seed_history(&app).await;

    let response = app
        .server
        .get("/api/message/u1--u2")
        .add_query_param("start", 1_500)
        .add_query_param("end", 3_000)
        .authorization_bearer(token_for("u1"))
        .await;
    assert_response!(response, StatusCode::OK);

    let ids: Vec<String> = response
        .json::<Vec<Message>>()
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ids, vec!["b", "c"]);
}

#[tokio::test]
async fn test_inverted_range_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .server
        .get("/api/message/u1--u2")
        .add_query_param("start", 10)
        .add_query_param("end", 5)
        .authorization_bearer(token_for("u1"))
        .await;
    assert_response!(response, StatusCode::BAD_REQUEST, "Invalid range");
}

#[tokio::test]
async fn test_history_requires_participant() {
    let app = TestApp::spawn().await;
    seed_history(&app).await;

    let outsider = app
        .server
        .get("/api/message/u1--u2")
        .authorization_bearer(token_for("u3"))
        .await;
    assert_response!(outsider, StatusCode::UNAUTHORIZED, "Unauthorized");

    let anonymous = app.server.get("/api/message/u1--u2").await;
    assert_response!(anonymous, StatusCode::UNAUTHORIZED, "Unauthorized");
}

#[tokio::test]
async fn test_sent_message_appears_in_history() {
    let app = TestApp::spawn().await;

    let sent = app
        .server
        .post("/api/message/send")
        .authorization_bearer(token_for("u1"))
        .json(&serde_json::json!({"text": "round trip", "chatId": "u1--u2"}))
        .await;
    assert_response!(sent, StatusCode::OK);

    let messages: Vec<Message> = app
        .server
        .get("/api/message/u1--u2")
        .authorization_bearer(token_for("u2"))
        .await
        .json();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "round trip");
    assert_eq!(messages[0].sender_id, "u1");
}

#[tokio::test]
async fn test_health_and_fallback() {
    let app = TestApp::spawn().await;

    let health = app.server.get("/health").await;
    assert_response!(health, StatusCode::OK, "OK");

    let missing = app.server.get("/api/nope").await;
    assert_response!(missing, StatusCode::NOT_FOUND);
}
