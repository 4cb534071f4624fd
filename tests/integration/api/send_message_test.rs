//! Send message integration tests
//!
//! Exercises `POST /api/message/send` through the full router: request
//! validation, authorization, persistence and the two realtime publishes.

use axum::http::StatusCode;
use bytes::Bytes;
use pretty_assertions::assert_eq;
use serde_json::json;
use serde_json::Value;
use xfchat::backend::messaging::{INCOMING_MESSAGE_EVENT, NEW_MESSAGE_EVENT};
use xfchat::backend::realtime::MAX_PAYLOAD_BYTES;
use xfchat::backend::store::{KeyValueStore, OrderedLog};
use xfchat::shared::Message;

use crate::assert_response;
use crate::common::{forged_token_for, token_for, TestApp, ADA_IMAGE};

const SEND: &str = "/api/message/send";

async fn stored_messages(app: &TestApp, chat_id: &str) -> Vec<Message> {
    app.store
        .range_by_score(&format!("chat:{}:messages", chat_id), 0, i64::MAX)
        .await
        .unwrap()
        .iter()
        .map(|member| Message::from_log_member(member).unwrap())
        .collect()
}

#[tokio::test]
async fn test_send_message_persists_and_publishes() {
    let app = TestApp::spawn().await;
    let before = chrono::Utc::now().timestamp_millis();

    let response = app
        .server
        .post(SEND)
        .authorization_bearer(token_for("u1"))
        .json(&json!({"text": "hello", "chatId": "u1--u2"}))
        .await;
    assert_response!(response, StatusCode::OK, "OK");

    let stored = stored_messages(&app, "u1--u2").await;
    assert_eq!(stored.len(), 1);
    let message = &stored[0];
    assert_eq!(message.sender_id, "u1");
    assert_eq!(message.text, "hello");
    assert_eq!(message.id.len(), 32);
    assert!(message.timestamp >= before);

    let published = app.publisher.published();
    assert_eq!(published.len(), 2);

    assert_eq!(published[0].channel, "chat__u1--u2");
    assert_eq!(published[0].event, INCOMING_MESSAGE_EVENT);
    assert_eq!(published[0].payload, serde_json::to_value(message).unwrap());

    assert_eq!(published[1].channel, "user__u2__chats");
    assert_eq!(published[1].event, NEW_MESSAGE_EVENT);
    assert_eq!(
        published[1].payload,
        json!({
            "id": message.id,
            "senderId": "u1",
            "text": "hello",
            "timestamp": message.timestamp,
            "senderImg": ADA_IMAGE,
            "senderName": "Ada",
        })
    );
}

#[tokio::test]
async fn test_either_participant_can_send() {
    let app = TestApp::spawn().await;

    let response = app
        .server
        .post(SEND)
        .authorization_bearer(token_for("u2"))
        .json(&json!({"text": "hi back", "chatId": "u1--u2"}))
        .await;
    assert_response!(response, StatusCode::OK, "OK");

    let published = app.publisher.published();
    assert_eq!(published[1].channel, "user__u1__chats");
    assert_eq!(published[1].payload["senderName"], "Grace");
}

#[tokio::test]
async fn test_messages_keep_arrival_order() {
    let app = TestApp::spawn().await;

    for text in ["one", "two", "three"] {
        let response = app
            .server
            .post(SEND)
            .authorization_bearer(token_for("u1"))
            .json(&json!({"text": text, "chatId": "u1--u2"}))
            .await;
        assert_response!(response, StatusCode::OK);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let texts: Vec<_> = stored_messages(&app, "u1--u2")
        .await
        .into_iter()
        .map(|m| m.text)
        .collect();
    assert_eq!(texts, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn test_missing_body_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .server
        .post(SEND)
        .authorization_bearer(token_for("u1"))
        .await;
    assert_response!(response, StatusCode::BAD_REQUEST, "Missing request body");
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .server
        .post(SEND)
        .authorization_bearer(token_for("u1"))
        .bytes(Bytes::from_static(b"{\"text\": \"hi\""))
        .await;
    assert_response!(response, StatusCode::BAD_REQUEST, "Invalid request body");
}

#[tokio::test]
async fn test_missing_fields_are_rejected() {
    let app = TestApp::spawn().await;

    for body in [
        json!({"chatId": "u1--u2"}),
        json!({"text": "hi"}),
        json!({"text": "", "chatId": "u1--u2"}),
        json!({"text": "hi", "chatId": ""}),
    ] {
        let response = app
            .server
            .post(SEND)
            .authorization_bearer(token_for("u1"))
            .json(&body)
            .await;
        assert_response!(response, StatusCode::BAD_REQUEST, "Missing required fields");
    }
    assert!(app.publisher.published().is_empty());
}

#[tokio::test]
async fn test_body_is_checked_before_session() {
    let app = TestApp::spawn().await;

    let response = app.server.post(SEND).json(&json!({"text": "hi"})).await;
    assert_response!(response, StatusCode::BAD_REQUEST, "Missing required fields");
}

#[tokio::test]
async fn test_requests_without_valid_session_are_unauthorized() {
    let app = TestApp::spawn().await;
    let body = json!({"text": "hi", "chatId": "u1--u2"});

    let anonymous = app.server.post(SEND).json(&body).await;
    assert_response!(anonymous, StatusCode::UNAUTHORIZED, "Unauthorized");

    let forged = app
        .server
        .post(SEND)
        .authorization_bearer(forged_token_for("u1"))
        .json(&body)
        .await;
    assert_response!(forged, StatusCode::UNAUTHORIZED, "Unauthorized");

    assert!(stored_messages(&app, "u1--u2").await.is_empty());
}

#[tokio::test]
async fn test_non_participant_is_unauthorized() {
    let app = TestApp::spawn().await;

    let response = app
        .server
        .post(SEND)
        .authorization_bearer(token_for("u3"))
        .json(&json!({"text": "let me in", "chatId": "u1--u2"}))
        .await;
    assert_response!(response, StatusCode::UNAUTHORIZED, "Unauthorized");

    assert!(stored_messages(&app, "u1--u2").await.is_empty());
    assert!(app.publisher.published().is_empty());
}

#[tokio::test]
async fn test_malformed_chat_id_is_unauthorized() {
    let app = TestApp::spawn().await;

    for chat_id in ["u1-u2", "u1--", "u1--u2--u3"] {
        let response = app
            .server
            .post(SEND)
            .authorization_bearer(token_for("u1"))
            .json(&json!({"text": "hi", "chatId": chat_id}))
            .await;
        assert_response!(response, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_non_friend_is_unauthorized() {
    let app = TestApp::spawn().await;

    let response = app
        .server
        .post(SEND)
        .authorization_bearer(token_for("u1"))
        .json(&json!({"text": "hi", "chatId": "u1--u3"}))
        .await;
    assert_response!(response, StatusCode::UNAUTHORIZED, "Unauthorized");

    let self_chat = app
        .server
        .post(SEND)
        .authorization_bearer(token_for("u1"))
        .json(&json!({"text": "note to self", "chatId": "u1--u1"}))
        .await;
    assert_response!(self_chat, StatusCode::UNAUTHORIZED);

    assert!(stored_messages(&app, "u1--u3").await.is_empty());
    assert!(app.publisher.published().is_empty());
}

#[tokio::test]
async fn test_missing_sender_profile_fails() {
    let app = TestApp::spawn().await;

    let response = app
        .server
        .post(SEND)
        .authorization_bearer(token_for("u4"))
        .json(&json!({"text": "hi", "chatId": "u1--u4"}))
        .await;
    assert_response!(
        response,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Profile not found for user u4"
    );
    assert!(stored_messages(&app, "u1--u4").await.is_empty());
}

#[tokio::test]
async fn test_malformed_sender_profile_fails() {
    let app = TestApp::spawn().await;

    let response = app
        .server
        .post(SEND)
        .authorization_bearer(token_for("u5"))
        .json(&json!({"text": "hi", "chatId": "u5--u1"}))
        .await;
    assert_response!(response, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(stored_messages(&app, "u5--u1").await.is_empty());
    assert!(app.publisher.published().is_empty());
}

#[tokio::test]
async fn test_profile_with_null_fields_still_sends() {
    let app = TestApp::spawn().await;
    app.store
        .set(
            "user:u1",
            r#"{"id":"u1","name":"Ada","email":"a@x","image":null}"#,
        )
        .await
        .unwrap();

    let response = app
        .server
        .post(SEND)
        .authorization_bearer(token_for("u1"))
        .json(&json!({"text": "hi", "chatId": "u1--u2"}))
        .await;
    assert_response!(response, StatusCode::OK, "OK");

    assert_eq!(stored_messages(&app, "u1--u2").await.len(), 1);
    let published = app.publisher.published();
    assert_eq!(published.len(), 2);
    assert_eq!(published[1].payload["senderName"], "Ada");
    assert_eq!(published[1].payload["senderImg"], Value::Null);
}

#[tokio::test]
async fn test_oversized_message_is_rejected_before_storing() {
    let app = TestApp::spawn().await;

    let response = app
        .server
        .post(SEND)
        .authorization_bearer(token_for("u1"))
        .json(&json!({"text": "x".repeat(2 * MAX_PAYLOAD_BYTES), "chatId": "u1--u2"}))
        .await;
    assert_response!(response, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.text().contains("byte limit"), "{}", response.text());

    assert!(stored_messages(&app, "u1--u2").await.is_empty());
    assert_eq!(app.publisher.attempts(), 0);
}

#[tokio::test]
async fn test_persist_failure_publishes_nothing() {
    let app = TestApp::builder().failing_log().build().await;

    let response = app
        .server
        .post(SEND)
        .authorization_bearer(token_for("u1"))
        .json(&json!({"text": "hi", "chatId": "u1--u2"}))
        .await;
    assert_response!(
        response,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Error processing message"
    );

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert_eq!(app.publisher.attempts(), 0);
}

#[tokio::test]
async fn test_publish_failure_is_retried_in_background() {
    let app = TestApp::builder().publish_failures(1).build().await;

    let response = app
        .server
        .post(SEND)
        .authorization_bearer(token_for("u1"))
        .json(&json!({"text": "eventually", "chatId": "u1--u2"}))
        .await;
    assert_response!(response, StatusCode::OK, "OK");
    assert_eq!(stored_messages(&app, "u1--u2").await.len(), 1);

    let mut channels: Vec<_> = app
        .publisher
        .wait_for(2)
        .await
        .into_iter()
        .map(|p| p.channel)
        .collect();
    channels.sort();
    assert_eq!(channels, vec!["chat__u1--u2", "user__u2__chats"]);
    assert_eq!(app.publisher.attempts(), 3);
}
