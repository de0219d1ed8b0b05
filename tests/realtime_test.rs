//! Realtime delivery integration tests
//!
//! Open `GET /api/realtime` through the router, decode the event stream with
//! the client's decoder, and check what each party receives.

#![cfg(feature = "ssr")]

mod common;

use std::time::Duration;

use axum::body::{Body, BodyDataStream};
use axum::http::{header, Method, Request, StatusCode};
use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use common::TestApp;
use dmchat::client::events::SseDecoder;
use dmchat::shared::event::RealtimeEvent;
use dmchat::shared::message::{DeleteScope, Message};

struct EventStream {
    body: BodyDataStream,
    decoder: SseDecoder,
    pending: Vec<RealtimeEvent>,
}

impl EventStream {
    async fn open(app: &TestApp, user: Uuid) -> Self {
        let request = Request::builder()
            .uri(format!("/api/realtime?token={}", app.token(user)))
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );
        Self {
            body: response.into_body().into_data_stream(),
            decoder: SseDecoder::new(),
            pending: Vec::new(),
        }
    }

    /// Next event, or `None` if the stream ended
    async fn next(&mut self) -> Option<RealtimeEvent> {
        loop {
            if !self.pending.is_empty() {
                return Some(self.pending.remove(0));
            }
            let chunk = tokio::time::timeout(Duration::from_secs(5), self.body.next())
                .await
                .expect("timed out waiting for an event")?
                .unwrap();
            for frame in self.decoder.push(&chunk) {
                self.pending.push(frame.decode().unwrap());
            }
        }
    }

    /// Next event that is not a presence update
    async fn next_message_event(&mut self) -> RealtimeEvent {
        loop {
            match self.next().await.expect("stream ended") {
                RealtimeEvent::OnlineUsersChanged { .. } => continue,
                event => return event,
            }
        }
    }
}

#[tokio::test]
async fn test_receiver_gets_lifecycle_deltas() {
    let app = TestApp::new();
    let mut bob = EventStream::open(&app, app.bob).await;

    match bob.next().await {
        Some(RealtimeEvent::OnlineUsersChanged { user_ids }) => {
            assert!(user_ids.contains(&app.bob));
        }
        other => panic!("expected online users first, got {:?}", other),
    }

    let (_, body) = app.send(app.alice, app.bob, "hi").await;
    let sent: Message = serde_json::from_value(body).unwrap();
    assert_eq!(bob.next_message_event().await, RealtimeEvent::new_message(&sent));

    let (_, body) = app
        .request(
            Method::PUT,
            &format!("/api/messages/edit/{}", sent.id),
            Some(app.alice),
            Some(json!({ "text": "hello" })),
        )
        .await;
    let edited: Message = serde_json::from_value(body).unwrap();
    assert_eq!(
        bob.next_message_event().await,
        RealtimeEvent::edited(&edited).unwrap()
    );

    app.request(
        Method::DELETE,
        &format!("/api/messages/delete/{}", sent.id),
        Some(app.alice),
        Some(json!({ "delete_type": "forEveryone" })),
    )
    .await;
    assert_eq!(
        bob.next_message_event().await,
        RealtimeEvent::deleted(sent.id, DeleteScope::ForEveryone)
    );
}

#[tokio::test]
async fn test_typing_relayed_to_counterpart() {
    let app = TestApp::new();
    let mut bob = EventStream::open(&app, app.bob).await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/messages/typing",
            Some(app.alice),
            Some(json!({ "receiver_id": app.bob, "is_typing": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        bob.next_message_event().await,
        RealtimeEvent::typing(app.alice, true)
    );

    app.request(
        Method::POST,
        "/api/messages/typing",
        Some(app.alice),
        Some(json!({ "receiver_id": app.bob, "is_typing": false })),
    )
    .await;
    assert_eq!(
        bob.next_message_event().await,
        RealtimeEvent::UserStoppedTyping { sender_id: app.alice }
    );
}

#[tokio::test]
async fn test_offline_receiver_still_gets_message_on_fetch() {
    let app = TestApp::new();
    let (status, _) = app.send(app.alice, app.bob, "while you were away").await;
    assert_eq!(status, StatusCode::CREATED);

    let messages: Vec<Message> = app.conversation(app.bob, app.alice).await;
    assert_eq!(messages.len(), 1);
}

#[tokio::test]
async fn test_closing_stream_marks_user_offline() {
    let app = TestApp::new();
    let mut alice = EventStream::open(&app, app.alice).await;
    let bob = EventStream::open(&app, app.bob).await;
    assert!(app.state.dispatcher.online_users().contains(&app.bob));

    drop(bob);
    assert!(!app.state.dispatcher.online_users().contains(&app.bob));

    // Alice sees bob join and then leave
    let mut saw_bob = false;
    loop {
        match alice.next().await {
            Some(RealtimeEvent::OnlineUsersChanged { user_ids }) => {
                if user_ids.contains(&app.bob) {
                    saw_bob = true;
                } else if saw_bob {
                    assert_eq!(user_ids.into_iter().collect::<Vec<_>>(), vec![app.alice]);
                    break;
                }
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_new_connection_supersedes_old_one() {
    let app = TestApp::new();
    let mut first = EventStream::open(&app, app.bob).await;
    let mut second = EventStream::open(&app, app.bob).await;

    // The superseded stream ends after at most a few presence updates.
    while let Some(event) = first.next().await {
        assert!(matches!(event, RealtimeEvent::OnlineUsersChanged { .. }));
    }
    drop(first);
    assert!(
        app.state.dispatcher.online_users().contains(&app.bob),
        "closing a superseded stream must not unregister the live one"
    );

    let (_, body) = app.send(app.alice, app.bob, "to the new tab").await;
    let sent: Message = serde_json::from_value(body).unwrap();
    assert_eq!(second.next_message_event().await, RealtimeEvent::new_message(&sent));
}
