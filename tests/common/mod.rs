//! Common test utilities
//!
//! Builds the full router around in-memory collaborators and a manual clock,
//! and drives it with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use dmchat::backend::auth::sessions::create_token;
use dmchat::backend::auth::users::InMemoryUserDirectory;
use dmchat::backend::chat::clock::ManualClock;
use dmchat::backend::chat::lifecycle::LifecyclePolicy;
use dmchat::backend::chat::state::InMemoryMessageRepository;
use dmchat::backend::chat::store::MessageStore;
use dmchat::backend::media::{DisabledImageStore, ImageStore};
use dmchat::backend::realtime::dispatcher::EventDispatcher;
use dmchat::backend::realtime::presence::InMemoryPresenceDirectory;
use dmchat::backend::server::init::create_app_with_state;
use dmchat::backend::server::state::AppState;
use dmchat::shared::config::AppConfig;
use dmchat::shared::messaging::UserSummary;

pub const SECRET: &str = "integration-test-secret";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub alice: Uuid,
    pub bob: Uuid,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_images(Arc::new(DisabledImageStore))
    }

    pub fn with_images(images: Arc<dyn ImageStore>) -> Self {
        let config = AppConfig::builder().jwt_secret(SECRET).build().unwrap();
        let clock = Arc::new(ManualClock::new(start_time()));
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let users = InMemoryUserDirectory::new(vec![
            UserSummary::new(alice, "alice"),
            UserSummary::new(bob, "bob"),
            UserSummary::new(Uuid::new_v4(), "carol"),
        ]);

        let state = AppState {
            store: MessageStore::new(
                Arc::new(InMemoryMessageRepository::new()),
                clock.clone(),
                LifecyclePolicy::from(&config),
            ),
            dispatcher: EventDispatcher::new(Arc::new(InMemoryPresenceDirectory::new()), 64),
            users: Arc::new(users),
            images,
            jwt_secret: Arc::from(SECRET),
        };

        Self {
            router: create_app_with_state(state.clone(), &config),
            state,
            clock,
            alice,
            bob,
        }
    }

    pub fn token(&self, user_id: Uuid) -> String {
        create_token(user_id, SECRET, Duration::hours(1)).unwrap()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        as_user: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = as_user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(user)));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn send(&self, from: Uuid, to: Uuid, text: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            &format!("/api/messages/send/{}", to),
            Some(from),
            Some(serde_json::json!({ "text": text })),
        )
        .await
    }

    pub async fn conversation<T: DeserializeOwned>(&self, viewer: Uuid, counterpart: Uuid) -> T {
        let (status, body) = self
            .request(Method::GET, &format!("/api/messages/{}", counterpart), Some(viewer), None)
            .await;
        assert_eq!(status, StatusCode::OK, "conversation fetch failed: {}", body);
        serde_json::from_value(body).unwrap()
    }
}
