/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` holds the collaborators every handler may need:
 * - the message store (sole mutator of messages)
 * - the event dispatcher (and through it, the presence directory)
 * - the user directory for the contact list
 * - the image store for image sends
 * - the JWT secret used by the `AuthUser` extractor
 *
 * Everything is behind `Arc`, so cloning the state per request is cheap.
 */
use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::auth::users::UserDirectory;
use crate::backend::chat::store::MessageStore;
use crate::backend::media::ImageStore;
use crate::backend::realtime::dispatcher::EventDispatcher;

#[derive(Clone)]
pub struct AppState {
    pub store: MessageStore,
    pub dispatcher: EventDispatcher,
    pub users: Arc<dyn UserDirectory>,
    pub images: Arc<dyn ImageStore>,
    pub jwt_secret: Arc<str>,
}

impl FromRef<AppState> for MessageStore {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for EventDispatcher {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.dispatcher.clone()
    }
}

impl FromRef<AppState> for Arc<dyn UserDirectory> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.users.clone()
    }
}

impl FromRef<AppState> for Arc<dyn ImageStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.images.clone()
    }
}
