//! Message HTTP Handlers
//!
//! Thin adapters: authenticate, call the message store, dispatch the
//! confirmed delta to the counterpart, respond.
//!
//! Path and body extractors are taken as `Result` so a malformed request
//! gets the same JSON error body as every other rejection.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::backend::auth::users::UserDirectory;
use crate::backend::chat::store::MessageStore;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::message::{DeleteScope, Message};
use crate::shared::messaging::{
    DeleteMessageRequest, DeleteMessageResponse, EditMessageRequest, SendMessageRequest,
    UserSummary,
};

/// List counterpart users (GET /api/messages/users)
pub async fn list_users(
    State(users): State<Arc<dyn UserDirectory>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<UserSummary>>, BackendError> {
    Ok(Json(users.list_except(user_id).await?))
}

/// Fetch the conversation with a user, filtered for the requester
/// (GET /api/messages/{user_id})
pub async fn get_conversation(
    State(store): State<MessageStore>,
    AuthUser(user_id): AuthUser,
    counterpart: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<Message>>, BackendError> {
    let Path(counterpart_id) = counterpart?;
    Ok(Json(store.visible_conversation(user_id, counterpart_id).await?))
}

/// Send a message (POST /api/messages/send/{user_id})
///
/// The image payload, if any, is uploaded after validation.
pub async fn send_message(
    State(state): State<AppState>,
    AuthUser(sender_id): AuthUser,
    receiver: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Message>), BackendError> {
    let Path(receiver_id) = receiver?;
    let Json(request) = body?;
    let validated = state.store.policy().validate_send(
        sender_id,
        receiver_id,
        request.text,
        request.image,
    )?;

    let image_url = match &validated.image_url {
        Some(payload) => Some(state.images.upload(payload).await?),
        None => None,
    };

    let message = state
        .store
        .create(sender_id, receiver_id, validated.text, image_url)
        .await?;
    state.dispatcher.message_created(&message);

    Ok((StatusCode::CREATED, Json(message)))
}

/// Edit a message (PUT /api/messages/edit/{message_id})
pub async fn edit_message(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    message: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<EditMessageRequest>, JsonRejection>,
) -> Result<Json<Message>, BackendError> {
    let Path(message_id) = message?;
    let Json(request) = body?;
    let message = state
        .store
        .apply_edit(message_id, user_id, request.text)
        .await?;
    state.dispatcher.message_edited(&message);
    Ok(Json(message))
}

/// Delete a message (DELETE /api/messages/delete/{message_id})
pub async fn delete_message(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    message: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<DeleteMessageRequest>, JsonRejection>,
) -> Result<Json<DeleteMessageResponse>, BackendError> {
    let Path(message_id) = message?;
    let Json(request) = body?;
    let scope: DeleteScope = request.delete_type.parse()?;
    let message = state.store.apply_delete(message_id, user_id, scope).await?;
    state.dispatcher.message_deleted(&message, scope);

    Ok(Json(DeleteMessageResponse {
        message: match scope {
            DeleteScope::ForMe => "Message deleted for you".to_string(),
            DeleteScope::ForEveryone => "Message deleted for everyone".to_string(),
        },
    }))
}
