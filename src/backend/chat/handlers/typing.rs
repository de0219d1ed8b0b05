/**
 * Typing Indicator Handler
 *
 * `POST /api/messages/typing` relays a typing start/stop from the requester
 * to the counterpart's live channel. Indicators are never persisted and are
 * dropped when the counterpart is offline.
 *
 * # Example Request
 *
 * ```http
 * POST /api/messages/typing HTTP/1.1
 * Authorization: Bearer <token>
 * Content-Type: application/json
 *
 * {"receiver_id":"6f1c...","is_typing":true}
 * ```
 */
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::dispatcher::EventDispatcher;
use crate::shared::error::ChatError;
use crate::shared::messaging::TypingRequest;

/// Handle typing indicator event (POST /api/messages/typing)
pub async fn handle_typing_event(
    State(dispatcher): State<EventDispatcher>,
    AuthUser(sender_id): AuthUser,
    body: Result<Json<TypingRequest>, JsonRejection>,
) -> Result<StatusCode, BackendError> {
    let Json(request) = body?;
    if request.receiver_id == sender_id {
        return Err(ChatError::validation("receiver_id", "Cannot send typing events to yourself").into());
    }

    tracing::debug!(
        sender_id = %sender_id,
        receiver_id = %request.receiver_id,
        is_typing = request.is_typing,
        "[Server] Typing event"
    );
    dispatcher.typing(sender_id, request.receiver_id, request.is_typing);
    Ok(StatusCode::OK)
}
