/**
 * Message API Routes
 *
 * # Routes
 *
 * - `GET /api/messages/users` - Counterpart users, excluding the requester
 * - `GET /api/messages/{user_id}` - Conversation, filtered for the requester
 * - `POST /api/messages/send/{user_id}` - Send text and/or image
 * - `PUT /api/messages/edit/{message_id}` - Edit own message
 * - `DELETE /api/messages/delete/{message_id}` - Delete for me / for everyone
 * - `POST /api/messages/typing` - Typing indicator
 *
 * All routes require a valid token (see `AuthUser`).
 */
use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::backend::chat::handlers::{
    delete_message, edit_message, get_conversation, handle_typing_event, list_users,
    send_message,
};
use crate::backend::server::state::AppState;

/// Configure the message routes
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/messages/users", get(list_users))
        .route("/api/messages/typing", post(handle_typing_event))
        .route("/api/messages/send/{user_id}", post(send_message))
        .route("/api/messages/edit/{message_id}", put(edit_message))
        .route("/api/messages/delete/{message_id}", delete(delete_message))
        .route("/api/messages/{user_id}", get(get_conversation))
}
