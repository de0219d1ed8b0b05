//! Message Request Bodies
//!
//! JSON bodies accepted and returned by the `/api/messages` routes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to send a message
///
/// `image` carries the raw image payload (data URI or base64); the server
/// stores only the reference URL returned by the image storage service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl SendMessageRequest {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            image: None,
        }
    }
}

/// Request to edit a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditMessageRequest {
    pub text: String,
}

/// Request to delete a message
///
/// `delete_type` is `"forMe"` or `"forEveryone"`; anything else is a
/// validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteMessageRequest {
    pub delete_type: String,
}

/// Response after deleting a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteMessageResponse {
    pub message: String,
}

/// Typing indicator from the requester towards `receiver_id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingRequest {
    pub receiver_id: Uuid,
    pub is_typing: bool,
}

/// Error body returned by every failing route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub kind: Option<String>,
    pub status: u16,
}
