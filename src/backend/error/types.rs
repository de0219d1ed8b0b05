/**
 * Backend Error Types
 *
 * This module defines the error type returned by every HTTP handler and by
 * the message store.
 *
 * # Error Categories
 *
 * ## Lifecycle errors
 *
 * `Chat` wraps the shared `ChatError` taxonomy. These are the requester's
 * fault and are reported verbatim:
 * - Validation → 400
 * - NotFound → 404
 * - Forbidden → 403
 * - InvalidState → 409
 *
 * ## Infrastructure errors
 *
 * Repository and media failures are logged with full detail and reported
 * to the client as a generic 500.
 *
 * ## Handler errors
 *
 * Request-level problems detected in handlers or extractors: a body or
 * path that does not parse (400, kind `validation`) and a missing or
 * invalid token (401).
 */
use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::chat::repository::RepositoryError;
use crate::backend::media::MediaError;
use crate::shared::error::ChatError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use dmchat::backend::error::BackendError;
/// use dmchat::shared::error::ChatError;
///
/// let err: BackendError = ChatError::forbidden("You can only edit your own messages").into();
/// assert_eq!(err.status_code().as_u16(), 403);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Lifecycle rule violation
    #[error(transparent)]
    Chat(#[from] ChatError),

    /// Persistence failure
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Image storage failure
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Handler error (e.g., malformed request)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Missing or invalid credentials
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Chat(err) => match err {
                ChatError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                ChatError::NotFound { .. } => StatusCode::NOT_FOUND,
                ChatError::Forbidden { .. } => StatusCode::FORBIDDEN,
                ChatError::InvalidState { .. } => StatusCode::CONFLICT,
                ChatError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Media(MediaError::Disabled) => StatusCode::BAD_REQUEST,
            Self::Repository(_) | Self::Media(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::HandlerError { status, .. } => *status,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        }
    }

    /// Machine-readable category, matching `ChatError::kind` where one applies
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Chat(err) => err.kind(),
            Self::Media(MediaError::Disabled) => "validation",
            Self::Repository(_) | Self::Media(_) => "internal",
            Self::HandlerError { status, .. } if status.is_server_error() => "internal",
            Self::HandlerError { .. } => "validation",
            Self::Unauthorized { .. } => "unauthorized",
        }
    }

    /// Client-safe error message
    ///
    /// Internal failures never expose their detail.
    pub fn message(&self) -> String {
        match self {
            Self::Chat(err) => err.message().to_string(),
            Self::Media(MediaError::Disabled) => "Image uploads are not enabled".to_string(),
            Self::HandlerError { status, .. } if status.is_server_error() => {
                ChatError::internal().message().to_string()
            }
            Self::HandlerError { message, .. } => message.clone(),
            Self::Unauthorized { message } => message.clone(),
            Self::Repository(_) | Self::Media(_) => ChatError::internal().message().to_string(),
        }
    }
}
