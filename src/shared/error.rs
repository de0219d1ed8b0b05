//! Shared Error Types
//!
//! This module defines the error taxonomy of the message lifecycle. The same
//! type is produced by the server-side store and decoded again by the client
//! agent, so both ends agree on what went wrong.
//!
//! # Error Categories
//!
//! - `ValidationError` - malformed or empty payloads
//! - `NotFound` - unknown message id
//! - `Forbidden` - the actor lacks rights for the requested transition
//! - `InvalidState` - the transition is disallowed by the message's current state
//! - `Internal` - unexpected failure, reported generically
//!
//! # Usage
//!
//! ```rust
//! use dmchat::shared::error::ChatError;
//!
//! let error = ChatError::validation("text", "Message must contain text or an image");
//! assert_eq!(error.kind(), "validation");
//! ```
use thiserror::Error;

/// Errors surfaced to the requester of a lifecycle operation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// Malformed or empty request payload
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// The referenced message does not exist
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message
        message: String,
    },

    /// The actor may not perform this transition
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Human-readable error message
        message: String,
    },

    /// The transition is not allowed in the message's current lifecycle state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Human-readable error message
        message: String,
    },

    /// Unexpected failure. The message never carries internal detail.
    #[error("Internal error: {message}")]
    Internal {
        /// Generic, client-safe message
        message: String,
    },
}

impl ChatError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create a new invalid-state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create the generic internal error
    pub fn internal() -> Self {
        Self::Internal {
            message: "Internal Server Error".to_string(),
        }
    }

    /// Stable machine-readable name of the error category
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ValidationError { .. } => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Forbidden { .. } => "forbidden",
            Self::InvalidState { .. } => "invalid_state",
            Self::Internal { .. } => "internal",
        }
    }

    /// Human-readable message without the category prefix
    pub fn message(&self) -> &str {
        match self {
            Self::ValidationError { message, .. }
            | Self::NotFound { message }
            | Self::Forbidden { message }
            | Self::InvalidState { message }
            | Self::Internal { message } => message,
        }
    }

    /// Rebuild an error from the `kind` and message of an error response
    ///
    /// Unknown kinds collapse into `Internal`.
    pub fn from_kind(kind: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            "validation" => Self::validation("request", message),
            "not_found" => Self::NotFound { message },
            "forbidden" => Self::Forbidden { message },
            "invalid_state" => Self::InvalidState { message },
            _ => Self::Internal { message },
        }
    }
}
