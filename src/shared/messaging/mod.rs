//! Messaging Module
//!
//! Request and response bodies of the direct-message HTTP surface:
//!
//! - `UserSummary` - a counterpart user in the sidebar list
//! - `SendMessageRequest` / `EditMessageRequest` / `DeleteMessageRequest`
//! - `TypingRequest`
//!
//! # Usage
//!
//! ```rust
//! use dmchat::shared::messaging::{SendMessageRequest, UserSummary};
//! ```

pub mod contact;
pub mod requests;

// Re-export all types
pub use contact::UserSummary;
pub use requests::{
    DeleteMessageRequest, DeleteMessageResponse, EditMessageRequest, ErrorResponse,
    SendMessageRequest, TypingRequest,
};
