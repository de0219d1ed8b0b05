//! Chat Handlers Module
//!
//! Axum handlers for the `/api/messages` routes.
//!
//! - **`messages`** - list users, fetch conversation, send, edit, delete
//! - **`typing`** - typing indicator relay
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and documentation
//! ├── messages.rs - Message lifecycle handlers
//! └── typing.rs   - Typing indicator handler
//! ```

/// Message lifecycle handlers
pub mod messages;

/// Typing indicator handler
pub mod typing;

pub use messages::{delete_message, edit_message, get_conversation, list_users, send_message};
pub use typing::handle_typing_event;
