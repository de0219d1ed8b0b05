//! Shared Module
//!
//! This module contains types shared between the server and the client
//! synchronization agent. Everything here is plain data plus pure functions,
//! so both ends derive identical views from the same stored state.

/// Message entity and deletion scope
pub mod message;

/// Real-time event system
pub mod event;

/// Shared error types
pub mod error;

/// What a viewer may see of a message
pub mod visibility;

/// Application configuration
pub mod config;

/// Request and response bodies
pub mod messaging;

/// Re-export commonly used types for convenience
pub use message::{DeleteScope, DeletionFlags, Message};
pub use event::{EventType, RealtimeEvent};
pub use error::ChatError;
pub use visibility::{filter_for, view_for, visible_to, MessageView};
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
