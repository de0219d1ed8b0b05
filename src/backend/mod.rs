//! Backend Module
//!
//! Server side of the direct-message system: an Axum HTTP API for the
//! message lifecycle and a Server-Sent Events stream for live delivery.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`chat`** - Message store, lifecycle rules, persistence, handlers
//! - **`realtime`** - Presence directory, event dispatcher, SSE stream
//! - **`auth`** - Token verification and the user directory
//! - **`media`** - Image storage collaborator
//! - **`middleware`** - `AuthUser` extractor
//! - **`error`** - Backend error type and HTTP mapping
//!
//! ```text
//! backend/
//! ├── mod.rs       - Module exports and documentation
//! ├── main.rs      - Server binary
//! ├── server/      - Server initialization and state
//! ├── routes/      - Route configuration
//! ├── chat/        - Message lifecycle
//! ├── realtime/    - Live delivery
//! ├── auth/        - Identity
//! ├── media/       - Image uploads
//! ├── middleware/  - Request extractors
//! └── error/       - Error types
//! ```
//!
//! # Request Flow
//!
//! A send, edit or delete is authenticated by `AuthUser`, applied by the
//! `MessageStore` (which runs the lifecycle checks against the current time),
//! and on success handed to the `EventDispatcher`, which pushes the delta to
//! the counterpart's channel if they are connected.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Message lifecycle
pub mod chat;

/// Real-time delivery
pub mod realtime;

/// Backend error types
pub mod error;

/// Authentication
pub mod auth;

/// Image storage
pub mod media;

/// Middleware for request processing
pub mod middleware;

pub use error::BackendError;
pub use server::{create_app, AppState};
