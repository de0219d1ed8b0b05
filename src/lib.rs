// Increase recursion limit for complex async operations
#![recursion_limit = "256"]

//! dmchat - Main Library
//!
//! dmchat is a one-to-one direct-messaging backend with realtime delivery,
//! plus the client synchronization agent that keeps a user's view of a
//! conversation consistent with the server.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between server and client
//!   - The message entity and its deletion flags
//!   - Visibility rules, realtime events, error taxonomy
//!   - Request bodies and configuration
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Message store and lifecycle authorizer
//!   - Presence directory and realtime dispatcher (SSE)
//!   - Axum routes, JWT authentication, PostgreSQL persistence
//!
//! - **`client`** - Client sync agent
//!   - HTTP client for the message routes
//!   - Event stream with reconnect backoff
//!   - Local conversation view patched by pushed deltas
//!
//! # Feature Flags
//!
//! - **`ssr`** - Server build (enables `backend`)
//!
//! # Usage
//!
//! ```rust,no_run
//! use dmchat::backend::server::init::create_app;
//! use dmchat::shared::config::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let app = create_app(&config).await;
//! let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Lifecycle Rules
//!
//! - Only the sender may edit; the first edit preserves the original text
//! - "Delete for me" hides a message from one party only
//! - "Delete for everyone" is sender-only, within 4 hours of sending, and
//!   leaves a redacted tombstone visible to both parties
//!
//! # Thread Safety
//!
//! - **Server**: shared state lives behind `Arc`; presence uses `RwLock`,
//!   delivery uses `mpsc` per channel and `broadcast` for the online set
//! - **Client**: the event hub runs on a Tokio task and fans out over
//!   `broadcast`

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;

/// Client synchronization agent
pub mod client;
