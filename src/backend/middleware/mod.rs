//! Middleware Module
//!
//! Request-level concerns shared by all routes.
//!
//! - **`auth`** - `AuthUser` extractor verifying the requester's token

pub mod auth;

pub use auth::AuthUser;
