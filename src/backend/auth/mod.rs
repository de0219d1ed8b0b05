//! Authentication Module
//!
//! Identity is owned by an external authentication service. This module only
//! verifies the tokens it issues and reads the user list it maintains.
//!
//! - **`sessions`** - JWT verification (and minting, for tooling and tests)
//! - **`users`** - `UserDirectory` for the contact list

/// JWT token generation and validation
pub mod sessions;

/// User directory
pub mod users;

pub use sessions::{create_token, verify_token, Claims};
pub use users::{InMemoryUserDirectory, PgUserDirectory, UserDirectory};
