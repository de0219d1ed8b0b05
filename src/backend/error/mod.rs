//! Backend Error Module
//!
//! - **`types`** - `BackendError` and its status/kind mapping
//! - **`conversion`** - `IntoResponse` for JSON error bodies
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - Error conversion implementations
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;
