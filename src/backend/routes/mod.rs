//! Routes Module
//!
//! - **`router`** - `create_router`, HTTP layers
//! - **`api_routes`** - `/api/messages` routes

/// Message API routes
pub mod api_routes;

/// Router assembly
pub mod router;

pub use router::create_router;
