//! Chat Backend Module
//!
//! Server-side message lifecycle: storage, authorization and the HTTP
//! handlers on top of them.
//!
//! # Architecture
//!
//! - **`store`** - `MessageStore`, the sole mutator of messages
//! - **`lifecycle`** - `LifecyclePolicy`, who may do what and when
//! - **`clock`** - injectable time source
//! - **`repository`** - `MessageRepository` persistence seam
//! - **`state`** - in-memory repository
//! - **`db`** - PostgreSQL repository
//! - **`handlers`** - `/api/messages` handlers
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use dmchat::backend::chat::{InMemoryMessageRepository, LifecyclePolicy, MessageStore, SystemClock};
//! use uuid::Uuid;
//!
//! # #[tokio::main] async fn main() {
//! let store = MessageStore::new(
//!     Arc::new(InMemoryMessageRepository::new()),
//!     Arc::new(SystemClock),
//!     LifecyclePolicy::default(),
//! );
//! let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
//! let message = store.create(alice, bob, Some("hi".into()), None).await.unwrap();
//! assert_eq!(store.visible_conversation(bob, alice).await.unwrap(), vec![message]);
//! # }
//! ```

/// Time source
pub mod clock;

/// PostgreSQL message repository
pub mod db;

/// HTTP handlers
pub mod handlers;

/// Lifecycle authorizer
pub mod lifecycle;

/// Persistence seam
pub mod repository;

/// In-memory message repository
pub mod state;

/// Message store
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use db::PgMessageRepository;
pub use lifecycle::{LifecyclePolicy, NewMessage};
pub use repository::{EditOutcome, MessageRepository, RepositoryError};
pub use state::InMemoryMessageRepository;
pub use store::MessageStore;
