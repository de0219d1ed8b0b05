//! Client Sync Agent
//!
//! Keeps a client's view of the open conversation consistent with the
//! server:
//!
//! - `api` - typed HTTP client for the message routes
//! - `events` - `text/event-stream` decoding
//! - `subscription` - the event hub with reconnect backoff, and scoped
//!   per-conversation subscriptions
//! - `conversation` - the local, visibility-filtered conversation view
//! - `agent` - `SyncAgent`, tying the above together
//!
//! # Usage
//!
//! ```rust,no_run
//! use dmchat::client::{ChatApiClient, ConnectionStatus, SyncAgent};
//! use uuid::Uuid;
//!
//! # async fn run(self_id: Uuid, counterpart: Uuid) -> Result<(), dmchat::client::ClientError> {
//! let api = ChatApiClient::new("http://localhost:3000", "jwt");
//! let mut agent = SyncAgent::connect(api, self_id);
//! agent.open_conversation(counterpart).await?;
//! agent.send_text("hi").await?;
//! // `None` also follows a refetch after lost events
//! while !matches!(agent.status(), ConnectionStatus::Disconnected | ConnectionStatus::Error(_)) {
//!     if let Some(event) = agent.next_event().await {
//!         println!("{:?}", event.event_type());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod api;
pub mod conversation;
pub mod events;
pub mod subscription;

pub use agent::SyncAgent;
pub use api::{ChatApiClient, ClientError};
pub use conversation::ConversationView;
pub use events::{SseDecoder, SseFrame};
pub use subscription::{ConnectionStatus, ConversationSubscription, Delivery, EventHub};
