//! Real-time Module
//!
//! Live delivery of lifecycle deltas, typing indicators and presence changes
//! over Server-Sent Events.
//!
//! - **`presence`** - `PresenceDirectory`: user → current channel
//! - **`dispatcher`** - `EventDispatcher`: routes events to channels
//! - **`broadcast`** - directory-wide broadcast channel
//! - **`subscription`** - SSE handler for `GET /api/realtime`
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── presence.rs     - Presence directory
//! ├── dispatcher.rs   - Event dispatcher
//! ├── broadcast.rs    - Directory-wide broadcasting
//! └── subscription.rs - SSE subscription handler
//! ```

/// Directory-wide broadcasting
pub mod broadcast;

/// Event dispatcher
pub mod dispatcher;

/// Presence directory
pub mod presence;

/// Server-Sent Events subscription handler
pub mod subscription;

pub use broadcast::{broadcast_event, RealtimeEventBroadcast};
pub use dispatcher::{Connection, EventDispatcher};
pub use presence::{ChannelHandle, ChannelId, InMemoryPresenceDirectory, PresenceDirectory};
pub use subscription::handle_realtime_subscription;
