/**
 * Presence & Session Directory
 *
 * Maps a user to at most one live delivery channel. Registration is
 * last-connected-wins; unregistration is keyed by the (user, channel) pair so
 * that a late disconnect of a superseded channel never removes its successor.
 *
 * The directory is synchronous: it is called from request handlers and from
 * the `Drop` of a stream guard, and never holds its lock across an await.
 */
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{PoisonError, RwLock};

use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::shared::event::RealtimeEvent;

/// Identity of one live delivery channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(Uuid);

impl ChannelId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ChannelId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered channel: its id and the sending half of its event queue
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    pub id: ChannelId,
    sender: UnboundedSender<RealtimeEvent>,
}

impl ChannelHandle {
    pub fn new(id: ChannelId, sender: UnboundedSender<RealtimeEvent>) -> Self {
        Self { id, sender }
    }

    /// Queue an event without waiting. Returns false if the channel is gone.
    pub fn send(&self, event: RealtimeEvent) -> bool {
        self.sender.send(event).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Directory of connected users
pub trait PresenceDirectory: Send + Sync {
    /// Make `handle` the user's channel, returning the one it replaced
    fn register(&self, user_id: Uuid, handle: ChannelHandle) -> Option<ChannelHandle>;

    /// Remove the user's entry only if it still maps to `channel_id`
    ///
    /// Returns true if an entry was removed.
    fn unregister(&self, user_id: Uuid, channel_id: ChannelId) -> bool;

    fn lookup(&self, user_id: Uuid) -> Option<ChannelHandle>;

    fn list_active(&self) -> BTreeSet<Uuid>;
}

/// Process-local presence directory
#[derive(Debug, Default)]
pub struct InMemoryPresenceDirectory {
    channels: RwLock<HashMap<Uuid, ChannelHandle>>,
}

impl InMemoryPresenceDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresenceDirectory for InMemoryPresenceDirectory {
    fn register(&self, user_id: Uuid, handle: ChannelHandle) -> Option<ChannelHandle> {
        self.channels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id, handle)
    }

    fn unregister(&self, user_id: Uuid, channel_id: ChannelId) -> bool {
        let mut channels = self.channels.write().unwrap_or_else(PoisonError::into_inner);
        match channels.get(&user_id) {
            Some(current) if current.id == channel_id => {
                channels.remove(&user_id);
                true
            }
            _ => false,
        }
    }

    fn lookup(&self, user_id: Uuid) -> Option<ChannelHandle> {
        self.channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user_id)
            .cloned()
    }

    fn list_active(&self) -> BTreeSet<Uuid> {
        self.channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    fn handle() -> (ChannelHandle, tokio::sync::mpsc::UnboundedReceiver<RealtimeEvent>) {
        let (tx, rx) = unbounded_channel();
        (ChannelHandle::new(ChannelId::new(), tx), rx)
    }

    #[test]
    fn test_register_replaces_previous_channel() {
        let directory = InMemoryPresenceDirectory::new();
        let user = Uuid::new_v4();
        let (a, _rx_a) = handle();
        let (b, _rx_b) = handle();

        assert!(directory.register(user, a.clone()).is_none());
        let replaced = directory.register(user, b.clone()).unwrap();
        assert_eq!(replaced.id, a.id);
        assert_eq!(directory.lookup(user).unwrap().id, b.id);
    }

    #[test]
    fn test_stale_unregister_keeps_successor() {
        let directory = InMemoryPresenceDirectory::new();
        let user = Uuid::new_v4();
        let (a, _rx_a) = handle();
        let (b, _rx_b) = handle();
        directory.register(user, a.clone());
        directory.register(user, b.clone());

        assert!(!directory.unregister(user, a.id));
        assert_eq!(directory.lookup(user).unwrap().id, b.id);
        assert!(directory.list_active().contains(&user));

        assert!(directory.unregister(user, b.id));
        assert!(directory.lookup(user).is_none());
        assert!(directory.list_active().is_empty());
    }

    #[test]
    fn test_list_active() {
        let directory = InMemoryPresenceDirectory::new();
        let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
        let (h1, _rx1) = handle();
        let (h2, _rx2) = handle();
        directory.register(u1, h1);
        directory.register(u2, h2);
        assert_eq!(directory.list_active(), [u1, u2].into_iter().collect());
    }

    #[test]
    fn test_send_reports_closed_channel() {
        let (h, rx) = handle();
        assert!(h.send(RealtimeEvent::typing(Uuid::new_v4(), true)));
        drop(rx);
        assert!(h.is_closed());
        assert!(!h.send(RealtimeEvent::typing(Uuid::new_v4(), false)));
    }
}
