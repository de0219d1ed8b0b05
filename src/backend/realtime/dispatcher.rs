/**
 * Realtime Event Dispatcher
 *
 * Pushes confirmed lifecycle transitions, typing indicators and presence
 * changes to live channels. Delivery is at-most-once and fire-and-forget:
 * a counterpart without a channel simply misses the event, and nothing here
 * ever waits on a receiver.
 */
use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};
use uuid::Uuid;

use super::broadcast::{broadcast_event, RealtimeEventBroadcast};
use super::presence::{ChannelHandle, ChannelId, PresenceDirectory};
use crate::shared::event::RealtimeEvent;
use crate::shared::message::{DeleteScope, Message};

/// Receiving side of a freshly registered channel
#[derive(Debug)]
pub struct Connection {
    pub user_id: Uuid,
    pub channel_id: ChannelId,
    /// Events addressed to this user. Closes when the channel is superseded.
    pub events: mpsc::UnboundedReceiver<RealtimeEvent>,
    /// Directory-wide events
    pub directory: broadcast::Receiver<RealtimeEvent>,
}

#[derive(Clone)]
pub struct EventDispatcher {
    presence: Arc<dyn PresenceDirectory>,
    directory_tx: RealtimeEventBroadcast,
}

impl EventDispatcher {
    pub fn new(presence: Arc<dyn PresenceDirectory>, buffer: usize) -> Self {
        let (directory_tx, _) = broadcast::channel(buffer.max(1));
        Self {
            presence,
            directory_tx,
        }
    }

    /// Push an event to `user_id`'s channel, if any
    ///
    /// Returns whether the event was queued.
    pub fn push_to(&self, user_id: Uuid, event: RealtimeEvent) -> bool {
        let event_type = event.event_type();
        match self.presence.lookup(user_id) {
            Some(channel) => {
                let queued = channel.send(event);
                debug!(
                    user_id = %user_id,
                    channel_id = %channel.id,
                    event = event_type.as_str(),
                    queued,
                    "[Realtime] Pushed event"
                );
                queued
            }
            None => {
                debug!(
                    user_id = %user_id,
                    event = event_type.as_str(),
                    "[Realtime] Counterpart offline, event dropped"
                );
                false
            }
        }
    }

    /// Deliver a new message to its receiver
    pub fn message_created(&self, message: &Message) -> bool {
        self.push_to(message.receiver_id, RealtimeEvent::new_message(message))
    }

    /// Deliver an edit delta to the receiver. Only senders edit.
    pub fn message_edited(&self, message: &Message) -> bool {
        match RealtimeEvent::edited(message) {
            Some(event) => self.push_to(message.receiver_id, event),
            None => false,
        }
    }

    /// Deliver a deletion delta. Deleting for oneself is private and never pushed.
    pub fn message_deleted(&self, message: &Message, scope: DeleteScope) -> bool {
        match scope {
            DeleteScope::ForMe => false,
            DeleteScope::ForEveryone => {
                self.push_to(message.receiver_id, RealtimeEvent::deleted(message.id, scope))
            }
        }
    }

    /// Relay a typing indicator from `sender_id` to `receiver_id`
    pub fn typing(&self, sender_id: Uuid, receiver_id: Uuid, is_typing: bool) -> bool {
        self.push_to(receiver_id, RealtimeEvent::typing(sender_id, is_typing))
    }

    /// Register a new channel for `user_id`, superseding any previous one
    ///
    /// The directory subscription is taken before registering so the new
    /// stream sees the online set that includes itself.
    pub fn connect(&self, user_id: Uuid) -> Connection {
        let directory = self.directory_tx.subscribe();
        let (tx, events) = mpsc::unbounded_channel();
        let channel_id = ChannelId::new();

        // Dropping the replaced handle closes the superseded stream.
        let replaced = self
            .presence
            .register(user_id, ChannelHandle::new(channel_id, tx));
        info!(
            user_id = %user_id,
            channel_id = %channel_id,
            replaced = replaced.is_some(),
            "[Realtime] Channel registered"
        );
        drop(replaced);

        self.broadcast_online_users();
        Connection {
            user_id,
            channel_id,
            events,
            directory,
        }
    }

    /// Unregister a channel; a stale channel id is a no-op
    pub fn disconnect(&self, user_id: Uuid, channel_id: ChannelId) -> bool {
        let removed = self.presence.unregister(user_id, channel_id);
        info!(
            user_id = %user_id,
            channel_id = %channel_id,
            removed,
            "[Realtime] Channel closed"
        );
        if removed {
            self.broadcast_online_users();
        }
        removed
    }

    pub fn online_users(&self) -> BTreeSet<Uuid> {
        self.presence.list_active()
    }

    pub fn subscribe_directory(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.directory_tx.subscribe()
    }

    fn broadcast_online_users(&self) {
        broadcast_event(
            &self.directory_tx,
            RealtimeEvent::online_users(self.presence.list_active()),
        );
    }
}
