/**
 * Real-time Event System
 *
 * This module defines the events pushed over a user's live channel. Lifecycle
 * events carry the minimal delta needed for reconciliation: the full entity
 * for a new message, id plus changed fields for edits and deletions.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::shared::message::{DeleteScope, Message};

/// Type of real-time event, also used as the SSE event name
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
    NewMessage,
    MessageEdited,
    MessageDeleted,
    UserTyping,
    UserStoppedTyping,
    OnlineUsersChanged,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::NewMessage => "newMessage",
            EventType::MessageEdited => "messageEdited",
            EventType::MessageDeleted => "messageDeleted",
            EventType::UserTyping => "userTyping",
            EventType::UserStoppedTyping => "userStoppedTyping",
            EventType::OnlineUsersChanged => "onlineUsersChanged",
        }
    }
}

/// Real-time event pushed to a live channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum RealtimeEvent {
    /// A message was sent to the channel's user
    NewMessage(Message),
    /// A message the channel's user received was edited
    MessageEdited {
        message_id: Uuid,
        text: String,
        is_edited: bool,
        edited_at: DateTime<Utc>,
    },
    /// A message was deleted with the given scope
    MessageDeleted { message_id: Uuid, scope: DeleteScope },
    /// The counterpart started typing
    UserTyping { sender_id: Uuid },
    /// The counterpart stopped typing
    UserStoppedTyping { sender_id: Uuid },
    /// Directory-wide: the set of connected users changed
    OnlineUsersChanged { user_ids: BTreeSet<Uuid> },
}

impl RealtimeEvent {
    /// Create a new-message event
    pub fn new_message(message: &Message) -> Self {
        Self::NewMessage(message.clone())
    }

    /// Create an edit delta from the stored, already-edited message
    ///
    /// Returns `None` if the message has never been edited.
    pub fn edited(message: &Message) -> Option<Self> {
        Some(Self::MessageEdited {
            message_id: message.id,
            text: message.text.clone().unwrap_or_default(),
            is_edited: message.is_edited,
            edited_at: message.edited_at?,
        })
    }

    /// Create a deletion delta
    pub fn deleted(message_id: Uuid, scope: DeleteScope) -> Self {
        Self::MessageDeleted { message_id, scope }
    }

    /// Create a typing event
    pub fn typing(sender_id: Uuid, is_typing: bool) -> Self {
        if is_typing {
            Self::UserTyping { sender_id }
        } else {
            Self::UserStoppedTyping { sender_id }
        }
    }

    /// Create an online-users event
    pub fn online_users(user_ids: BTreeSet<Uuid>) -> Self {
        Self::OnlineUsersChanged { user_ids }
    }

    pub fn event_type(&self) -> EventType {
        match self {
            Self::NewMessage(_) => EventType::NewMessage,
            Self::MessageEdited { .. } => EventType::MessageEdited,
            Self::MessageDeleted { .. } => EventType::MessageDeleted,
            Self::UserTyping { .. } => EventType::UserTyping,
            Self::UserStoppedTyping { .. } => EventType::UserStoppedTyping,
            Self::OnlineUsersChanged { .. } => EventType::OnlineUsersChanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn message() -> Message {
        Message::new(Uuid::new_v4(), Uuid::new_v4(), Some("hi".to_string()), None, Utc::now())
    }

    #[test]
    fn test_event_new_message_carries_entity() {
        let m = message();
        let event = RealtimeEvent::new_message(&m);
        assert_eq!(event.event_type(), EventType::NewMessage);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "newMessage");
        assert_eq!(json["data"]["text"], "hi");
    }

    #[test]
    fn test_edit_delta_requires_edit() {
        let mut m = message();
        assert!(RealtimeEvent::edited(&m).is_none());

        m.apply_edit("hello".to_string(), Utc::now());
        let event = RealtimeEvent::edited(&m).unwrap();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "messageEdited");
        assert_eq!(json["data"]["message_id"], m.id.to_string());
        assert_eq!(json["data"]["text"], "hello");
        assert_eq!(json["data"]["is_edited"], true);
        // Delta only: no original text or participants.
        assert!(json["data"].get("original_text").is_none());
    }

    #[test]
    fn test_deleted_event_wire_format() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(RealtimeEvent::deleted(id, DeleteScope::ForEveryone)).unwrap();
        assert_eq!(json["type"], "messageDeleted");
        assert_eq!(json["data"]["scope"], "forEveryone");
    }

    #[test]
    fn test_event_typing() {
        let sender = Uuid::new_v4();
        assert_eq!(RealtimeEvent::typing(sender, true).event_type(), EventType::UserTyping);
        assert_eq!(
            RealtimeEvent::typing(sender, false),
            RealtimeEvent::UserStoppedTyping { sender_id: sender }
        );
    }

    #[test]
    fn test_event_serialization() {
        let users: BTreeSet<Uuid> = [Uuid::new_v4(), Uuid::new_v4()].into_iter().collect();
        let event = RealtimeEvent::online_users(users);
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: RealtimeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deserialized);
    }

    #[test]
    fn test_event_names_match_wire_tags() {
        let event = RealtimeEvent::typing(Uuid::new_v4(), false);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.event_type().as_str());
    }
}
