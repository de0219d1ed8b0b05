//! Local Conversation View
//!
//! The client's cached, ordered copy of the open conversation. It is pure
//! state: the sync agent feeds it the initial fetch, the results of the
//! user's own requests, and pushed events, and reads back what to render.
//!
//! What is rendered always goes through the same visibility functions the
//! server uses, so a locally patched list matches a fresh fetch.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::shared::event::RealtimeEvent;
use crate::shared::message::{DeleteScope, DeletionFlags, Message};
use crate::shared::visibility::{filter_for, view_for, MessageView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationView {
    self_id: Uuid,
    counterpart_id: Uuid,
    messages: Vec<Message>,
    counterpart_typing: bool,
    last_error: Option<String>,
}

impl ConversationView {
    /// Start a view from a fetched conversation
    pub fn open(self_id: Uuid, counterpart_id: Uuid, messages: Vec<Message>) -> Self {
        let messages = filter_for(&messages, self_id);
        Self {
            self_id,
            counterpart_id,
            messages,
            counterpart_typing: false,
            last_error: None,
        }
    }

    pub fn self_id(&self) -> Uuid {
        self.self_id
    }

    pub fn counterpart_id(&self) -> Uuid {
        self.counterpart_id
    }

    pub fn is_counterpart_typing(&self) -> bool {
        self.counterpart_typing
    }

    /// The most recent failed request, for display
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn get(&self, message_id: Uuid) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    /// Messages this user may see, tombstones redacted
    pub fn visible(&self) -> Vec<Message> {
        filter_for(&self.messages, self.self_id)
    }

    /// Messages with their presentation
    pub fn rendered(&self) -> Vec<MessageView> {
        self.messages
            .iter()
            .filter_map(|m| view_for(m, self.self_id))
            .collect()
    }

    /// Merge a pushed event
    ///
    /// Returns whether the view changed. Events for other conversations and
    /// deltas for unknown ids are discarded.
    pub fn apply_event(&mut self, event: &RealtimeEvent) -> bool {
        match event {
            RealtimeEvent::NewMessage(message) => {
                if message.counterpart_of(self.self_id) != Some(self.counterpart_id) {
                    return false;
                }
                self.insert(message.clone())
            }
            RealtimeEvent::MessageEdited {
                message_id,
                text,
                edited_at,
                ..
            } => self.merge_edit(*message_id, text, *edited_at),
            RealtimeEvent::MessageDeleted { message_id, scope } => match scope {
                // The counterpart's private deletion never affects this view.
                DeleteScope::ForMe => false,
                DeleteScope::ForEveryone => self.merge_deletion(*message_id, DeletionFlags::everyone()),
            },
            RealtimeEvent::UserTyping { sender_id } if *sender_id == self.counterpart_id => {
                let changed = !self.counterpart_typing;
                self.counterpart_typing = true;
                changed
            }
            RealtimeEvent::UserStoppedTyping { sender_id } if *sender_id == self.counterpart_id => {
                let changed = self.counterpart_typing;
                self.counterpart_typing = false;
                changed
            }
            _ => false,
        }
    }

    /// Apply the confirmed result of the user's own send
    pub fn apply_sent(&mut self, message: Message) -> bool {
        self.last_error = None;
        if message.counterpart_of(self.self_id) != Some(self.counterpart_id) {
            return false;
        }
        self.insert(message)
    }

    /// Apply the confirmed result of the user's own edit
    pub fn apply_edited(&mut self, message: Message) -> bool {
        self.last_error = None;
        match self.messages.iter_mut().find(|m| m.id == message.id) {
            Some(existing) => {
                *existing = message;
                true
            }
            None => false,
        }
    }

    /// Apply the confirmed result of the user's own delete
    pub fn apply_deleted(&mut self, message_id: Uuid, scope: DeleteScope) -> bool {
        self.last_error = None;
        let flags = match scope {
            DeleteScope::ForEveryone => DeletionFlags::everyone(),
            DeleteScope::ForMe => match self.get(message_id) {
                Some(m) if m.sender_id == self.self_id => DeletionFlags::sender(),
                Some(_) => DeletionFlags::receiver(),
                None => return false,
            },
        };
        self.merge_deletion(message_id, flags)
    }

    /// Record a failed request; the cached messages stay as they were
    pub fn record_error(&mut self, error: impl ToString) {
        self.last_error = Some(error.to_string());
    }

    fn insert(&mut self, message: Message) -> bool {
        if self.messages.iter().any(|m| m.id == message.id) {
            return false;
        }
        // Keep creation order even if a push overtakes an earlier request result.
        let position = self
            .messages
            .iter()
            .rposition(|m| m.created_at <= message.created_at)
            .map_or(0, |i| i + 1);
        self.messages.insert(position, message);
        true
    }

    fn merge_edit(&mut self, message_id: Uuid, text: &str, edited_at: DateTime<Utc>) -> bool {
        match self.messages.iter_mut().find(|m| m.id == message_id) {
            Some(message) if !message.deleted_for_everyone => {
                message.apply_edit(text.to_string(), edited_at);
                true
            }
            _ => false,
        }
    }

    fn merge_deletion(&mut self, message_id: Uuid, flags: DeletionFlags) -> bool {
        match self.messages.iter_mut().find(|m| m.id == message_id) {
            Some(message) => {
                message.apply_deletion(flags);
                if message.deleted_for_everyone {
                    *message = message.redacted();
                }
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    struct Pair {
        me: Uuid,
        them: Uuid,
    }

    fn pair() -> Pair {
        Pair {
            me: Uuid::new_v4(),
            them: Uuid::new_v4(),
        }
    }

    fn msg(from: Uuid, to: Uuid, text: &str) -> Message {
        Message::new(from, to, Some(text.to_string()), None, Utc::now())
    }

    #[test]
    fn test_new_message_only_from_selected_counterpart() {
        let p = pair();
        let mut view = ConversationView::open(p.me, p.them, vec![]);

        let stranger = Uuid::new_v4();
        assert!(!view.apply_event(&RealtimeEvent::new_message(&msg(stranger, p.me, "psst"))));
        assert!(view.apply_event(&RealtimeEvent::new_message(&msg(p.them, p.me, "hi"))));
        assert_eq!(view.visible().len(), 1);
    }

    #[test]
    fn test_duplicate_new_message_ignored() {
        let p = pair();
        let m = msg(p.them, p.me, "hi");
        let mut view = ConversationView::open(p.me, p.them, vec![m.clone()]);
        assert!(!view.apply_event(&RealtimeEvent::new_message(&m)));
        assert_eq!(view.visible().len(), 1);
    }

    #[test]
    fn test_edit_delta_merges_by_id() {
        let p = pair();
        let m = msg(p.them, p.me, "hi");
        let mut view = ConversationView::open(p.me, p.them, vec![m.clone()]);

        let at = Utc::now();
        let event = RealtimeEvent::MessageEdited {
            message_id: m.id,
            text: "hello".into(),
            is_edited: true,
            edited_at: at,
        };
        assert!(view.apply_event(&event));
        let merged = view.get(m.id).unwrap();
        assert_eq!(merged.text.as_deref(), Some("hello"));
        assert!(merged.is_edited);
        assert_eq!(merged.edited_at, Some(at));
    }

    #[test]
    fn test_unknown_ids_discarded() {
        let p = pair();
        let mut view = ConversationView::open(p.me, p.them, vec![msg(p.them, p.me, "hi")]);
        let before = view.clone();

        assert!(!view.apply_event(&RealtimeEvent::MessageEdited {
            message_id: Uuid::new_v4(),
            text: "x".into(),
            is_edited: true,
            edited_at: Utc::now(),
        }));
        assert!(!view.apply_event(&RealtimeEvent::deleted(Uuid::new_v4(), DeleteScope::ForEveryone)));
        assert_eq!(view, before);
    }

    #[test]
    fn test_delete_for_everyone_becomes_tombstone() {
        let p = pair();
        let m = msg(p.them, p.me, "secret");
        let mut view = ConversationView::open(p.me, p.them, vec![m.clone()]);

        view.apply_event(&RealtimeEvent::deleted(m.id, DeleteScope::ForEveryone));
        let rendered = view.rendered();
        assert_eq!(rendered.len(), 1);
        assert!(rendered[0].is_tombstone());
        assert_eq!(rendered[0].message().text, None);
        assert_eq!(view.get(m.id).unwrap().original_text, None);
    }

    #[test]
    fn test_own_delete_for_me_hides_message() {
        let p = pair();
        let mine = msg(p.me, p.them, "oops");
        let theirs = msg(p.them, p.me, "hello");
        let mut view = ConversationView::open(p.me, p.them, vec![mine.clone(), theirs.clone()]);

        assert!(view.apply_deleted(mine.id, DeleteScope::ForMe));
        assert!(view.apply_deleted(theirs.id, DeleteScope::ForMe));
        assert!(view.visible().is_empty());
        assert!(view.get(mine.id).unwrap().deleted_for_sender);
        assert!(view.get(theirs.id).unwrap().deleted_for_receiver);
    }

    #[test]
    fn test_failure_leaves_state_unchanged() {
        let p = pair();
        let mut view = ConversationView::open(p.me, p.them, vec![msg(p.me, p.them, "hi")]);
        let before = view.visible();

        view.record_error("Messages older than 4 hours cannot be deleted for everyone");
        assert_eq!(view.visible(), before);
        assert!(view.last_error().unwrap().contains("4 hours"));

        view.apply_sent(msg(p.me, p.them, "next"));
        assert_eq!(view.last_error(), None);
    }

    #[test]
    fn test_out_of_order_insert_keeps_creation_order() {
        let p = pair();
        let t0 = Utc::now();
        let early = Message::new(p.me, p.them, Some("early".into()), None, t0);
        let late = Message::new(p.them, p.me, Some("late".into()), None, t0 + Duration::seconds(1));
        let mut view = ConversationView::open(p.me, p.them, vec![]);

        view.apply_event(&RealtimeEvent::new_message(&late));
        view.apply_sent(early);
        let texts: Vec<_> = view.visible().into_iter().map(|m| m.text.unwrap()).collect();
        assert_eq!(texts, vec!["early", "late"]);
    }

    #[test]
    fn test_typing_from_counterpart_only() {
        let p = pair();
        let mut view = ConversationView::open(p.me, p.them, vec![]);
        assert!(!view.apply_event(&RealtimeEvent::typing(Uuid::new_v4(), true)));
        assert!(view.apply_event(&RealtimeEvent::typing(p.them, true)));
        assert!(view.is_counterpart_typing());
        assert!(view.apply_event(&RealtimeEvent::typing(p.them, false)));
        assert!(!view.is_counterpart_typing());
    }

    #[test]
    fn test_open_filters_hidden_messages() {
        let p = pair();
        let mut hidden = msg(p.me, p.them, "gone");
        hidden.apply_deletion(DeletionFlags::sender());
        let view = ConversationView::open(p.me, p.them, vec![hidden]);
        assert!(view.visible().is_empty());
    }
}
