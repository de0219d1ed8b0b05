//! Visibility Filter
//!
//! Pure functions deciding what a viewer may see of a stored message. Every
//! read path (the server's conversation fetch and the client's re-filter of
//! its cached list after a pushed event) goes through these functions so a
//! freshly fetched list and a locally patched one never diverge.

use uuid::Uuid;

use crate::shared::message::Message;

/// How a message is presented to one viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageView {
    /// Full content
    Content(Message),
    /// Deleted for everyone: structurally present, content withheld
    Tombstone(Message),
}

impl MessageView {
    pub fn message(&self) -> &Message {
        match self {
            MessageView::Content(message) | MessageView::Tombstone(message) => message,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        matches!(self, MessageView::Tombstone(_))
    }
}

/// Whether `viewer_id` may see `message` at all
///
/// A message deleted for everyone stays visible to both parties (as a
/// tombstone); otherwise each party's own deletion flag hides it from them.
pub fn visible_to(message: &Message, viewer_id: Uuid) -> bool {
    if message.deleted_for_everyone {
        return true;
    }
    if viewer_id == message.sender_id && message.deleted_for_sender {
        return false;
    }
    if viewer_id == message.receiver_id && message.deleted_for_receiver {
        return false;
    }
    true
}

/// Project a stored message for `viewer_id`
///
/// Tombstones carry a redacted copy, so original content can never be
/// recovered from what the viewer receives.
pub fn view_for(message: &Message, viewer_id: Uuid) -> Option<MessageView> {
    if !visible_to(message, viewer_id) {
        return None;
    }
    if message.deleted_for_everyone {
        Some(MessageView::Tombstone(message.redacted()))
    } else {
        Some(MessageView::Content(message.clone()))
    }
}

/// Filter and redact a conversation for `viewer_id`, preserving order
pub fn filter_for<'a, I>(messages: I, viewer_id: Uuid) -> Vec<Message>
where
    I: IntoIterator<Item = &'a Message>,
{
    messages
        .into_iter()
        .filter_map(|message| view_for(message, viewer_id))
        .map(|view| match view {
            MessageView::Content(message) | MessageView::Tombstone(message) => message,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::message::DeletionFlags;
    use chrono::Utc;

    fn message() -> Message {
        Message::new(Uuid::new_v4(), Uuid::new_v4(), Some("secret".to_string()), None, Utc::now())
    }

    #[test]
    fn test_plain_message_visible_to_both() {
        let m = message();
        assert!(visible_to(&m, m.sender_id));
        assert!(visible_to(&m, m.receiver_id));
    }

    #[test]
    fn test_deleted_for_sender_hidden_from_sender_only() {
        let mut m = message();
        m.apply_deletion(DeletionFlags::sender());
        assert!(!visible_to(&m, m.sender_id));
        assert!(visible_to(&m, m.receiver_id));
    }

    #[test]
    fn test_deleted_for_receiver_hidden_from_receiver_only() {
        let mut m = message();
        m.apply_deletion(DeletionFlags::receiver());
        assert!(visible_to(&m, m.sender_id));
        assert!(!visible_to(&m, m.receiver_id));
    }

    #[test]
    fn test_everyone_supersedes_side_flags() {
        let mut m = message();
        m.apply_deletion(DeletionFlags::sender());
        m.apply_deletion(DeletionFlags::everyone());

        let view = view_for(&m, m.sender_id).expect("tombstone stays visible");
        assert!(view.is_tombstone());
        assert_eq!(view.message().text, None);
    }

    #[test]
    fn test_filter_for_keeps_order_and_redacts() {
        let a = message();
        let mut b = Message::new(a.receiver_id, a.sender_id, Some("two".into()), None, Utc::now());
        b.apply_deletion(DeletionFlags::everyone());
        let mut c = Message::new(a.sender_id, a.receiver_id, Some("three".into()), None, Utc::now());
        c.apply_deletion(DeletionFlags::sender());

        let seen = filter_for([&a, &b, &c], a.sender_id);
        let ids: Vec<Uuid> = seen.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
        assert_eq!(seen[1].text, None);

        let seen_by_receiver = filter_for([&a, &b, &c], a.receiver_id);
        assert_eq!(seen_by_receiver.len(), 3);
    }
}
