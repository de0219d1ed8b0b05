/**
 * Message Data Structure
 *
 * This module defines the direct message entity and its mutable lifecycle
 * flags. The struct is shared between the server (storage, responses) and
 * the client agent (local conversation view), and is serialized to JSON for
 * both HTTP responses and realtime events.
 *
 * # Lifecycle
 *
 * A message is created by a send, mutated in place by edits (text,
 * `is_edited`, `original_text`, `edited_at`) and by deletions (the three
 * boolean flags). It is never physically removed.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::shared::error::ChatError;

/// A direct message between two users
///
/// # Example
/// ```rust
/// use dmchat::shared::Message;
/// use uuid::Uuid;
///
/// let message = Message::new(Uuid::new_v4(), Uuid::new_v4(), Some("hi".into()), None, chrono::Utc::now());
/// assert!(!message.is_edited);
/// assert!(message.original_text.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message ID, assigned by the server
    pub id: Uuid,
    /// User who sent the message
    pub sender_id: Uuid,
    /// User the message was sent to
    pub receiver_id: Uuid,
    /// Text content
    #[serde(default)]
    pub text: Option<String>,
    /// Reference URL of an externally stored image
    #[serde(default)]
    pub image_url: Option<String>,
    /// Server-side creation time
    pub created_at: DateTime<Utc>,
    /// Whether the message has been edited at least once
    #[serde(default)]
    pub is_edited: bool,
    /// Text as it was before the first edit
    #[serde(default)]
    pub original_text: Option<String>,
    /// Time of the latest edit
    #[serde(default)]
    pub edited_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_for_sender: bool,
    #[serde(default)]
    pub deleted_for_receiver: bool,
    #[serde(default)]
    pub deleted_for_everyone: bool,
}

impl Message {
    /// Create a fresh, unedited and undeleted message
    pub fn new(
        sender_id: Uuid,
        receiver_id: Uuid,
        text: Option<String>,
        image_url: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            text,
            image_url,
            created_at,
            is_edited: false,
            original_text: None,
            edited_at: None,
            deleted_for_sender: false,
            deleted_for_receiver: false,
            deleted_for_everyone: false,
        }
    }

    /// Whether `user_id` is the sender or the receiver
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }

    /// The other participant relative to `user_id`
    ///
    /// Returns `None` when `user_id` is not a party to this message.
    pub fn counterpart_of(&self, user_id: Uuid) -> Option<Uuid> {
        if self.sender_id == user_id {
            Some(self.receiver_id)
        } else if self.receiver_id == user_id {
            Some(self.sender_id)
        } else {
            None
        }
    }

    /// Whether the message belongs to the conversation between `a` and `b`
    pub fn is_between(&self, a: Uuid, b: Uuid) -> bool {
        (self.sender_id == a && self.receiver_id == b)
            || (self.sender_id == b && self.receiver_id == a)
    }

    /// Replace the text, recording the pre-edit text on the first edit only
    pub fn apply_edit(&mut self, text: String, edited_at: DateTime<Utc>) {
        if !self.is_edited {
            self.original_text = self.text.clone();
        }
        self.text = Some(text);
        self.is_edited = true;
        self.edited_at = Some(edited_at);
    }

    /// Merge deletion flags. Flags are only ever set, never cleared.
    pub fn apply_deletion(&mut self, flags: DeletionFlags) {
        self.deleted_for_sender |= flags.for_sender;
        self.deleted_for_receiver |= flags.for_receiver;
        self.deleted_for_everyone |= flags.for_everyone;
    }

    /// Current deletion flags
    pub fn deletion_flags(&self) -> DeletionFlags {
        DeletionFlags {
            for_sender: self.deleted_for_sender,
            for_receiver: self.deleted_for_receiver,
            for_everyone: self.deleted_for_everyone,
        }
    }

    /// Copy with all content cleared, as served for a tombstone
    pub fn redacted(&self) -> Self {
        Self {
            text: None,
            image_url: None,
            original_text: None,
            ..self.clone()
        }
    }
}

/// The three independent deletion flags of a message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionFlags {
    pub for_sender: bool,
    pub for_receiver: bool,
    pub for_everyone: bool,
}

impl DeletionFlags {
    pub fn sender() -> Self {
        Self { for_sender: true, ..Self::default() }
    }

    pub fn receiver() -> Self {
        Self { for_receiver: true, ..Self::default() }
    }

    pub fn everyone() -> Self {
        Self { for_everyone: true, ..Self::default() }
    }
}

/// Scope of a delete request
///
/// Serialized as `"forMe"` / `"forEveryone"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeleteScope {
    /// Private, per-party hide
    ForMe,
    /// Global tombstone; sender only, time-boxed
    ForEveryone,
}

impl DeleteScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteScope::ForMe => "forMe",
            DeleteScope::ForEveryone => "forEveryone",
        }
    }
}

impl fmt::Display for DeleteScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeleteScope {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forMe" => Ok(DeleteScope::ForMe),
            "forEveryone" => Ok(DeleteScope::ForEveryone),
            _ => Err(ChatError::validation("delete_type", "Invalid delete type")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Message {
        Message::new(Uuid::new_v4(), Uuid::new_v4(), Some("hi".to_string()), None, Utc::now())
    }

    #[test]
    fn test_counterpart_of() {
        let message = sample();
        assert_eq!(message.counterpart_of(message.sender_id), Some(message.receiver_id));
        assert_eq!(message.counterpart_of(message.receiver_id), Some(message.sender_id));
        assert_eq!(message.counterpart_of(Uuid::new_v4()), None);
    }

    #[test]
    fn test_is_between_either_direction() {
        let message = sample();
        assert!(message.is_between(message.sender_id, message.receiver_id));
        assert!(message.is_between(message.receiver_id, message.sender_id));
        assert!(!message.is_between(message.sender_id, Uuid::new_v4()));
    }

    #[test]
    fn test_original_text_set_on_first_edit_only() {
        let mut message = sample();
        message.apply_edit("hello".to_string(), Utc::now());
        message.apply_edit("hey".to_string(), Utc::now());

        assert_eq!(message.text.as_deref(), Some("hey"));
        assert_eq!(message.original_text.as_deref(), Some("hi"));
        assert!(message.is_edited);
        assert!(message.edited_at.is_some());
    }

    #[test]
    fn test_first_edit_of_image_only_message() {
        let mut message = Message::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            Some("https://img.example/cat.png".to_string()),
            Utc::now(),
        );
        message.apply_edit("a cat".to_string(), Utc::now());
        message.apply_edit("my cat".to_string(), Utc::now());

        // The pre-edit text was absent and stays absent.
        assert_eq!(message.original_text, None);
        assert_eq!(message.text.as_deref(), Some("my cat"));
    }

    #[test]
    fn test_deletion_flags_never_unset() {
        let mut message = sample();
        message.apply_deletion(DeletionFlags::sender());
        message.apply_deletion(DeletionFlags::default());
        assert!(message.deleted_for_sender);

        message.apply_deletion(DeletionFlags::everyone());
        assert_eq!(
            message.deletion_flags(),
            DeletionFlags { for_sender: true, for_receiver: false, for_everyone: true }
        );
    }

    #[test]
    fn test_redacted_clears_content() {
        let mut message = sample();
        message.image_url = Some("https://img.example/1.png".to_string());
        message.apply_edit("hello".to_string(), Utc::now());

        let redacted = message.redacted();
        assert_eq!(redacted.text, None);
        assert_eq!(redacted.image_url, None);
        assert_eq!(redacted.original_text, None);
        assert_eq!(redacted.id, message.id);
        assert!(redacted.is_edited);
    }

    #[test]
    fn test_delete_scope_wire_names() {
        assert_eq!(serde_json::to_string(&DeleteScope::ForMe).unwrap(), "\"forMe\"");
        assert_eq!(
            serde_json::from_str::<DeleteScope>("\"forEveryone\"").unwrap(),
            DeleteScope::ForEveryone
        );
        assert_eq!("forMe".parse::<DeleteScope>().unwrap(), DeleteScope::ForMe);
        assert!("forAll".parse::<DeleteScope>().is_err());
    }
}
