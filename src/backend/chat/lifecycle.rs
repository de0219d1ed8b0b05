//! Lifecycle Authorizer
//!
//! Decides who may move a message into which state. These checks run inside
//! the message store's mutations against a freshly read message and the
//! current time; nothing here touches storage.
//!
//! Check order follows the request: existence first (handled by the store),
//! then the actor's rights, then the message's state.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::shared::config::{AppConfig, DEFAULT_DELETE_WINDOW_SECS};
use crate::shared::error::ChatError;
use crate::shared::message::{DeleteScope, DeletionFlags, Message};

/// Tunables of the lifecycle rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecyclePolicy {
    /// Maximum age at which a sender may still delete for everyone (inclusive)
    pub delete_for_everyone_window: Duration,
    /// Maximum text length in characters
    pub max_text_len: usize,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            delete_for_everyone_window: Duration::seconds(DEFAULT_DELETE_WINDOW_SECS as i64),
            max_text_len: 4000,
        }
    }
}

impl From<&AppConfig> for LifecyclePolicy {
    fn from(config: &AppConfig) -> Self {
        Self {
            delete_for_everyone_window: i64::try_from(config.delete_for_everyone_window_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
            max_text_len: config.max_message_length,
        }
    }
}

/// Validated content of a new message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub text: Option<String>,
    pub image_url: Option<String>,
}

impl LifecyclePolicy {
    /// Validate a send. Blank text counts as absent.
    pub fn validate_send(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        text: Option<String>,
        image_url: Option<String>,
    ) -> Result<NewMessage, ChatError> {
        if sender_id == receiver_id {
            return Err(ChatError::validation(
                "receiver_id",
                "You cannot send a message to yourself",
            ));
        }
        let text = text.filter(|t| !t.trim().is_empty());
        let image_url = image_url.filter(|url| !url.trim().is_empty());
        if text.is_none() && image_url.is_none() {
            return Err(ChatError::validation(
                "text",
                "Message must contain text or an image",
            ));
        }
        if let Some(text) = &text {
            self.check_length(text)?;
        }
        Ok(NewMessage {
            sender_id,
            receiver_id,
            text,
            image_url,
        })
    }

    /// Validate replacement text for an edit
    pub fn validate_edit_text(&self, text: &str) -> Result<(), ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::validation("text", "Edited text cannot be empty"));
        }
        self.check_length(text)
    }

    fn check_length(&self, text: &str) -> Result<(), ChatError> {
        if text.chars().count() > self.max_text_len {
            return Err(ChatError::validation(
                "text",
                format!("Message cannot exceed {} characters", self.max_text_len),
            ));
        }
        Ok(())
    }

    /// Authorize an edit of `message` by `requester_id`
    pub fn authorize_edit(&self, message: &Message, requester_id: Uuid) -> Result<(), ChatError> {
        if message.sender_id != requester_id {
            return Err(ChatError::forbidden("You can only edit your own messages"));
        }
        if message.deleted_for_everyone {
            return Err(ChatError::invalid_state(
                "Cannot edit a message that has been deleted for everyone",
            ));
        }
        Ok(())
    }

    /// Authorize a deletion and return the flags it sets
    ///
    /// `now` must be read at request time; the window boundary is inclusive.
    pub fn authorize_delete(
        &self,
        message: &Message,
        requester_id: Uuid,
        scope: DeleteScope,
        now: DateTime<Utc>,
    ) -> Result<DeletionFlags, ChatError> {
        match scope {
            DeleteScope::ForEveryone => {
                if message.sender_id != requester_id {
                    return Err(ChatError::forbidden(
                        "You can only delete your own messages for everyone",
                    ));
                }
                if message.deleted_for_everyone {
                    return Err(ChatError::invalid_state(
                        "Message has already been deleted for everyone",
                    ));
                }
                if now - message.created_at > self.delete_for_everyone_window {
                    return Err(ChatError::invalid_state(format!(
                        "Messages older than {} hours cannot be deleted for everyone",
                        self.delete_for_everyone_window.num_hours()
                    )));
                }
                Ok(DeletionFlags::everyone())
            }
            DeleteScope::ForMe => {
                if message.sender_id == requester_id {
                    Ok(DeletionFlags::sender())
                } else if message.receiver_id == requester_id {
                    Ok(DeletionFlags::receiver())
                } else {
                    Err(ChatError::forbidden("Unauthorized to delete this message"))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn message_at(created_at: DateTime<Utc>) -> Message {
        Message::new(Uuid::new_v4(), Uuid::new_v4(), Some("hi".to_string()), None, created_at)
    }

    #[test]
    fn test_send_requires_content() {
        let policy = LifecyclePolicy::default();
        let result = policy.validate_send(Uuid::new_v4(), Uuid::new_v4(), Some("   ".into()), None);
        assert_matches!(result, Err(ChatError::ValidationError { .. }));

        let ok = policy
            .validate_send(Uuid::new_v4(), Uuid::new_v4(), None, Some("https://img/1".into()))
            .unwrap();
        assert_eq!(ok.text, None);
    }

    #[test]
    fn test_send_to_self_rejected() {
        let user = Uuid::new_v4();
        let result = LifecyclePolicy::default().validate_send(user, user, Some("hi".into()), None);
        assert_matches!(result, Err(ChatError::ValidationError { field, .. }) if field == "receiver_id");
    }

    #[test]
    fn test_text_length_limit() {
        let policy = LifecyclePolicy { max_text_len: 5, ..LifecyclePolicy::default() };
        assert!(policy.validate_edit_text("héllo").is_ok());
        assert_matches!(policy.validate_edit_text("hello!"), Err(ChatError::ValidationError { .. }));
    }

    #[test]
    fn test_edit_by_receiver_forbidden() {
        let m = message_at(Utc::now());
        assert_matches!(
            LifecyclePolicy::default().authorize_edit(&m, m.receiver_id),
            Err(ChatError::Forbidden { .. })
        );
    }

    #[test]
    fn test_edit_after_delete_for_everyone_invalid() {
        let mut m = message_at(Utc::now());
        m.apply_deletion(DeletionFlags::everyone());
        assert_matches!(
            LifecyclePolicy::default().authorize_edit(&m, m.sender_id),
            Err(ChatError::InvalidState { .. })
        );
    }

    #[test]
    fn test_delete_for_everyone_window_boundary() {
        let policy = LifecyclePolicy::default();
        let created = Utc::now();
        let m = message_at(created);

        let at_boundary = created + Duration::hours(4);
        assert_eq!(
            policy.authorize_delete(&m, m.sender_id, DeleteScope::ForEveryone, at_boundary),
            Ok(DeletionFlags::everyone())
        );

        let past_boundary = at_boundary + Duration::seconds(1);
        assert_matches!(
            policy.authorize_delete(&m, m.sender_id, DeleteScope::ForEveryone, past_boundary),
            Err(ChatError::InvalidState { .. })
        );
    }

    #[test]
    fn test_receiver_cannot_delete_for_everyone_even_in_window() {
        let created = Utc::now();
        let m = message_at(created);
        for offset in [0, 60, 4 * 3600, 5 * 3600] {
            let result = LifecyclePolicy::default().authorize_delete(
                &m,
                m.receiver_id,
                DeleteScope::ForEveryone,
                created + Duration::seconds(offset),
            );
            assert_matches!(result, Err(ChatError::Forbidden { .. }));
        }
    }

    #[test]
    fn test_delete_for_me_picks_side() {
        let policy = LifecyclePolicy::default();
        let m = message_at(Utc::now());
        let now = Utc::now();
        assert_eq!(
            policy.authorize_delete(&m, m.sender_id, DeleteScope::ForMe, now),
            Ok(DeletionFlags::sender())
        );
        assert_eq!(
            policy.authorize_delete(&m, m.receiver_id, DeleteScope::ForMe, now),
            Ok(DeletionFlags::receiver())
        );
        assert_matches!(
            policy.authorize_delete(&m, Uuid::new_v4(), DeleteScope::ForMe, now),
            Err(ChatError::Forbidden { .. })
        );
    }

    #[test]
    fn test_repeat_delete_for_everyone_invalid() {
        let mut m = message_at(Utc::now());
        m.apply_deletion(DeletionFlags::everyone());
        assert_matches!(
            LifecyclePolicy::default().authorize_delete(&m, m.sender_id, DeleteScope::ForEveryone, Utc::now()),
            Err(ChatError::InvalidState { .. })
        );
    }

    #[test]
    fn test_policy_from_config() {
        let config = AppConfig::builder()
            .jwt_secret("x")
            .delete_for_everyone_window_secs(60)
            .max_message_length(10)
            .build()
            .unwrap();
        let policy = LifecyclePolicy::from(&config);
        assert_eq!(policy.delete_for_everyone_window, Duration::seconds(60));
        assert_eq!(policy.max_text_len, 10);
    }
}
