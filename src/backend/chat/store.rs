/**
 * Message Store
 *
 * The single mutator of messages. Every mutation re-reads the message,
 * runs the lifecycle checks against it and the clock's current time, and
 * then issues a targeted repository write.
 *
 * Concurrent edits from the same sender are last-write-wins; the guarded
 * repository write only ensures that an edit racing a delete-for-everyone
 * never resurrects content.
 */
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use super::clock::Clock;
use super::lifecycle::LifecyclePolicy;
use super::repository::{EditOutcome, MessageRepository};
use crate::backend::error::BackendError;
use crate::shared::error::ChatError;
use crate::shared::message::{DeleteScope, Message};
use crate::shared::visibility::filter_for;

#[derive(Clone)]
pub struct MessageStore {
    repo: Arc<dyn MessageRepository>,
    clock: Arc<dyn Clock>,
    policy: LifecyclePolicy,
}

impl MessageStore {
    pub fn new(
        repo: Arc<dyn MessageRepository>,
        clock: Arc<dyn Clock>,
        policy: LifecyclePolicy,
    ) -> Self {
        Self {
            repo,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    /// Create a message stamped with the server's current time
    pub async fn create(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        text: Option<String>,
        image_url: Option<String>,
    ) -> Result<Message, BackendError> {
        let new = self
            .policy
            .validate_send(sender_id, receiver_id, text, image_url)?;
        let message = Message::new(
            new.sender_id,
            new.receiver_id,
            new.text,
            new.image_url,
            self.clock.now(),
        );
        self.repo.insert(&message).await?;
        info!(
            message_id = %message.id,
            sender_id = %sender_id,
            receiver_id = %receiver_id,
            has_image = message.image_url.is_some(),
            "Message created"
        );
        Ok(message)
    }

    pub async fn get(&self, message_id: Uuid) -> Result<Message, BackendError> {
        self.repo
            .find(message_id)
            .await?
            .ok_or_else(|| ChatError::not_found("Message not found").into())
    }

    /// Raw conversation between two users, both directions, oldest first
    pub async fn list_conversation(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<Vec<Message>, BackendError> {
        Ok(self.repo.list_between(user_a, user_b).await?)
    }

    /// Conversation as `viewer_id` may see it
    pub async fn visible_conversation(
        &self,
        viewer_id: Uuid,
        counterpart_id: Uuid,
    ) -> Result<Vec<Message>, BackendError> {
        let messages = self.list_conversation(viewer_id, counterpart_id).await?;
        let visible = filter_for(&messages, viewer_id);
        debug!(
            viewer_id = %viewer_id,
            counterpart_id = %counterpart_id,
            stored = messages.len(),
            visible = visible.len(),
            "Conversation fetched"
        );
        Ok(visible)
    }

    /// Replace the text of a message owned by `requester_id`
    pub async fn apply_edit(
        &self,
        message_id: Uuid,
        requester_id: Uuid,
        new_text: String,
    ) -> Result<Message, BackendError> {
        let message = self.get(message_id).await?;
        self.policy.authorize_edit(&message, requester_id)?;
        self.policy.validate_edit_text(&new_text)?;

        match self
            .repo
            .save_edit(message_id, &new_text, self.clock.now())
            .await?
        {
            EditOutcome::Applied(message) => {
                info!(message_id = %message_id, "Message edited");
                Ok(message)
            }
            EditOutcome::Missing => Err(ChatError::not_found("Message not found").into()),
            EditOutcome::DeletedForEveryone => Err(ChatError::invalid_state(
                "Cannot edit a message that has been deleted for everyone",
            )
            .into()),
        }
    }

    /// Soft-delete a message with the given scope
    pub async fn apply_delete(
        &self,
        message_id: Uuid,
        requester_id: Uuid,
        scope: DeleteScope,
    ) -> Result<Message, BackendError> {
        let message = self.get(message_id).await?;
        let flags = self
            .policy
            .authorize_delete(&message, requester_id, scope, self.clock.now())?;

        let message = self
            .repo
            .save_deletion(message_id, flags)
            .await?
            .ok_or_else(|| ChatError::not_found("Message not found"))?;
        info!(message_id = %message_id, scope = %scope, "Message deleted");
        Ok(message)
    }
}
