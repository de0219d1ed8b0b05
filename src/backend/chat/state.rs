use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repository::{EditOutcome, MessageRepository, RepositoryError};
use crate::shared::message::{DeletionFlags, Message};

/// Message storage used when no database is configured, and by tests
///
/// Messages are kept in insertion order, which is also creation order since
/// the store stamps `created_at` right before inserting.
#[derive(Debug, Default)]
pub struct InMemoryMessageRepository {
    messages: RwLock<Vec<Message>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn insert(&self, message: &Message) -> Result<(), RepositoryError> {
        let mut messages = self.messages.write().await;
        if messages.iter().any(|m| m.id == message.id) {
            return Err(RepositoryError::Duplicate(message.id));
        }
        messages.push(message.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Message>, RepositoryError> {
        let messages = self.messages.read().await;
        Ok(messages.iter().find(|m| m.id == id).cloned())
    }

    async fn list_between(&self, a: Uuid, b: Uuid) -> Result<Vec<Message>, RepositoryError> {
        let messages = self.messages.read().await;
        let mut conversation: Vec<Message> = messages
            .iter()
            .filter(|m| m.is_between(a, b))
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps.
        conversation.sort_by_key(|m| m.created_at);
        Ok(conversation)
    }

    async fn save_edit(
        &self,
        id: Uuid,
        text: &str,
        edited_at: DateTime<Utc>,
    ) -> Result<EditOutcome, RepositoryError> {
        let mut messages = self.messages.write().await;
        let Some(message) = messages.iter_mut().find(|m| m.id == id) else {
            return Ok(EditOutcome::Missing);
        };
        if message.deleted_for_everyone {
            return Ok(EditOutcome::DeletedForEveryone);
        }
        message.apply_edit(text.to_string(), edited_at);
        Ok(EditOutcome::Applied(message.clone()))
    }

    async fn save_deletion(
        &self,
        id: Uuid,
        flags: DeletionFlags,
    ) -> Result<Option<Message>, RepositoryError> {
        let mut messages = self.messages.write().await;
        Ok(messages.iter_mut().find(|m| m.id == id).map(|message| {
            message.apply_deletion(flags);
            message.clone()
        }))
    }
}
