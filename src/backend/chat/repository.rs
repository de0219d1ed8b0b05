//! Message persistence seam
//!
//! The message store owns all lifecycle rules; a repository only persists.
//! Mutations are targeted so that concurrent writers touching different
//! fields do not clobber each other: deletion flags are OR-ed in, and an edit
//! is refused at write time once the row is deleted for everyone.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::shared::message::{DeletionFlags, Message};

/// Persistence failures. Never shown to clients.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("duplicate message id: {0}")]
    Duplicate(Uuid),
}

/// Outcome of a guarded edit write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The edit was written; carries the updated row
    Applied(Message),
    /// The row vanished between read and write
    Missing,
    /// The row was deleted for everyone between read and write
    DeletedForEveryone,
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a newly created message
    async fn insert(&self, message: &Message) -> Result<(), RepositoryError>;

    /// Load one message by id
    async fn find(&self, id: Uuid) -> Result<Option<Message>, RepositoryError>;

    /// All messages between `a` and `b` in either direction, oldest first
    async fn list_between(&self, a: Uuid, b: Uuid) -> Result<Vec<Message>, RepositoryError>;

    /// Replace the text of a message
    ///
    /// `original_text` is written only if the row has not been edited yet.
    async fn save_edit(
        &self,
        id: Uuid,
        text: &str,
        edited_at: DateTime<Utc>,
    ) -> Result<EditOutcome, RepositoryError>;

    /// OR the given flags into the row and return it
    async fn save_deletion(
        &self,
        id: Uuid,
        flags: DeletionFlags,
    ) -> Result<Option<Message>, RepositoryError>;
}
