/**
 * Database Operations for Direct Messages
 *
 * PostgreSQL implementation of `MessageRepository`. Each mutation is a
 * single guarded UPDATE so that concurrent edits and deletions of the same
 * row serialize in the database instead of racing in application code.
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::repository::{EditOutcome, MessageRepository, RepositoryError};
use crate::shared::message::{DeletionFlags, Message};

const MESSAGE_COLUMNS: &str = "id, sender_id, receiver_id, text, image_url, created_at, \
     is_edited, original_text, edited_at, \
     deleted_for_sender, deleted_for_receiver, deleted_for_everyone";

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    sender_id: Uuid,
    receiver_id: Uuid,
    text: Option<String>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    is_edited: bool,
    original_text: Option<String>,
    edited_at: Option<DateTime<Utc>>,
    deleted_for_sender: bool,
    deleted_for_receiver: bool,
    deleted_for_everyone: bool,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            sender_id: row.sender_id,
            receiver_id: row.receiver_id,
            text: row.text,
            image_url: row.image_url,
            created_at: row.created_at,
            is_edited: row.is_edited,
            original_text: row.original_text,
            edited_at: row.edited_at,
            deleted_for_sender: row.deleted_for_sender,
            deleted_for_receiver: row.deleted_for_receiver,
            deleted_for_everyone: row.deleted_for_everyone,
        }
    }
}

/// Message repository backed by the `messages` table
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn insert(&self, message: &Message) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO messages (id, sender_id, receiver_id, text, image_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(message.id)
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(&message.text)
        .bind(&message.image_url)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Duplicate(message.id));
        }
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Message>, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Message::from))
    }

    async fn list_between(&self, a: Uuid, b: Uuid) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE (sender_id = $1 AND receiver_id = $2)
               OR (sender_id = $2 AND receiver_id = $1)
            ORDER BY created_at ASC, seq ASC
            "#
        ))
        .bind(a)
        .bind(b)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Message::from).collect())
    }

    async fn save_edit(
        &self,
        id: Uuid,
        text: &str,
        edited_at: DateTime<Utc>,
    ) -> Result<EditOutcome, RepositoryError> {
        // original_text is assigned from the pre-update row, first edit only.
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            UPDATE messages
            SET original_text = CASE WHEN is_edited THEN original_text ELSE text END,
                text = $2,
                is_edited = TRUE,
                edited_at = $3
            WHERE id = $1 AND NOT deleted_for_everyone
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(text)
        .bind(edited_at)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(EditOutcome::Applied(row.into())),
            None => match self.find(id).await? {
                Some(_) => Ok(EditOutcome::DeletedForEveryone),
                None => Ok(EditOutcome::Missing),
            },
        }
    }

    async fn save_deletion(
        &self,
        id: Uuid,
        flags: DeletionFlags,
    ) -> Result<Option<Message>, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            UPDATE messages
            SET deleted_for_sender = deleted_for_sender OR $2,
                deleted_for_receiver = deleted_for_receiver OR $3,
                deleted_for_everyone = deleted_for_everyone OR $4
            WHERE id = $1
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(flags.for_sender)
        .bind(flags.for_receiver)
        .bind(flags.for_everyone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Message::from))
    }
}
