/**
 * User Directory
 *
 * Read-only view of the users known to the authentication service, used to
 * populate the contact list. Accounts are created elsewhere.
 */
use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::chat::repository::RepositoryError;
use crate::shared::messaging::UserSummary;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// All users except `user_id`, ordered by username
    async fn list_except(&self, user_id: Uuid) -> Result<Vec<UserSummary>, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    avatar_url: Option<String>,
}

/// Users from the `users` table
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn list_except(&self, user_id: Uuid) -> Result<Vec<UserSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, avatar_url
            FROM users
            WHERE id <> $1
            ORDER BY username ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| UserSummary {
                id: row.id,
                username: row.username,
                avatar_url: row.avatar_url,
            })
            .collect())
    }
}

/// Fixed user list for development and tests
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<Vec<UserSummary>>,
}

impl InMemoryUserDirectory {
    pub fn new(users: Vec<UserSummary>) -> Self {
        Self {
            users: RwLock::new(users),
        }
    }

    pub async fn add(&self, user: UserSummary) {
        self.users.write().await.push(user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn list_except(&self, user_id: Uuid) -> Result<Vec<UserSummary>, RepositoryError> {
        let mut users: Vec<UserSummary> = self
            .users
            .read()
            .await
            .iter()
            .filter(|user| user.id != user_id)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}
