/**
 * Server Configuration
 *
 * Connects the optional PostgreSQL database described by `AppConfig`.
 *
 * # Error Handling
 *
 * Database errors are logged but do not prevent server startup. Without a
 * database the server runs on in-memory storage.
 */
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::shared::config::AppConfig;

/// Database configuration result
pub type DatabaseConfig = Option<PgPool>;

/// Connect to the database and run migrations
///
/// Returns `None` if `DATABASE_URL` is not set or the connection fails.
pub async fn load_database(config: &AppConfig) -> DatabaseConfig {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set. Messages will be kept in memory only.");
        return None;
    };

    tracing::info!("Connecting to database...");
    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Falling back to in-memory storage.");
            return None;
        }
    };
    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => tracing::info!("Database migrations completed successfully"),
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}
