/**
 * Server Initialization
 *
 * Wires the collaborators into an `AppState` and builds the router.
 *
 * # Initialization Process
 *
 * 1. Connect the database, if configured
 * 2. Choose PostgreSQL or in-memory repositories
 * 3. Create the presence directory and event dispatcher
 * 4. Choose the image store
 * 5. Create the router
 */
use std::sync::Arc;

use axum::Router;

use crate::backend::auth::users::{InMemoryUserDirectory, PgUserDirectory, UserDirectory};
use crate::backend::chat::clock::SystemClock;
use crate::backend::chat::db::PgMessageRepository;
use crate::backend::chat::lifecycle::LifecyclePolicy;
use crate::backend::chat::repository::MessageRepository;
use crate::backend::chat::state::InMemoryMessageRepository;
use crate::backend::chat::store::MessageStore;
use crate::backend::media::image_store_from_config;
use crate::backend::realtime::dispatcher::EventDispatcher;
use crate::backend::realtime::presence::InMemoryPresenceDirectory;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_database;
use crate::backend::server::state::AppState;
use crate::shared::config::AppConfig;

/// Build the application state for `config`
pub async fn build_state(config: &AppConfig) -> AppState {
    let db_pool = load_database(config).await;

    let (repo, users): (Arc<dyn MessageRepository>, Arc<dyn UserDirectory>) = match db_pool {
        Some(pool) => (
            Arc::new(PgMessageRepository::new(pool.clone())),
            Arc::new(PgUserDirectory::new(pool)),
        ),
        None => (
            Arc::new(InMemoryMessageRepository::new()),
            Arc::new(InMemoryUserDirectory::default()),
        ),
    };

    let store = MessageStore::new(repo, Arc::new(SystemClock), LifecyclePolicy::from(config));
    let dispatcher = EventDispatcher::new(
        Arc::new(InMemoryPresenceDirectory::new()),
        config.event_buffer,
    );

    AppState {
        store,
        dispatcher,
        users,
        images: image_store_from_config(config),
        jwt_secret: Arc::from(config.jwt_secret.as_str()),
    }
}

/// Create and configure the Axum application
pub async fn create_app(config: &AppConfig) -> Router<()> {
    tracing::info!("Initializing dmchat backend server");
    let state = build_state(config).await;
    create_app_with_state(state, config)
}

/// Create the application around an existing state
///
/// Tests use this with in-memory collaborators and a manual clock.
pub fn create_app_with_state(state: AppState, config: &AppConfig) -> Router<()> {
    let app = create_router(state, &config.cors_origins);
    tracing::info!("Router configured");
    app
}
