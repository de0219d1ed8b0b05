/**
 * dmchat Server Entry Point
 *
 * Loads `.env`, initializes tracing and serves the chat API.
 */

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use dmchat::shared::config::AppConfig;

    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        bind = %config.bind_address(),
        database = config.database_url.is_some(),
        images = config.image_upload_url.is_some(),
        "Server initialization started"
    );

    let app = dmchat::backend::server::create_app(&config).await;

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(not(feature = "ssr"))]
fn main() {
    eprintln!("Server requires the 'ssr' feature to be enabled.");
    eprintln!("Run with: cargo run --bin dmchat-server --features ssr");
    std::process::exit(1);
}
