use anyhow::Context;

use econsite_api::config::{self, DEVELOPMENT_JWT_SECRET};
use econsite_api::database::{run_migrations, DatabaseManager};
use econsite_api::{app, logging, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let config = config::config().clone();
    logging::init(&config.logging);

    tracing::info!("Starting Econsite API in {:?} mode", config.environment);

    if config.security.jwt_secret == DEVELOPMENT_JWT_SECRET {
        if econsite_api::is_production!() {
            anyhow::bail!("JWT_SECRET must be set in production");
        }
        tracing::warn!("Using the development JWT secret; set JWT_SECRET outside local development");
    }
    if !config.is_admin_configured() {
        tracing::warn!("ADMIN_USER_IDS is empty; every admin route will answer 403");
    }

    tracing::info!(
        "Connecting to {}",
        DatabaseManager::redacted_url(&config.database.url)
    );
    let db = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    if config.database.run_migrations {
        run_migrations(db.pool()).await.context("failed to run migrations")?;
        tracing::info!("Schema is up to date");
    }

    let bind_addr = format!("{}:{}", config.api.host, config.api.port);
    let state = AppState::new(db.clone(), config);
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Econsite API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
