use anyhow::Context;
use tracing_subscriber::EnvFilter;

use punocracy::app::{router, AppState};
use punocracy::config::config;
use punocracy::database::DatabaseManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, COOKIE_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("punocracy=info,tower_http=info")),
        )
        .init();

    let config = config().clone();
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting Punocracy in {:?} mode", config.environment);

    // Lazy pool: the server comes up even when Postgres does not
    let pool = DatabaseManager::connect_lazy(&config.database)?;
    if config.database.run_migrations {
        match DatabaseManager::migrate(&pool).await {
            Ok(()) => tracing::info!("Database migrations applied"),
            Err(e) => tracing::warn!("Skipping migrations: {}", e),
        }
    }

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let app = router(AppState::new(config, pool.clone()));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Punocracy listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    DatabaseManager::close(&pool).await;
    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
