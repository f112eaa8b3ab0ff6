//! # Taskdeck API Server
//!
//! The HTTP server for Taskdeck, a multi-project task tracker with
//! per-project roles, configurable board columns, and cross-project team
//! management.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskdeck-api
//! ```

use taskdeck_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskdeck_shared::db::{
    migrations::{ensure_database_exists, run_migrations},
    pool::create_pool,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskdeck API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    ensure_database_exists(&config.database.url).await?;
    let pool = create_pool(config.database.clone()).await?;
    run_migrations(&pool).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, exiting...");

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .unwrap_or_else(|err| tracing::error!("Failed to listen for shutdown signal: {}", err));
}
