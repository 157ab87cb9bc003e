use std::sync::Arc;

use anyhow::Context;

use fleet_api::app::{app, AppState};
use fleet_api::config;
use fleet_api::store::postgres::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let config = config::config();
    tracing_subscriber::fmt::init();
    tracing::info!("Starting Fleet API in {:?} mode", config.environment);

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let store = PgStore::connect(&database_url)
        .await
        .context("failed to connect to database")?;
    store.migrate().await.context("failed to run migrations")?;

    let state = AppState::new(Arc::new(store), config.security.jwt_secret.clone());
    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("FLEET_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Fleet API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}
