//! Neighborhood Market - Backend Server

use std::{net::SocketAddr, sync::Arc};

use neighborhood_market_backend::{
    config::Config,
    create_app,
    store::{MemoryStore, PgStore},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "nm_server=debug,neighborhood_market_backend=debug,tower_http=debug,sqlx=warn"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Neighborhood Market Server");
    tracing::info!("Environment: {}", config.environment);

    let state = match config.database.url.clone() {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let store = PgStore::connect(&url, &config.database).await?;
            tracing::info!("Database connection established");

            if config.environment == "development" {
                tracing::info!("Running database migrations...");
                store.migrate().await?;
                tracing::info!("Migrations completed");
            }

            let store = Arc::new(store);
            AppState::new(store.clone(), store, config.clone())
        }
        None => {
            tracing::warn!("No database URL configured, records are kept in memory only");
            let store = Arc::new(MemoryStore::new());
            AppState::new(store.clone(), store, config.clone())
        }
    };

    let app = create_app(state);

    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
