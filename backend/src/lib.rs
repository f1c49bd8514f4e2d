//! Neighborhood Market backend
//!
//! Residents register home-based businesses, list items, take orders with a
//! per-order chat and collect reviews once an order completes. Locations are
//! coarse zones only; administrators verify businesses and moderate reviews.

use std::sync::Arc;

use axum::{routing::get, Router};
use shared::zone::ZoneDistances;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod policy;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

use store::{EventSink, MarketStore, MemoryStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MarketStore>,
    pub events: Arc<dyn EventSink>,
    pub config: Arc<Config>,
    pub zones: Arc<ZoneDistances>,
}

impl AppState {
    pub fn new(store: Arc<dyn MarketStore>, events: Arc<dyn EventSink>, config: Config) -> Self {
        let zones = Arc::new(config.marketplace.zone_table());
        Self {
            store,
            events,
            config: Arc::new(config),
            zones,
        }
    }

    /// State over a fresh in-memory store
    pub fn in_memory(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, config)
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Neighborhood Market API v1.0"
}
