//! Route definitions for the Neighborhood Market API

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes.
///
/// The auth layer resolves a bearer token when one is sent; handlers that
/// need an identity reject anonymous calls themselves.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/businesses", business_routes())
        .nest("/orders", order_routes())
        .nest("/reviews", review_routes())
        .nest("/promos", promo_routes())
        .nest("/analytics", analytics_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Marketplace browse, registration and catalog management
fn business_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_businesses).post(handlers::create_business),
        )
        .route(
            "/:business_id",
            get(handlers::get_business)
                .put(handlers::update_business)
                .delete(handlers::deactivate_business),
        )
        .route("/:business_id/verify", post(handlers::verify_business))
        .route("/:business_id/items", post(handlers::add_item))
        .route(
            "/:business_id/items/:item_id",
            put(handlers::update_item).delete(handlers::delete_item),
        )
        .route("/:business_id/photos", post(handlers::upload_photo))
        .route(
            "/:business_id/photos/:photo_id",
            delete(handlers::delete_photo),
        )
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/status", put(handlers::update_order_status))
        .route(
            "/:order_id/messages",
            get(handlers::list_messages).post(handlers::send_message),
        )
}

fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/orders/:order_id", post(handlers::create_review))
        .route(
            "/businesses/:business_id",
            get(handlers::list_business_reviews),
        )
        .route("/:review_id/visibility", put(handlers::moderate_review))
        .route("/:review_id", delete(handlers::delete_review))
}

fn promo_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_promos).post(handlers::create_promo))
        .route(
            "/:promo_id",
            put(handlers::update_promo).delete(handlers::delete_promo),
        )
}

fn analytics_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(handlers::get_dashboard))
}
