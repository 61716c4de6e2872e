//! Axum router construction for the garden API.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// CORS allows any origin so a browser client served from elsewhere can
/// reach the API during development.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Reads
        .route("/api/forest", get(handlers::get_forest))
        .route("/api/species", get(handlers::get_species))
        .route("/api/wisdom", get(handlers::get_wisdom))
        .route("/api/market", get(handlers::get_market))
        .route("/api/stats", get(handlers::get_stats))
        // Trees
        .route("/api/trees/{id}/harvest", post(handlers::harvest_tree))
        .route("/api/trees/{id}/name", put(handlers::rename_tree))
        // Market
        .route("/api/market/{id}/trade", post(handlers::trade_fruit))
        // Reflections
        .route("/api/reflections", post(handlers::create_reflection))
        // Entitlements
        .route(
            "/api/entitlements/species/{id}",
            post(handlers::grant_species),
        )
        .route(
            "/api/entitlements/speed-boost",
            put(handlers::set_speed_boost),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
