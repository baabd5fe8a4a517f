use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/execute", post(handlers::execute))
        .route("/status", get(handlers::status))
        .route("/metrics", get(handlers::metrics))
        .route("/logs/:component", get(handlers::logs))
        .route("/dashboard", get(handlers::dashboard))
        .route("/config", get(handlers::get_config).post(handlers::put_config).put(handlers::put_config))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
