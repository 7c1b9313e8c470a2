//! API route definitions

use crate::api::handlers;
use crate::app::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Create the main API router
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Simulation endpoints
        .route("/simulate", post(handlers::simulate))
        .route("/describe", get(handlers::describe))

        // Chain probes
        .route("/chains/:chain_id/block", get(handlers::block_number))
        .route("/chains/:chain_id/balance/:address", get(handlers::balance))

        // Health endpoint
        .route("/healthz", get(handlers::health_check))
}
