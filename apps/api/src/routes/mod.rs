pub mod health;

use axum::{routing::get, routing::post, Router};

use crate::reports::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Single action-dispatch endpoint, mirroring the browser client's
        // `{action, payload}` contract.
        .route("/api/nexus", post(handlers::handle_nexus))
        .with_state(state)
}
