use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::{DefaultOnFailure, TraceLayer};
use tracing::Level;

use crate::handlers::{healthz, readyz, transfer};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Failed transfers are already reported by the handler.
    let on_failure = DefaultOnFailure::new().level(Level::DEBUG);
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/transfer", post(transfer))
        .layer(TraceLayer::new_for_http().on_failure(on_failure))
        .with_state(state)
}
