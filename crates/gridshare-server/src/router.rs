use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all gridshare endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handler::health_handler))
        .route("/post", post(handler::post_handler))
        .route("/get/:token", get(handler::get_public_handler))
        .route("/get/secret/:token", get(handler::get_secret_handler))
        .route("/grid/:token", get(handler::grid_public_handler))
        .route("/grid/secret/:token", get(handler::grid_secret_handler))
        .route("/random", get(handler::random_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
