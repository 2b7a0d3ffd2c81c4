use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all shorturl endpoints.
///
/// `GET` routes also answer `HEAD`; any other method gets 405.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(handler::landing_handler).post(handler::shorten_handler),
        )
        .route("/:code", get(handler::redirect_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
