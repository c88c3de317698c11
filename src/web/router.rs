//! Route definitions for the admin server.

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::{api, auth, AdminState};

/// Create the API router.
pub fn create_api_router(state: AdminState) -> Router {
    Router::new()
        // Responses
        .route(
            "/responses",
            get(api::list_responses)
                .put(api::set_responses)
                .delete(api::clear_responses),
        )
        .route(
            "/responses/:key",
            get(api::get_response).post(api::add_response),
        )
        // Welcome message
        .route("/welcome", get(api::get_welcome).put(api::set_welcome))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ))
        .with_state(state)
}

/// Create the full app router.
pub fn create_app_router(state: AdminState) -> Router {
    Router::new()
        .nest("/api", create_api_router(state))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
