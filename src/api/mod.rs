pub mod auth;
pub mod messages;
pub mod state;
pub mod middleware;
pub mod users;

pub use state::AppState;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
    timeout::TimeoutLayer,
};
use std::time::Duration;
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

pub fn create_router(state: AppState) -> Router {
    // Everything here requires a valid session token
    let protected = Router::new()
        .route("/api/users", get(users::list))
        .route("/api/users/{username}", get(users::get))
        .route("/api/users/{username}/to", get(users::messages_to))
        .route("/api/users/{username}/from", get(users::messages_from))
        .route("/api/messages", post(messages::send))
        .route("/api/messages/{id}", get(messages::get))
        .route("/api/messages/{id}/read", post(messages::mark_read))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        // Health check
        .route("/api/health", get(health))

        // Authentication endpoints
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))

        // Authenticated endpoints
        .merge(protected)

        // Add request timeout
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
