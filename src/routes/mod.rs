mod auth;
mod content;
mod health;
mod platforms;
mod progress;
mod quiz;
mod users;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::Router;

use crate::middleware::auth::require_auth;
use crate::response::json_error;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/users/me", get(users::me).put(users::update_profile))
        .route("/api/analyze-quiz", post(quiz::analyze))
        .route("/api/generate-learning-content", post(content::generate))
        .route("/api/learning-progress", get(progress::list))
        .route(
            "/api/learning-progress/:id/complete",
            post(progress::complete),
        )
        .route("/api/platforms", get(platforms::list))
        .route("/api/platforms/:platform", put(platforms::upsert))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .nest("/health", health::router())
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/verify", get(auth::verify))
        .merge(protected)
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Route not found").into_response()
}
