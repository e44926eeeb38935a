pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth_handlers;
use crate::matching::handlers as matching_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // User API
        .route("/api/v1/user/signup", post(auth_handlers::handle_signup))
        .route("/api/v1/user/login", post(auth_handlers::handle_login))
        .route(
            "/api/v1/user/forgot-password",
            post(auth_handlers::handle_forgot_password),
        )
        // Matching API
        .route(
            "/api/v1/matching/score-upload",
            post(matching_handlers::handle_score_upload),
        )
        .route(
            "/api/v1/matching/score-text",
            post(matching_handlers::handle_score_text),
        )
        .with_state(state)
}
