use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers;

/// Public route: triage runs before patients authenticate.
pub fn chatbot_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/chat", post(handlers::chat))
        .with_state(state)
}
