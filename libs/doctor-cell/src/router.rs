use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    // Directory reads are public; nothing here mutates state.
    Router::new()
        .route("/doctors", get(handlers::list_doctors))
        .with_state(state)
}
