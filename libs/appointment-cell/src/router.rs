use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/appointments", post(handlers::book_appointment))
        .route("/appointments", get(handlers::list_appointments))
        .route("/appointments/{id}/cancel", put(handlers::cancel_appointment))
        .route("/appointments/{id}/status", put(handlers::update_appointment_status))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
