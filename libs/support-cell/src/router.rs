use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn support_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/tickets", post(handlers::create_ticket))
        .route("/tickets", get(handlers::list_my_tickets))
        .route("/tickets/all", get(handlers::list_all_tickets))
        .route("/tickets/{id}/status", put(handlers::update_ticket_status))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
