use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use chatbot_cell::router::chatbot_routes;
use doctor_cell::router::doctor_routes;
use profile_cell::router::profile_routes;
use shared_config::AppConfig;
use support_cell::router::support_routes;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "CureVirtual API is running!" }))
        .nest("/patient", profile_routes(state.clone()))
        .merge(doctor_routes(state.clone()))
        .merge(appointment_routes(state.clone()))
        .nest("/support", support_routes(state.clone()))
        .nest("/chatbot", chatbot_routes(state))
}
