use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::Value;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::ChatRequest;
use crate::services::triage::TriageService;

pub async fn chat(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<Value>, AppError> {
    let service = TriageService::new(&state);
    let response = service.handle_chat(&request.message).await?;

    Ok(Json(serde_json::to_value(response).map_err(|e| {
        AppError::Internal(format!("Failed to serialize chat response: {}", e))
    })?))
}
