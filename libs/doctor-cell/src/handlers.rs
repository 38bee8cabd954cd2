use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::services::directory::DirectoryService;

#[derive(Debug, Deserialize)]
pub struct DoctorQuery {
    pub specialty: Option<String>,
    pub limit: Option<i32>,
}

pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<DoctorQuery>,
) -> Result<Json<Value>, AppError> {
    let directory = DirectoryService::new(&state);
    let limit = query.limit.unwrap_or(50).clamp(1, 100);

    let doctors = match query.specialty {
        Some(ref specialty) if !specialty.trim().is_empty() => directory
            .find_by_specialty(specialty.trim(), limit)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?,
        _ => directory
            .list_doctors(limit)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?,
    };

    Ok(Json(json!({ "data": doctors })))
}
