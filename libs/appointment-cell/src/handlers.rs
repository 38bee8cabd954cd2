use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{BookAppointmentRequest, UpdateAppointmentStatusRequest};
use crate::services::booking::BookingService;

pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let patient_id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Auth("Caller identity is not a valid id".to_string()))?;

    let service = BookingService::new(&state);
    let appointment = service
        .book_appointment(&patient_id, request, auth.token())
        .await?;

    Ok(Json(json!({ "data": appointment })))
}

/// Lists the caller's own appointments: by patient id for patients, by
/// doctor id for doctors.
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let caller_id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Auth("Caller identity is not a valid id".to_string()))?;

    let service = BookingService::new(&state);
    let appointments = if user.is_doctor() {
        service.list_for_doctor(&caller_id, auth.token()).await?
    } else {
        service.list_for_patient(&caller_id, auth.token()).await?
    };

    Ok(Json(json!({ "data": appointments })))
}

pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service.cancel_appointment(&user, &id, auth.token()).await?;

    Ok(Json(json!({ "data": appointment })))
}

pub async fn update_appointment_status(
    State(state): State<Arc<AppConfig>>,
    Path(id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateAppointmentStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service
        .update_status(&user, &id, request.status, auth.token())
        .await?;

    Ok(Json(json!({ "data": appointment })))
}
