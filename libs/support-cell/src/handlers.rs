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

use crate::models::{CreateTicketRequest, UpdateTicketStatusRequest};
use crate::services::tickets::TicketService;

pub async fn create_ticket(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateTicketRequest>,
) -> Result<Json<Value>, AppError> {
    let user_id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Auth("Caller identity is not a valid id".to_string()))?;

    let service = TicketService::new(&state);
    let ticket = service.create_ticket(&user_id, request, auth.token()).await?;

    Ok(Json(json!({ "data": ticket })))
}

pub async fn list_my_tickets(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let user_id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Auth("Caller identity is not a valid id".to_string()))?;

    let service = TicketService::new(&state);
    let tickets = service.list_for_user(&user_id, auth.token()).await?;

    Ok(Json(json!({ "data": tickets })))
}

pub async fn list_all_tickets(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = TicketService::new(&state);
    let tickets = service.list_all(&user, auth.token()).await?;

    Ok(Json(json!({ "data": tickets })))
}

pub async fn update_ticket_status(
    State(state): State<Arc<AppConfig>>,
    Path(id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateTicketStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let service = TicketService::new(&state);
    let ticket = service
        .update_status(&user, &id, request.status, auth.token())
        .await?;

    Ok(Json(json!({ "data": ticket })))
}
