use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::error::ProfileError;
use crate::models::UpdateProfileRequest;
use crate::services::{coordinator::CoordinatorService, projector::ProjectionService};

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<Uuid>,
}

/// Which account a read targets. Elevated roles and doctors may look up other
/// accounts; everyone else only reads their own.
fn resolve_read_target(caller: &User, requested: Option<Uuid>) -> Result<Uuid, ProfileError> {
    let caller_id = Uuid::parse_str(&caller.id)
        .map_err(|_| ProfileError::Forbidden("Caller identity is not a valid id".to_string()))?;

    match requested {
        Some(target) if target != caller_id => {
            if caller.is_elevated() || caller.is_doctor() {
                Ok(target)
            } else {
                Err(ProfileError::Forbidden(
                    "Not authorized to access this profile".to_string(),
                ))
            }
        }
        _ => Ok(caller_id),
    }
}

pub async fn get_profile(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<Value>, AppError> {
    let target = resolve_read_target(&user, query.user_id)?;
    debug!("Projecting profile for account: {}", target);

    let projector = ProjectionService::new(&state);
    let projection = projector.get_projection(&target, auth.token()).await?;

    Ok(Json(json!({ "data": projection })))
}

pub async fn update_profile(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    let coordinator = CoordinatorService::new(&state);
    let projection = coordinator
        .update_profile(&user, payload, auth.token())
        .await?;

    Ok(Json(json!({ "data": projection })))
}
