use thiserror::Error;

use shared_database::supabase::SupabaseError;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Validation failed for field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Not authorized: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Transient storage error: {0}")]
    Transient(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl ProfileError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<SupabaseError> for ProfileError {
    fn from(err: SupabaseError) -> Self {
        if err.is_conflict() {
            ProfileError::Conflict(err.to_string())
        } else if err.is_not_found() {
            ProfileError::NotFound(err.to_string())
        } else if err.is_transient() {
            ProfileError::Transient(err.to_string())
        } else {
            ProfileError::Database(err.to_string())
        }
    }
}

impl From<ProfileError> for AppError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::Validation { .. } => AppError::ValidationError(err.to_string()),
            ProfileError::Forbidden(msg) => AppError::Forbidden(msg),
            ProfileError::NotFound(msg) => AppError::NotFound(msg),
            ProfileError::Conflict(msg) => AppError::Conflict(msg),
            ProfileError::Transient(msg) => AppError::Transient(msg),
            ProfileError::Database(msg) => AppError::Database(msg),
        }
    }
}
