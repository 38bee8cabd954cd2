use serde::{Deserialize, Serialize};

use doctor_cell::models::DoctorSummary;
use shared_database::supabase::SupabaseError;
use shared_models::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// The structured verdict the model is prompted to return.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageAssessment {
    pub specialty: String,
    pub reply: String,
    pub is_emergency: bool,
}

impl TriageAssessment {
    /// Served whenever the model call or reply parse fails.
    pub fn fallback() -> Self {
        Self {
            specialty: "General Physician".to_string(),
            reply: "I am having trouble processing your request right now. \
                    Please consult a General Physician."
                .to_string(),
            is_emergency: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub reply: String,
    pub specialty: String,
    pub is_emergency: bool,
    pub doctors: Vec<DoctorSummary>,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatbotError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Chat assistant is not configured")]
    NotConfigured,

    #[error("Transient storage error: {0}")]
    Transient(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<SupabaseError> for ChatbotError {
    fn from(err: SupabaseError) -> Self {
        if err.is_transient() {
            ChatbotError::Transient(err.to_string())
        } else {
            ChatbotError::DatabaseError(err.to_string())
        }
    }
}

impl From<ChatbotError> for AppError {
    fn from(err: ChatbotError) -> Self {
        match err {
            ChatbotError::ValidationError(msg) => AppError::ValidationError(msg),
            ChatbotError::NotConfigured => {
                AppError::ExternalService("Chat assistant is not configured".to_string())
            }
            ChatbotError::Transient(msg) => AppError::Transient(msg),
            ChatbotError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
