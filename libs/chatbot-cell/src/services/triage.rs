use tracing::debug;

use doctor_cell::services::directory::DirectoryService;
use shared_config::AppConfig;
use shared_utils::sanitize::sanitize_text;

use crate::models::{ChatResponse, ChatbotError};
use crate::services::gemini::GeminiClient;

const MAX_MESSAGE_CHARS: usize = 500;
const MAX_SUGGESTED_DOCTORS: i32 = 3;

pub struct TriageService {
    gemini: GeminiClient,
    directory: DirectoryService,
    configured: bool,
}

impl TriageService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            gemini: GeminiClient::new(config),
            directory: DirectoryService::new(config),
            configured: config.is_chatbot_configured(),
        }
    }

    pub async fn handle_chat(&self, message: &str) -> Result<ChatResponse, ChatbotError> {
        if !self.configured {
            return Err(ChatbotError::NotConfigured);
        }

        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Err(ChatbotError::ValidationError(
                "message must not be empty".to_string(),
            ));
        }
        if trimmed.chars().count() > MAX_MESSAGE_CHARS {
            return Err(ChatbotError::ValidationError(format!(
                "message must be at most {} characters",
                MAX_MESSAGE_CHARS
            )));
        }

        let sanitized = sanitize_text(trimmed);
        let assessment = self.gemini.assess(&sanitized).await;
        debug!(
            "Triage assessed specialty: {} (emergency: {})",
            assessment.specialty, assessment.is_emergency
        );

        let doctors = if assessment.specialty.trim().is_empty() {
            Vec::new()
        } else {
            self.directory
                .find_by_specialty(&assessment.specialty, MAX_SUGGESTED_DOCTORS)
                .await?
        };

        Ok(ChatResponse {
            reply: assessment.reply,
            specialty: assessment.specialty,
            is_emergency: assessment.is_emergency,
            doctors,
        })
    }
}
