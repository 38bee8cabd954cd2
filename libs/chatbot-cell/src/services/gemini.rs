use serde_json::{json, Value};
use tracing::warn;

use shared_config::AppConfig;

use crate::models::TriageAssessment;

const MODEL: &str = "gemini-pro";

pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: config.gemini_base_url.clone(),
            api_key: config.gemini_api_key.clone(),
        }
    }

    /// Asks the model to triage the message. Any upstream failure, malformed
    /// reply included, degrades to the fallback assessment instead of an
    /// error.
    pub async fn assess(&self, message: &str) -> TriageAssessment {
        match self.generate(message).await {
            Ok(assessment) => assessment,
            Err(reason) => {
                warn!("Gemini call failed, serving fallback triage: {}", reason);
                TriageAssessment::fallback()
            }
        }
    }

    async fn generate(&self, message: &str) -> Result<TriageAssessment, String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, MODEL, self.api_key
        );

        let body = json!({
            "contents": [{
                "parts": [{ "text": triage_prompt(message) }]
            }]
        });

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Gemini API returned {}", status));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| format!("invalid response body: {}", e))?;

        let text = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| "response has no candidate text".to_string())?;

        parse_assessment(text)
    }
}

fn triage_prompt(message: &str) -> String {
    format!(
        "You are a smart medical assistant for \"CureVirtual\".\n\
         User Message: \"{}\"\n\n\
         Task:\n\
         1. Analyze the symptoms or query.\n\
         2. Recommend a medical specialist (e.g., Cardiologist, Dermatologist, \
         General Physician). Ensure the specialty closely matches standard \
         medical fields.\n\
         3. Provide a helpful, empathetic response to the user.\n\
         4. If it's an emergency, warn them explicitly.\n\n\
         Return ONLY a JSON object (no markdown) with this format:\n\
         {{\n\
           \"specialty\": \"string\",\n\
           \"reply\": \"string\",\n\
           \"isEmergency\": boolean\n\
         }}",
        message
    )
}

/// Models routinely wrap the JSON in markdown fences despite the prompt.
fn parse_assessment(text: &str) -> Result<TriageAssessment, String> {
    let clean = text.replace("```json", "").replace("```", "");
    serde_json::from_str(clean.trim()).map_err(|e| format!("unparseable assessment: {}", e))
}
