use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            gemini_api_key: env::var("GEMINI_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("GEMINI_API_KEY not set, chatbot triage will be unavailable");
                    String::new()
                }),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| {
                    "https://generativelanguage.googleapis.com".to_string()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    pub fn is_chatbot_configured(&self) -> bool {
        !self.gemini_api_key.is_empty() && !self.gemini_base_url.is_empty()
    }
}
