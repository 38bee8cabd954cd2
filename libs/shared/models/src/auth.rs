use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub app_metadata: Option<serde_json::Value>,
    pub user_metadata: Option<serde_json::Value>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Roles allowed to read or edit accounts other than their own.
    pub fn is_elevated(&self) -> bool {
        matches!(
            self.role.as_deref(),
            Some("admin") | Some("superadmin") | Some("ADMIN") | Some("SUPERADMIN")
        )
    }

    pub fn is_doctor(&self) -> bool {
        matches!(self.role.as_deref(), Some("doctor") | Some("DOCTOR"))
    }
}
