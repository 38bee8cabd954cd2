use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::error::ProfileError;
use crate::models::{Account, PatientProfile, ProfileProjection, ProfileState};

/// Profile Projector: assembles the merged account + clinical read model.
/// The profile row is always resolved by the account id, never by a
/// client-supplied foreign key.
pub struct ProjectionService {
    supabase: SupabaseClient,
}

impl ProjectionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_projection(
        &self,
        user_id: &Uuid,
        auth_token: &str,
    ) -> Result<ProfileProjection, ProfileError> {
        let account = self.fetch_account(user_id, auth_token).await?;
        let profile = self.ensure_profile(user_id, auth_token).await?;

        Ok(ProfileProjection::assemble(account, profile))
    }

    pub async fn fetch_account(
        &self,
        user_id: &Uuid,
        auth_token: &str,
    ) -> Result<Account, ProfileError> {
        debug!("Fetching account: {}", user_id);

        let path = format!("/rest/v1/users?id=eq.{}", user_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| ProfileError::NotFound(format!("Account {} not found", user_id)))?;

        serde_json::from_value(row)
            .map_err(|e| ProfileError::Database(format!("Failed to deserialize account: {}", e)))
    }

    /// Explicit presence check for the one-to-one profile row.
    pub async fn fetch_profile(
        &self,
        user_id: &Uuid,
        auth_token: &str,
    ) -> Result<ProfileState, ProfileError> {
        let path = format!("/rest/v1/patient_profiles?user_id=eq.{}", user_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        match result.into_iter().next() {
            None => Ok(ProfileState::Absent),
            Some(row) => {
                let profile = serde_json::from_value(row).map_err(|e| {
                    ProfileError::Database(format!("Failed to deserialize profile: {}", e))
                })?;
                Ok(ProfileState::Present(profile))
            }
        }
    }

    /// Creates the profile row with default values if it does not exist yet.
    /// A concurrent creation loses the insert race on the unique `user_id`
    /// constraint and falls back to re-fetching, so autovivification happens
    /// at most once per account.
    pub async fn ensure_profile(
        &self,
        user_id: &Uuid,
        auth_token: &str,
    ) -> Result<PatientProfile, ProfileError> {
        if let ProfileState::Present(profile) = self.fetch_profile(user_id, auth_token).await? {
            return Ok(profile);
        }

        debug!("No profile row for account {}, creating default", user_id);

        let now = chrono::Utc::now().to_rfc3339();
        let profile_data = json!({
            "user_id": user_id,
            "created_at": now,
            "updated_at": now,
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let created: Result<Vec<Value>, _> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/patient_profiles",
                Some(auth_token),
                Some(profile_data),
                Some(headers),
            )
            .await;

        match created {
            Ok(rows) => {
                let row = rows.into_iter().next().ok_or_else(|| {
                    ProfileError::Database("Profile creation returned no row".to_string())
                })?;
                serde_json::from_value(row).map_err(|e| {
                    ProfileError::Database(format!("Failed to deserialize profile: {}", e))
                })
            }
            Err(e) if e.is_conflict() => {
                // Lost the creation race; the winner's row is the profile.
                match self.fetch_profile(user_id, auth_token).await? {
                    ProfileState::Present(profile) => Ok(profile),
                    ProfileState::Absent => Err(ProfileError::Database(
                        "Profile conflict reported but no row found".to_string(),
                    )),
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}
