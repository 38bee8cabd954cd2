use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::{DbResult, SupabaseClient};

use crate::models::{DoctorProfile, DoctorSummary};

const EMBED: &str =
    "*,users(first_name,last_name),doctor_schedules(day_of_week,start_time,end_time,is_active)";

/// Doctor directory: public listing and specialty lookup, with schedule
/// summaries suitable for both the frontend and the triage chatbot context.
pub struct DirectoryService {
    supabase: SupabaseClient,
}

impl DirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_doctors(&self, limit: i32) -> DbResult<Vec<DoctorSummary>> {
        debug!("Listing doctor directory (limit {})", limit);

        let path = format!("/rest/v1/doctor_profiles?select={}&limit={}", EMBED, limit);
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        Ok(Self::summarize(rows))
    }

    /// Substring match on specialization, capped at `limit` results. Used by
    /// the chatbot to suggest doctors for an assessed specialty.
    pub async fn find_by_specialty(
        &self,
        specialty: &str,
        limit: i32,
    ) -> DbResult<Vec<DoctorSummary>> {
        debug!("Searching doctors by specialty: {}", specialty);

        let encoded = urlencoding::encode(specialty);
        let path = format!(
            "/rest/v1/doctor_profiles?select={}&specialization=ilike.*{}*&limit={}",
            EMBED, encoded, limit
        );
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        Ok(Self::summarize(rows))
    }

    fn summarize(rows: Vec<Value>) -> Vec<DoctorSummary> {
        rows.into_iter()
            .filter_map(|row| match serde_json::from_value::<DoctorProfile>(row) {
                Ok(profile) => Some(profile.to_summary()),
                Err(e) => {
                    debug!("Skipping malformed doctor row: {}", e);
                    None
                }
            })
            .collect()
    }
}
