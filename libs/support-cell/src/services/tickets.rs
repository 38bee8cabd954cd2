use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::User;
use shared_utils::sanitize::sanitize_text;

use crate::models::{CreateTicketRequest, SupportTicket, TicketError, TicketStatus};

const MAX_SUBJECT_CHARS: usize = 200;
const MAX_MESSAGE_CHARS: usize = 2000;

pub struct TicketService {
    supabase: SupabaseClient,
}

impl TicketService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_ticket(
        &self,
        user_id: &Uuid,
        request: CreateTicketRequest,
        auth_token: &str,
    ) -> Result<SupportTicket, TicketError> {
        let subject = request.subject.trim();
        if subject.is_empty() {
            return Err(TicketError::ValidationError(
                "subject must not be empty".to_string(),
            ));
        }
        if subject.chars().count() > MAX_SUBJECT_CHARS {
            return Err(TicketError::ValidationError(format!(
                "subject must be at most {} characters",
                MAX_SUBJECT_CHARS
            )));
        }

        let message = request.message.trim();
        if message.is_empty() {
            return Err(TicketError::ValidationError(
                "message must not be empty".to_string(),
            ));
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(TicketError::ValidationError(format!(
                "message must be at most {} characters",
                MAX_MESSAGE_CHARS
            )));
        }

        debug!("Creating support ticket for user {}", user_id);

        let now = Utc::now().to_rfc3339();
        let ticket_data = json!({
            "user_id": user_id,
            "subject": sanitize_text(subject),
            "message": sanitize_text(message),
            "status": TicketStatus::Open,
            "created_at": now,
            "updated_at": now,
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/support_tickets",
                Some(auth_token),
                Some(ticket_data),
                Some(headers),
            )
            .await?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| TicketError::DatabaseError("No ticket row returned".to_string()))?;

        serde_json::from_value(row)
            .map_err(|e| TicketError::DatabaseError(format!("Failed to deserialize: {}", e)))
    }

    pub async fn list_for_user(
        &self,
        user_id: &Uuid,
        auth_token: &str,
    ) -> Result<Vec<SupportTicket>, TicketError> {
        let path = format!(
            "/rest/v1/support_tickets?user_id=eq.{}&order=created_at.desc",
            user_id
        );
        self.fetch_list(&path, auth_token).await
    }

    /// Full ticket queue, staff only.
    pub async fn list_all(
        &self,
        caller: &User,
        auth_token: &str,
    ) -> Result<Vec<SupportTicket>, TicketError> {
        if !caller.is_elevated() {
            return Err(TicketError::Unauthorized);
        }
        self.fetch_list("/rest/v1/support_tickets?order=created_at.desc", auth_token)
            .await
    }

    pub async fn update_status(
        &self,
        caller: &User,
        ticket_id: &Uuid,
        next: TicketStatus,
        auth_token: &str,
    ) -> Result<SupportTicket, TicketError> {
        if !caller.is_elevated() {
            return Err(TicketError::Unauthorized);
        }

        let ticket = self.fetch_one(ticket_id, auth_token).await?;
        if !ticket.status.can_transition_to(next) {
            return Err(TicketError::InvalidStatusTransition {
                from: ticket.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }

        let path = format!("/rest/v1/support_tickets?id=eq.{}", ticket_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let update = json!({
            "status": next,
            "updated_at": Utc::now().to_rfc3339(),
        });

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(update),
                Some(headers),
            )
            .await?;

        let row = result.into_iter().next().ok_or(TicketError::NotFound)?;
        serde_json::from_value(row)
            .map_err(|e| TicketError::DatabaseError(format!("Failed to deserialize: {}", e)))
    }

    async fn fetch_one(
        &self,
        ticket_id: &Uuid,
        auth_token: &str,
    ) -> Result<SupportTicket, TicketError> {
        let path = format!("/rest/v1/support_tickets?id=eq.{}", ticket_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let row = result.into_iter().next().ok_or(TicketError::NotFound)?;
        serde_json::from_value(row)
            .map_err(|e| TicketError::DatabaseError(format!("Failed to deserialize: {}", e)))
    }

    async fn fetch_list(
        &self,
        path: &str,
        auth_token: &str,
    ) -> Result<Vec<SupportTicket>, TicketError> {
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, path, Some(auth_token), None)
            .await?;

        result
            .into_iter()
            .map(|row| {
                serde_json::from_value(row)
                    .map_err(|e| TicketError::DatabaseError(format!("Failed to deserialize: {}", e)))
            })
            .collect()
    }
}
