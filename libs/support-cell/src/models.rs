use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::supabase::SupabaseError;
use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    /// Tickets only move forward; closed is terminal.
    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        matches!(
            (self, next),
            (
                TicketStatus::Open,
                TicketStatus::InProgress | TicketStatus::Resolved | TicketStatus::Closed
            ) | (
                TicketStatus::InProgress,
                TicketStatus::Resolved | TicketStatus::Closed
            ) | (TicketStatus::Resolved, TicketStatus::Closed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportTicket {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub message: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketStatusRequest {
    pub status: TicketStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error("Ticket not found")]
    NotFound,

    #[error("Invalid ticket status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Not authorized to manage support tickets")]
    Unauthorized,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Transient storage error: {0}")]
    Transient(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<SupabaseError> for TicketError {
    fn from(err: SupabaseError) -> Self {
        if err.is_not_found() {
            TicketError::NotFound
        } else if err.is_transient() {
            TicketError::Transient(err.to_string())
        } else {
            TicketError::DatabaseError(err.to_string())
        }
    }
}

impl From<TicketError> for AppError {
    fn from(err: TicketError) -> Self {
        match err {
            TicketError::NotFound => AppError::NotFound(err.to_string()),
            TicketError::InvalidStatusTransition { .. } => AppError::Conflict(err.to_string()),
            TicketError::Unauthorized => AppError::Forbidden(err.to_string()),
            TicketError::ValidationError(msg) => AppError::ValidationError(msg),
            TicketError::Transient(msg) => AppError::Transient(msg),
            TicketError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickets_move_forward_only() {
        assert!(TicketStatus::Open.can_transition_to(TicketStatus::InProgress));
        assert!(TicketStatus::Open.can_transition_to(TicketStatus::Resolved));
        assert!(TicketStatus::InProgress.can_transition_to(TicketStatus::Closed));
        assert!(TicketStatus::Resolved.can_transition_to(TicketStatus::Closed));

        assert!(!TicketStatus::InProgress.can_transition_to(TicketStatus::Open));
        assert!(!TicketStatus::Resolved.can_transition_to(TicketStatus::InProgress));
    }

    #[test]
    fn closed_is_terminal() {
        assert!(!TicketStatus::Closed.can_transition_to(TicketStatus::Open));
        assert!(!TicketStatus::Closed.can_transition_to(TicketStatus::InProgress));
        assert!(!TicketStatus::Closed.can_transition_to(TicketStatus::Resolved));
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TicketStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }
}
