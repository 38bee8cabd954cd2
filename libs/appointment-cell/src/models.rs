use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::supabase::SupabaseError;
use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    Video,
    InPerson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Scheduled is the only live state; the rest are terminal.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        matches!(
            (self, next),
            (
                AppointmentStatus::Scheduled,
                AppointmentStatus::Completed
                    | AppointmentStatus::Cancelled
                    | AppointmentStatus::NoShow
            )
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub scheduled_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub scheduled_time: DateTime<Utc>,
    pub duration_minutes: Option<i32>,
    pub appointment_type: Option<AppointmentType>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor is not available at the requested time")]
    SlotConflict,

    #[error("Invalid appointment status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Not authorized to modify this appointment")]
    Unauthorized,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Transient storage error: {0}")]
    Transient(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<SupabaseError> for BookingError {
    fn from(err: SupabaseError) -> Self {
        if err.is_conflict() {
            BookingError::SlotConflict
        } else if err.is_transient() {
            BookingError::Transient(err.to_string())
        } else {
            BookingError::DatabaseError(err.to_string())
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::NotFound => AppError::NotFound(err.to_string()),
            BookingError::SlotConflict => AppError::Conflict(err.to_string()),
            BookingError::InvalidStatusTransition { .. } => AppError::Conflict(err.to_string()),
            BookingError::Unauthorized => AppError::Forbidden(err.to_string()),
            BookingError::ValidationError(msg) => AppError::ValidationError(msg),
            BookingError::Transient(msg) => AppError::Transient(msg),
            BookingError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduled_can_reach_all_terminal_states() {
        let s = AppointmentStatus::Scheduled;
        assert!(s.can_transition_to(AppointmentStatus::Completed));
        assert!(s.can_transition_to(AppointmentStatus::Cancelled));
        assert!(s.can_transition_to(AppointmentStatus::NoShow));
    }

    #[test]
    fn terminal_states_are_final() {
        assert!(!AppointmentStatus::Cancelled.can_transition_to(AppointmentStatus::Scheduled));
        assert!(!AppointmentStatus::Completed.can_transition_to(AppointmentStatus::Cancelled));
        assert!(!AppointmentStatus::NoShow.can_transition_to(AppointmentStatus::Completed));
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&AppointmentStatus::NoShow).unwrap(),
            "\"no_show\""
        );
        assert_eq!(
            serde_json::to_string(&AppointmentType::InPerson).unwrap(),
            "\"in_person\""
        );
    }
}
