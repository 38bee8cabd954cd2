use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::User;
use shared_utils::sanitize::sanitize_text;

use crate::models::{
    Appointment, AppointmentStatus, AppointmentType, BookAppointmentRequest, BookingError,
};
use crate::services::conflict::has_conflict;

const MIN_DURATION_MINUTES: i32 = 5;
const MAX_DURATION_MINUTES: i32 = 120;
const DEFAULT_DURATION_MINUTES: i32 = 30;

pub struct BookingService {
    supabase: SupabaseClient,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn book_appointment(
        &self,
        patient_id: &Uuid,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, BookingError> {
        debug!(
            "Booking appointment: patient {} with doctor {}",
            patient_id, request.doctor_id
        );

        if request.scheduled_time <= Utc::now() {
            return Err(BookingError::ValidationError(
                "scheduledTime must be in the future".to_string(),
            ));
        }

        let duration = request.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration) {
            return Err(BookingError::ValidationError(format!(
                "durationMinutes must be between {} and {}",
                MIN_DURATION_MINUTES, MAX_DURATION_MINUTES
            )));
        }

        let existing = self
            .live_appointments_for_doctor(&request.doctor_id, auth_token)
            .await?;
        if has_conflict(&existing, request.scheduled_time, duration) {
            return Err(BookingError::SlotConflict);
        }

        let now = Utc::now().to_rfc3339();
        let appointment_data = json!({
            "patient_id": patient_id,
            "doctor_id": request.doctor_id,
            "scheduled_time": request.scheduled_time.to_rfc3339(),
            "duration_minutes": duration,
            "appointment_type": request.appointment_type.unwrap_or(AppointmentType::Video),
            "status": AppointmentStatus::Scheduled,
            "notes": request.notes.as_deref().map(sanitize_text),
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
                "/rest/v1/appointments",
                Some(auth_token),
                Some(appointment_data),
                Some(headers),
            )
            .await?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| BookingError::DatabaseError("No appointment row returned".to_string()))?;

        serde_json::from_value(row)
            .map_err(|e| BookingError::DatabaseError(format!("Failed to deserialize: {}", e)))
    }

    pub async fn list_for_patient(
        &self,
        patient_id: &Uuid,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, BookingError> {
        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&order=scheduled_time.asc",
            patient_id
        );
        self.fetch_list(&path, auth_token).await
    }

    pub async fn list_for_doctor(
        &self,
        doctor_id: &Uuid,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, BookingError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&order=scheduled_time.asc",
            doctor_id
        );
        self.fetch_list(&path, auth_token).await
    }

    /// Cancels an appointment on behalf of one of its participants.
    pub async fn cancel_appointment(
        &self,
        caller: &User,
        appointment_id: &Uuid,
        auth_token: &str,
    ) -> Result<Appointment, BookingError> {
        self.transition(caller, appointment_id, AppointmentStatus::Cancelled, auth_token)
            .await
    }

    /// Marks the outcome of a visit. Only the treating doctor or staff may
    /// close out an appointment as completed or no-show.
    pub async fn update_status(
        &self,
        caller: &User,
        appointment_id: &Uuid,
        next: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Appointment, BookingError> {
        if matches!(
            next,
            AppointmentStatus::Completed | AppointmentStatus::NoShow
        ) && !caller.is_doctor()
            && !caller.is_elevated()
        {
            return Err(BookingError::Unauthorized);
        }

        self.transition(caller, appointment_id, next, auth_token).await
    }

    async fn transition(
        &self,
        caller: &User,
        appointment_id: &Uuid,
        next: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Appointment, BookingError> {
        let appointment = self.fetch_one(appointment_id, auth_token).await?;

        let is_participant = caller.id == appointment.patient_id.to_string()
            || caller.id == appointment.doctor_id.to_string();
        if !is_participant && !caller.is_elevated() {
            return Err(BookingError::Unauthorized);
        }

        if !appointment.status.can_transition_to(next) {
            return Err(BookingError::InvalidStatusTransition {
                from: appointment.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
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

        let row = result
            .into_iter()
            .next()
            .ok_or(BookingError::NotFound)?;

        serde_json::from_value(row)
            .map_err(|e| BookingError::DatabaseError(format!("Failed to deserialize: {}", e)))
    }

    async fn fetch_one(
        &self,
        appointment_id: &Uuid,
        auth_token: &str,
    ) -> Result<Appointment, BookingError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let row = result.into_iter().next().ok_or(BookingError::NotFound)?;
        serde_json::from_value(row)
            .map_err(|e| BookingError::DatabaseError(format!("Failed to deserialize: {}", e)))
    }

    async fn fetch_list(
        &self,
        path: &str,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, BookingError> {
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, path, Some(auth_token), None)
            .await?;

        result
            .into_iter()
            .map(|row| {
                serde_json::from_value(row)
                    .map_err(|e| BookingError::DatabaseError(format!("Failed to deserialize: {}", e)))
            })
            .collect()
    }

    async fn live_appointments_for_doctor(
        &self,
        doctor_id: &Uuid,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, BookingError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&status=eq.scheduled",
            doctor_id
        );
        self.fetch_list(&path, auth_token).await
    }
}
