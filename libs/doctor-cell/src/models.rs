use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `doctor_profiles` row with the embedded account name and weekly schedule
/// rows PostgREST returns alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub specialization: String,
    pub years_of_experience: Option<i32>,
    pub consultation_fee: Option<f64>,
    pub bio: Option<String>,
    #[serde(default)]
    pub users: Option<DoctorName>,
    #[serde(default)]
    pub doctor_schedules: Vec<DoctorSchedule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorName {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSchedule {
    pub day_of_week: i32, // 0 = Sunday
    pub start_time: String,
    pub end_time: String,
    pub is_active: bool,
}

/// Flattened directory entry served to clients and fed into the triage
/// chatbot's context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub name: String,
    pub specialization: String,
    pub experience: Option<i32>,
    pub fee: Option<f64>,
    pub availability: String,
    pub bio: Option<String>,
}

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

impl DoctorProfile {
    pub fn display_name(&self) -> String {
        match &self.users {
            Some(name) => format!("Dr. {} {}", name.first_name, name.last_name),
            None => "Dr. (name unavailable)".to_string(),
        }
    }

    /// Readable weekly availability, active schedule rows only.
    pub fn availability_summary(&self) -> String {
        let parts: Vec<String> = self
            .doctor_schedules
            .iter()
            .filter(|s| s.is_active)
            .map(|s| {
                let day = DAY_NAMES
                    .get(s.day_of_week.rem_euclid(7) as usize)
                    .copied()
                    .unwrap_or("Unknown");
                format!("{}: {}-{}", day, s.start_time, s.end_time)
            })
            .collect();

        if parts.is_empty() {
            "No fixed schedule available".to_string()
        } else {
            parts.join(", ")
        }
    }

    pub fn to_summary(&self) -> DoctorSummary {
        DoctorSummary {
            name: self.display_name(),
            specialization: self.specialization.clone(),
            experience: self.years_of_experience,
            fee: self.consultation_fee,
            availability: self.availability_summary(),
            bio: self.bio.clone(),
        }
    }
}
