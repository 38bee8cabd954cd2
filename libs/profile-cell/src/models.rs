use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
    Superadmin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const VARIANTS: &'static [&'static str] = &["MALE", "FEMALE", "OTHER"];

    /// Case-normalizing parse. `"Male"`, `"male"` and `"MALE"` all canonicalize
    /// to the same variant.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_uppercase().as_str() {
            "MALE" => Some(Self::Male),
            "FEMALE" => Some(Self::Female),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BloodGroup {
    APositive,
    ANegative,
    BPositive,
    BNegative,
    AbPositive,
    AbNegative,
    OPositive,
    ONegative,
    Unknown,
}

impl BloodGroup {
    pub const VARIANTS: &'static [&'static str] = &[
        "A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-", "UNKNOWN",
    ];

    /// Accepts both the clinical shorthand (`"A+"`) and the canonical stored
    /// form (`"A_POSITIVE"`), case-insensitively.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_uppercase().as_str() {
            "A+" | "A_POSITIVE" => Some(Self::APositive),
            "A-" | "A_NEGATIVE" => Some(Self::ANegative),
            "B+" | "B_POSITIVE" => Some(Self::BPositive),
            "B-" | "B_NEGATIVE" => Some(Self::BNegative),
            "AB+" | "AB_POSITIVE" => Some(Self::AbPositive),
            "AB-" | "AB_NEGATIVE" => Some(Self::AbNegative),
            "O+" | "O_POSITIVE" => Some(Self::OPositive),
            "O-" | "O_NEGATIVE" => Some(Self::ONegative),
            "UNKNOWN" => Some(Self::Unknown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APositive => "A_POSITIVE",
            Self::ANegative => "A_NEGATIVE",
            Self::BPositive => "B_POSITIVE",
            Self::BNegative => "B_NEGATIVE",
            Self::AbPositive => "AB_POSITIVE",
            Self::AbNegative => "AB_NEGATIVE",
            Self::OPositive => "O_POSITIVE",
            Self::ONegative => "O_NEGATIVE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Identity record shared by all roles, one row in `users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role-specific clinical record, one row in `patient_profiles`,
/// joined one-to-one to `users` via `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub blood_group: Option<BloodGroup>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub allergies: Option<String>,
    pub medications: Option<String>,
    pub medical_history: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_member_id: Option<String>,
    pub medical_record_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Explicit presence state for the one-to-one profile row, so creation is a
/// visible operation rather than a side effect buried in a read.
#[derive(Debug, Clone)]
pub enum ProfileState {
    Absent,
    Present(PatientProfile),
}

/// Identity fields as the client sees them, nested under `user` in the
/// projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            phone: account.phone,
            role: account.role,
            date_of_birth: account.date_of_birth,
            gender: account.gender,
        }
    }
}

/// Merged read model: clinical fields at the top level, identity fields under
/// `user`. This is what both GET and PUT return - never the raw payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileProjection {
    pub id: Uuid,
    pub user_id: Uuid,
    pub blood_group: Option<BloodGroup>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub allergies: Option<String>,
    pub medications: Option<String>,
    pub medical_history: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_member_id: Option<String>,
    pub medical_record_number: Option<String>,
    pub user: AccountView,
}

impl ProfileProjection {
    pub fn assemble(account: Account, profile: PatientProfile) -> Self {
        Self {
            id: profile.id,
            user_id: profile.user_id,
            blood_group: profile.blood_group,
            height: profile.height,
            weight: profile.weight,
            address: profile.address,
            emergency_contact: profile.emergency_contact,
            allergies: profile.allergies,
            medications: profile.medications,
            medical_history: profile.medical_history,
            insurance_provider: profile.insurance_provider,
            insurance_member_id: profile.insurance_member_id,
            medical_record_number: profile.medical_record_number,
            user: account.into(),
        }
    }
}

/// Partial update payload. Keys from both schemas arrive mixed; anything not
/// declared here is dropped at deserialization and never reaches storage.
/// Numeric fields come in as raw JSON values because clients send both
/// `180` and `"180"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub height: Option<serde_json::Value>,
    pub weight: Option<serde_json::Value>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub allergies: Option<String>,
    pub medications: Option<String>,
    pub medical_history: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_member_id: Option<String>,
    pub medical_record_number: Option<String>,
}
