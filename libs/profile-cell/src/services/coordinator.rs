use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::User;
use shared_utils::sanitize::{is_valid_email, is_valid_phone, sanitize_text};

use crate::error::ProfileError;
use crate::models::{BloodGroup, Gender, ProfileProjection, UpdateProfileRequest};
use crate::services::projector::ProjectionService;

/// Validated, normalized subset of the payload destined for the `users` row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountChanges {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

impl AccountChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.date_of_birth.is_none()
            && self.gender.is_none()
    }

    pub fn to_db_json(&self) -> Value {
        let mut map = Map::new();
        if let Some(ref v) = self.email {
            map.insert("email".to_string(), json!(v));
        }
        if let Some(ref v) = self.first_name {
            map.insert("first_name".to_string(), json!(v));
        }
        if let Some(ref v) = self.last_name {
            map.insert("last_name".to_string(), json!(v));
        }
        if let Some(ref v) = self.phone {
            map.insert("phone".to_string(), json!(v));
        }
        if let Some(v) = self.date_of_birth {
            map.insert(
                "date_of_birth".to_string(),
                json!(v.format("%Y-%m-%d").to_string()),
            );
        }
        if let Some(v) = self.gender {
            map.insert("gender".to_string(), json!(v));
        }
        Value::Object(map)
    }
}

/// Validated, normalized subset destined for the `patient_profiles` row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
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
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.blood_group.is_none()
            && self.height.is_none()
            && self.weight.is_none()
            && self.address.is_none()
            && self.emergency_contact.is_none()
            && self.allergies.is_none()
            && self.medications.is_none()
            && self.medical_history.is_none()
            && self.insurance_provider.is_none()
            && self.insurance_member_id.is_none()
            && self.medical_record_number.is_none()
    }

    pub fn to_db_json(&self) -> Value {
        let mut map = Map::new();
        if let Some(v) = self.blood_group {
            map.insert("blood_group".to_string(), json!(v));
        }
        if let Some(v) = self.height {
            map.insert("height".to_string(), json!(v));
        }
        if let Some(v) = self.weight {
            map.insert("weight".to_string(), json!(v));
        }
        if let Some(ref v) = self.address {
            map.insert("address".to_string(), json!(v));
        }
        if let Some(ref v) = self.emergency_contact {
            map.insert("emergency_contact".to_string(), json!(v));
        }
        if let Some(ref v) = self.allergies {
            map.insert("allergies".to_string(), json!(v));
        }
        if let Some(ref v) = self.medications {
            map.insert("medications".to_string(), json!(v));
        }
        if let Some(ref v) = self.medical_history {
            map.insert("medical_history".to_string(), json!(v));
        }
        if let Some(ref v) = self.insurance_provider {
            map.insert("insurance_provider".to_string(), json!(v));
        }
        if let Some(ref v) = self.insurance_member_id {
            map.insert("insurance_member_id".to_string(), json!(v));
        }
        if let Some(ref v) = self.medical_record_number {
            map.insert("medical_record_number".to_string(), json!(v));
        }
        Value::Object(map)
    }
}

/// Resolves which account the update targets. The authenticated identity is
/// authoritative: a payload-supplied id that disagrees with it hard-fails
/// unless the caller holds an elevated role.
pub fn authorize_target(
    caller: &User,
    payload_user_id: Option<Uuid>,
) -> Result<Uuid, ProfileError> {
    let caller_id = Uuid::parse_str(&caller.id)
        .map_err(|_| ProfileError::Forbidden("Caller identity is not a valid id".to_string()))?;

    match payload_user_id {
        Some(target) if target != caller_id => {
            if caller.is_elevated() {
                Ok(target)
            } else {
                Err(ProfileError::Forbidden(
                    "Profile updates are limited to your own account".to_string(),
                ))
            }
        }
        _ => Ok(caller_id),
    }
}

/// Splits the payload into the two schema subsets, validating and normalizing
/// every field on the way through. Fails on the first offending field, naming
/// it and the expected shape.
pub fn validate_and_partition(
    payload: &UpdateProfileRequest,
) -> Result<(AccountChanges, ProfileChanges), ProfileError> {
    let mut account = AccountChanges::default();
    let mut profile = ProfileChanges::default();

    if let Some(ref email) = payload.email {
        let email = email.trim().to_ascii_lowercase();
        if !is_valid_email(&email) {
            return Err(ProfileError::validation(
                "email",
                format!("'{}' is not a valid email address", email),
            ));
        }
        account.email = Some(email);
    }
    if let Some(ref v) = payload.first_name {
        account.first_name = Some(require_non_empty("firstName", v)?);
    }
    if let Some(ref v) = payload.last_name {
        account.last_name = Some(require_non_empty("lastName", v)?);
    }
    if let Some(ref phone) = payload.phone {
        let phone = phone.trim().to_string();
        if !is_valid_phone(&phone) {
            return Err(ProfileError::validation(
                "phone",
                format!("'{}' is not a valid phone number", phone),
            ));
        }
        account.phone = Some(phone);
    }
    if let Some(ref dob) = payload.date_of_birth {
        account.date_of_birth = Some(parse_date("dateOfBirth", dob)?);
    }
    if let Some(ref gender) = payload.gender {
        account.gender = Some(Gender::parse(gender).ok_or_else(|| {
            ProfileError::validation(
                "gender",
                format!(
                    "'{}' is not one of {}",
                    gender,
                    Gender::VARIANTS.join(", ")
                ),
            )
        })?);
    }

    if let Some(ref group) = payload.blood_group {
        profile.blood_group = Some(BloodGroup::parse(group).ok_or_else(|| {
            ProfileError::validation(
                "bloodGroup",
                format!(
                    "'{}' is not one of {}",
                    group,
                    BloodGroup::VARIANTS.join(", ")
                ),
            )
        })?);
    }
    if let Some(ref v) = payload.height {
        profile.height = Some(coerce_positive_number("height", v)?);
    }
    if let Some(ref v) = payload.weight {
        profile.weight = Some(coerce_positive_number("weight", v)?);
    }

    profile.address = payload.address.as_deref().map(sanitize_text);
    profile.emergency_contact = payload.emergency_contact.as_deref().map(sanitize_text);
    profile.allergies = payload.allergies.as_deref().map(sanitize_text);
    profile.medications = payload.medications.as_deref().map(sanitize_text);
    profile.medical_history = payload.medical_history.as_deref().map(sanitize_text);
    profile.insurance_provider = payload.insurance_provider.as_deref().map(sanitize_text);
    profile.insurance_member_id = payload.insurance_member_id.as_deref().map(sanitize_text);
    profile.medical_record_number = payload.medical_record_number.as_deref().map(sanitize_text);

    Ok((account, profile))
}

fn require_non_empty(field: &str, value: &str) -> Result<String, ProfileError> {
    let trimmed = sanitize_text(value);
    if trimmed.is_empty() {
        return Err(ProfileError::validation(field, "must not be empty"));
    }
    Ok(trimmed)
}

/// Accepts `180`, `180.5` or `"180"`. Rejects non-finite and non-positive
/// values; those fields are either a validated positive number or unset.
fn coerce_positive_number(field: &str, value: &Value) -> Result<f64, ProfileError> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        ProfileError::validation(field, format!("'{}' is not a number", value))
    })?;

    if !number.is_finite() || number <= 0.0 {
        return Err(ProfileError::validation(
            field,
            format!("must be a positive finite number, got {}", number),
        ));
    }

    Ok(number)
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ProfileError> {
    // Tolerate an RFC 3339 timestamp by truncating at the time separator.
    let date_part = value.split('T').next().unwrap_or(value).trim();

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| {
        ProfileError::validation(
            field,
            format!("'{}' is not a calendar date (expected YYYY-MM-DD)", value),
        )
    })
}

/// Profile Update Coordinator: authorizes, partitions, validates, applies the
/// cross-record write atomically and answers with a fresh projection.
pub struct CoordinatorService {
    supabase: SupabaseClient,
    projector: ProjectionService,
}

impl CoordinatorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            projector: ProjectionService::new(config),
        }
    }

    pub async fn update_profile(
        &self,
        caller: &User,
        payload: UpdateProfileRequest,
        auth_token: &str,
    ) -> Result<ProfileProjection, ProfileError> {
        let target_id = authorize_target(caller, payload.user_id)?;
        debug!("Coordinating profile update for account: {}", target_id);

        let (account, profile) = validate_and_partition(&payload)?;

        // Target must exist before we write anything.
        self.projector.fetch_account(&target_id, auth_token).await?;

        if !account.is_empty() || !profile.is_empty() {
            // One Postgres function call covers both rows, so the commit is
            // all-or-nothing. The function upserts the profile row, which also
            // covers first-write accounts with no profile yet.
            let args = json!({
                "p_user_id": target_id,
                "p_user_fields": account.to_db_json(),
                "p_profile_fields": profile.to_db_json(),
            });

            let _: Value = self
                .supabase
                .rpc("update_patient_profile", Some(auth_token), args)
                .await
                .map_err(|e| {
                    if e.is_conflict() {
                        ProfileError::Conflict(
                            "A record with one of the submitted unique values already exists"
                                .to_string(),
                        )
                    } else {
                        ProfileError::from(e)
                    }
                })?;
        }

        // Respond with true post-write state, not an echo of the payload.
        self.projector.get_projection(&target_id, auth_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn patient(id: &Uuid) -> User {
        User {
            id: id.to_string(),
            email: Some("patient@example.com".to_string()),
            role: Some("patient".to_string()),
            metadata: None,
            created_at: None,
        }
    }

    fn admin() -> User {
        User {
            id: Uuid::new_v4().to_string(),
            email: Some("admin@example.com".to_string()),
            role: Some("admin".to_string()),
            metadata: None,
            created_at: None,
        }
    }

    #[test]
    fn payload_id_matching_caller_is_accepted() {
        let id = Uuid::new_v4();
        let resolved = authorize_target(&patient(&id), Some(id)).unwrap();
        assert_eq!(resolved, id);
    }

    #[test]
    fn missing_payload_id_targets_caller() {
        let id = Uuid::new_v4();
        assert_eq!(authorize_target(&patient(&id), None).unwrap(), id);
    }

    #[test]
    fn conflicting_payload_id_hard_fails_for_patients() {
        let id = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert_matches!(
            authorize_target(&patient(&id), Some(other)),
            Err(ProfileError::Forbidden(_))
        );
    }

    #[test]
    fn elevated_roles_may_target_other_accounts() {
        let other = Uuid::new_v4();
        assert_eq!(authorize_target(&admin(), Some(other)).unwrap(), other);
    }

    #[test]
    fn partitioning_splits_mixed_payload() {
        let payload: UpdateProfileRequest = serde_json::from_value(json!({
            "firstName": "Pat",
            "gender": "Male",
            "bloodGroup": "A+",
            "height": 180,
            "address": "123 Health Street"
        }))
        .unwrap();

        let (account, profile) = validate_and_partition(&payload).unwrap();

        assert_eq!(account.first_name.as_deref(), Some("Pat"));
        assert_eq!(account.gender, Some(Gender::Male));
        assert!(account.email.is_none());

        assert_eq!(profile.blood_group, Some(BloodGroup::APositive));
        assert_eq!(profile.height, Some(180.0));
        assert_eq!(profile.address.as_deref(), Some("123 Health Street"));
    }

    #[test]
    fn enums_are_case_normalized() {
        let payload: UpdateProfileRequest = serde_json::from_value(json!({
            "gender": "male",
            "bloodGroup": "a+"
        }))
        .unwrap();

        let (account, profile) = validate_and_partition(&payload).unwrap();
        assert_eq!(account.gender, Some(Gender::Male));
        assert_eq!(profile.blood_group, Some(BloodGroup::APositive));
    }

    #[test]
    fn invalid_blood_group_names_the_field() {
        let payload: UpdateProfileRequest =
            serde_json::from_value(json!({ "bloodGroup": "Z+" })).unwrap();

        let err = validate_and_partition(&payload).unwrap_err();
        assert_matches!(err, ProfileError::Validation { ref field, .. } if field == "bloodGroup");
        assert!(err.to_string().contains("Z+"));
    }

    #[test]
    fn invalid_gender_is_rejected() {
        let payload: UpdateProfileRequest =
            serde_json::from_value(json!({ "gender": "yes" })).unwrap();

        let err = validate_and_partition(&payload).unwrap_err();
        assert_matches!(err, ProfileError::Validation { ref field, .. } if field == "gender");
    }

    #[test]
    fn numeric_fields_coerce_from_strings() {
        let payload: UpdateProfileRequest =
            serde_json::from_value(json!({ "height": "180", "weight": 75.5 })).unwrap();

        let (_, profile) = validate_and_partition(&payload).unwrap();
        assert_eq!(profile.height, Some(180.0));
        assert_eq!(profile.weight, Some(75.5));
    }

    #[test]
    fn negative_and_non_numeric_values_are_rejected() {
        let negative: UpdateProfileRequest =
            serde_json::from_value(json!({ "height": -5 })).unwrap();
        assert_matches!(
            validate_and_partition(&negative),
            Err(ProfileError::Validation { ref field, .. }) if field == "height"
        );

        let garbage: UpdateProfileRequest =
            serde_json::from_value(json!({ "weight": "heavy" })).unwrap();
        assert_matches!(
            validate_and_partition(&garbage),
            Err(ProfileError::Validation { ref field, .. }) if field == "weight"
        );

        let zero: UpdateProfileRequest = serde_json::from_value(json!({ "weight": 0 })).unwrap();
        assert_matches!(validate_and_partition(&zero), Err(ProfileError::Validation { .. }));
    }

    #[test]
    fn dates_parse_plain_and_timestamped() {
        let plain: UpdateProfileRequest =
            serde_json::from_value(json!({ "dateOfBirth": "1995-05-15" })).unwrap();
        let (account, _) = validate_and_partition(&plain).unwrap();
        assert_eq!(
            account.date_of_birth,
            Some(NaiveDate::from_ymd_opt(1995, 5, 15).unwrap())
        );

        let timestamped: UpdateProfileRequest =
            serde_json::from_value(json!({ "dateOfBirth": "1995-05-15T00:00:00Z" })).unwrap();
        let (account, _) = validate_and_partition(&timestamped).unwrap();
        assert_eq!(
            account.date_of_birth,
            Some(NaiveDate::from_ymd_opt(1995, 5, 15).unwrap())
        );

        let invalid: UpdateProfileRequest =
            serde_json::from_value(json!({ "dateOfBirth": "not-a-date" })).unwrap();
        assert_matches!(
            validate_and_partition(&invalid),
            Err(ProfileError::Validation { ref field, .. }) if field == "dateOfBirth"
        );
    }

    #[test]
    fn free_text_is_sanitized_before_storage() {
        let payload: UpdateProfileRequest = serde_json::from_value(json!({
            "allergies": "<script>alert('x')</script>Peanuts",
            "address": "12 <b>Oak</b> Road"
        }))
        .unwrap();

        let (_, profile) = validate_and_partition(&payload).unwrap();
        let allergies = profile.allergies.unwrap();
        assert!(!allergies.to_lowercase().contains("<script"));
        assert!(allergies.contains("Peanuts"));
        assert!(!profile.address.unwrap().contains('<'));
    }

    #[test]
    fn email_is_lowercased_and_validated() {
        let payload: UpdateProfileRequest =
            serde_json::from_value(json!({ "email": "Pat@Example.COM" })).unwrap();
        let (account, _) = validate_and_partition(&payload).unwrap();
        assert_eq!(account.email.as_deref(), Some("pat@example.com"));

        let invalid: UpdateProfileRequest =
            serde_json::from_value(json!({ "email": "not-an-email" })).unwrap();
        assert_matches!(
            validate_and_partition(&invalid),
            Err(ProfileError::Validation { ref field, .. }) if field == "email"
        );
    }

    #[test]
    fn failing_field_leaves_no_partial_subsets() {
        // Account fields are valid but the profile side fails; the whole
        // partition call errors so nothing can be persisted.
        let payload: UpdateProfileRequest = serde_json::from_value(json!({
            "firstName": "Pat",
            "bloodGroup": "Z+"
        }))
        .unwrap();

        assert!(validate_and_partition(&payload).is_err());
    }

    #[test]
    fn db_json_uses_storage_column_names() {
        let payload: UpdateProfileRequest = serde_json::from_value(json!({
            "dateOfBirth": "1995-05-15",
            "gender": "Male",
            "bloodGroup": "A+",
            "emergencyContact": "John Doe - 555-0199"
        }))
        .unwrap();

        let (account, profile) = validate_and_partition(&payload).unwrap();
        let account_json = account.to_db_json();
        let profile_json = profile.to_db_json();

        assert_eq!(account_json["date_of_birth"], "1995-05-15");
        assert_eq!(account_json["gender"], "MALE");
        assert_eq!(profile_json["blood_group"], "A_POSITIVE");
        assert_eq!(profile_json["emergency_contact"], "John Doe - 555-0199");
        assert!(account_json.get("dateOfBirth").is_none());
    }

    #[test]
    fn empty_payload_produces_empty_subsets() {
        let payload = UpdateProfileRequest::default();
        let (account, profile) = validate_and_partition(&payload).unwrap();
        assert!(account.is_empty());
        assert!(profile.is_empty());
    }
}
