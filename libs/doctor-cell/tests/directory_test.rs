use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::services::directory::DirectoryService;
use shared_utils::test_utils::TestConfig;

fn doctor_row(first: &str, last: &str, specialization: &str) -> serde_json::Value {
    json!({
        "id": Uuid::new_v4(),
        "user_id": Uuid::new_v4(),
        "specialization": specialization,
        "years_of_experience": 8,
        "consultation_fee": 60.0,
        "bio": "Consultant",
        "users": { "first_name": first, "last_name": last },
        "doctor_schedules": [
            { "day_of_week": 1, "start_time": "09:00", "end_time": "17:00", "is_active": true }
        ]
    })
}

#[tokio::test]
async fn listing_flattens_profiles_into_summaries() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_supabase_url(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            doctor_row("Maeve", "Kelly", "Cardiology"),
            doctor_row("Sean", "Byrne", "Dermatology"),
        ])))
        .mount(&mock_server)
        .await;

    let directory = DirectoryService::new(&config);
    let doctors = directory.list_doctors(50).await.unwrap();

    assert_eq!(doctors.len(), 2);
    assert_eq!(doctors[0].name, "Dr. Maeve Kelly");
    assert_eq!(doctors[0].availability, "Monday: 09:00-17:00");
    assert_eq!(doctors[1].specialization, "Dermatology");
}

#[tokio::test]
async fn specialty_search_passes_ilike_filter() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_supabase_url(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_profiles"))
        .and(query_param("specialization", "ilike.*Cardiology*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            doctor_row("Maeve", "Kelly", "Cardiology"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let directory = DirectoryService::new(&config);
    let doctors = directory.find_by_specialty("Cardiology", 3).await.unwrap();

    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0].name, "Dr. Maeve Kelly");
}

#[tokio::test]
async fn malformed_rows_are_skipped_not_fatal() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_supabase_url(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            doctor_row("Maeve", "Kelly", "Cardiology"),
            { "id": "not-a-uuid" },
        ])))
        .mount(&mock_server)
        .await;

    let directory = DirectoryService::new(&config);
    let doctors = directory.list_doctors(50).await.unwrap();

    assert_eq!(doctors.len(), 1);
}
