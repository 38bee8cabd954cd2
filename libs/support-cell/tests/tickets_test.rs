use assert_matches::assert_matches;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_utils::test_utils::{TestConfig, TestUser};
use support_cell::models::{CreateTicketRequest, TicketError, TicketStatus};
use support_cell::services::tickets::TicketService;

fn ticket_row(id: Uuid, user_id: Uuid, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "user_id": user_id,
        "subject": "Billing question",
        "message": "I was charged twice for my last consultation",
        "status": status,
        "created_at": Utc::now().to_rfc3339(),
        "updated_at": Utc::now().to_rfc3339(),
    })
}

#[tokio::test]
async fn creating_a_ticket_sanitizes_and_opens_it() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/support_tickets"))
        .and(body_partial_json(json!({ "status": "open" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([ticket_row(
                Uuid::new_v4(),
                user_id,
                "open"
            )])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri());
    let service = TicketService::new(&config);

    let ticket = service
        .create_ticket(
            &user_id,
            CreateTicketRequest {
                subject: "Billing question".to_string(),
                message: "I was charged twice for my last consultation".to_string(),
            },
            "test-token",
        )
        .await
        .unwrap();

    assert_eq!(ticket.status, TicketStatus::Open);
    assert_eq!(ticket.user_id, user_id);
}

#[tokio::test]
async fn blank_subject_never_reaches_storage() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/support_tickets"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri());
    let service = TicketService::new(&config);

    let result = service
        .create_ticket(
            &Uuid::new_v4(),
            CreateTicketRequest {
                subject: "   ".to_string(),
                message: "Help".to_string(),
            },
            "test-token",
        )
        .await;

    assert_matches!(result, Err(TicketError::ValidationError(msg)) if msg.contains("subject"));
}

#[tokio::test]
async fn oversized_message_is_rejected() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_supabase_url(&mock_server.uri());
    let service = TicketService::new(&config);

    let result = service
        .create_ticket(
            &Uuid::new_v4(),
            CreateTicketRequest {
                subject: "Long one".to_string(),
                message: "x".repeat(2001),
            },
            "test-token",
        )
        .await;

    assert_matches!(result, Err(TicketError::ValidationError(msg)) if msg.contains("message"));
}

#[tokio::test]
async fn users_list_only_their_own_tickets() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/support_tickets"))
        .and(query_param("user_id", format!("eq.{}", user_id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([
                ticket_row(Uuid::new_v4(), user_id, "open"),
                ticket_row(Uuid::new_v4(), user_id, "resolved"),
            ])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri());
    let service = TicketService::new(&config);

    let tickets = service.list_for_user(&user_id, "test-token").await.unwrap();
    assert_eq!(tickets.len(), 2);
    assert!(tickets.iter().all(|t| t.user_id == user_id));
}

#[tokio::test]
async fn full_queue_requires_elevation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/support_tickets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri());
    let service = TicketService::new(&config);

    let patient = TestUser::patient("patient@example.com").to_user();
    let result = service.list_all(&patient, "test-token").await;

    assert_matches!(result, Err(TicketError::Unauthorized));
}

#[tokio::test]
async fn admin_moves_ticket_through_lifecycle() {
    let mock_server = MockServer::start().await;
    let admin = TestUser::admin("admin@example.com").to_user();
    let ticket_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/support_tickets"))
        .and(query_param("id", format!("eq.{}", ticket_id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([ticket_row(ticket_id, user_id, "open")])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/support_tickets"))
        .and(body_partial_json(json!({ "status": "in_progress" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([ticket_row(ticket_id, user_id, "in_progress")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri());
    let service = TicketService::new(&config);

    let ticket = service
        .update_status(&admin, &ticket_id, TicketStatus::InProgress, "test-token")
        .await
        .unwrap();

    assert_eq!(ticket.status, TicketStatus::InProgress);
}

#[tokio::test]
async fn reopening_a_closed_ticket_is_rejected() {
    let mock_server = MockServer::start().await;
    let admin = TestUser::admin("admin@example.com").to_user();
    let ticket_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/support_tickets"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([ticket_row(ticket_id, Uuid::new_v4(), "closed")])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/support_tickets"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri());
    let service = TicketService::new(&config);

    let result = service
        .update_status(&admin, &ticket_id, TicketStatus::Open, "test-token")
        .await;

    assert_matches!(
        result,
        Err(TicketError::InvalidStatusTransition { from, to }) if from == "closed" && to == "open"
    );
}

#[tokio::test]
async fn patient_cannot_change_ticket_status() {
    let mock_server = MockServer::start().await;
    let patient = TestUser::patient("patient@example.com").to_user();

    let config = TestConfig::with_supabase_url(&mock_server.uri());
    let service = TicketService::new(&config);

    let result = service
        .update_status(
            &patient,
            &Uuid::new_v4(),
            TicketStatus::Resolved,
            "test-token",
        )
        .await;

    assert_matches!(result, Err(TicketError::Unauthorized));
}
