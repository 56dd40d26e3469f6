use super::*;
use crate::web::{MemoryCredentials, MockTransport, RequestBody};
use serde_json::json;
use std::cell::Cell;

const BASE: &str = "http://api.test/api";

struct Harness {
    transport: Rc<MockTransport>,
    credentials: MemoryCredentials,
    expired: Rc<Cell<usize>>,
    api: ApiClient<MockTransport, MemoryCredentials>,
}

fn harness(credentials: MemoryCredentials) -> Harness {
    let transport = Rc::new(MockTransport::new());
    let expired = Rc::new(Cell::new(0));
    let counter = Rc::clone(&expired);
    let api = ApiClient::new(
        &format!("{BASE}/"),
        Rc::clone(&transport),
        credentials.clone(),
        move || counter.set(counter.get() + 1),
    );
    Harness {
        transport,
        credentials,
        expired,
        api,
    }
}

fn url(path: &str) -> String {
    format!("{BASE}{path}")
}

pub(crate) fn agent_json(id: &str, name: &str, active: bool) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "mobile": "+1 555 0100",
        "isActive": active,
        "createdAt": "2024-03-01T10:00:00Z",
        "updatedAt": "2024-03-01T10:00:00Z"
    })
}

fn user_json() -> Value {
    json!({
        "id": "u1",
        "email": "admin@example.com",
        "role": "admin",
        "createdAt": "2024-03-01T10:00:00Z",
        "updatedAt": "2024-03-01T10:00:00Z"
    })
}

#[tokio::test]
async fn login_stores_the_returned_token() {
    let h = harness(MemoryCredentials::default());
    h.transport.mock_response(
        HttpMethod::Post,
        &url("/auth/login"),
        200,
        json!({ "success": true, "message": "ok", "data": { "token": "tok-1", "user": user_json() } }),
    );

    let payload = h
        .api
        .login(&LoginRequest {
            email: "admin@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(payload.user.email, "admin@example.com");
    assert_eq!(h.credentials.get().as_deref(), Some("tok-1"));

    let sent = h.transport.last_request().unwrap();
    assert!(!sent.headers.contains_key(HEADER_AUTHORIZATION));
    match sent.body {
        Some(RequestBody::Json(body)) => {
            let body: Value = serde_json::from_str(&body).unwrap();
            assert_eq!(body["email"], "admin@example.com");
        }
        other => panic!("expected JSON body, got {other:?}"),
    }
}

#[tokio::test]
async fn stored_credential_is_sent_as_bearer() {
    let h = harness(MemoryCredentials::with_token("tok-9"));
    h.transport.mock_response(
        HttpMethod::Get,
        &url("/auth/profile"),
        200,
        json!({ "success": true, "data": { "user": user_json() } }),
    );

    let user = h.api.profile().await.unwrap();

    assert_eq!(user.id, "u1");
    let sent = h.transport.last_request().unwrap();
    assert_eq!(
        sent.headers.get(HEADER_AUTHORIZATION).map(String::as_str),
        Some("Bearer tok-9")
    );
}

#[tokio::test]
async fn unsuccessful_envelope_carries_server_message() {
    let h = harness(MemoryCredentials::with_token("tok"));
    h.transport.mock_response(
        HttpMethod::Post,
        &url("/agents"),
        400,
        json!({ "success": false, "message": "Agent with this email already exists", "errors": [{ "field": "email" }] }),
    );

    let err = h
        .api
        .create_agent(&CreateAgentRequest {
            name: "Jo".to_string(),
            email: "jo@example.com".to_string(),
            mobile: "+1".to_string(),
            password: "pw".to_string(),
        })
        .await
        .unwrap_err();

    match err {
        ClientError::Rejected {
            status,
            message,
            errors,
        } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Agent with this email already exists");
            assert_eq!(errors.len(), 1);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(h.credentials.get().as_deref(), Some("tok"));
}

#[tokio::test]
async fn empty_failure_message_falls_back() {
    let h = harness(MemoryCredentials::with_token("tok"));
    h.transport.mock_response(
        HttpMethod::Delete,
        &url("/agents/a1"),
        200,
        json!({ "success": false }),
    );

    let err = h.api.delete_agent("a1").await.unwrap_err();
    assert_eq!(err.message(), "API request failed");
}

#[tokio::test]
async fn unauthorized_from_any_endpoint_clears_the_session() {
    let endpoints = [
        (HttpMethod::Get, "/agents"),
        (HttpMethod::Get, "/uploads/distributions/d1"),
        (HttpMethod::Delete, "/uploads/distributions/d1"),
    ];

    for (method, path) in endpoints {
        let h = harness(MemoryCredentials::with_token("stale"));
        h.transport.mock_response(
            method,
            &url(path),
            401,
            json!({ "success": false, "message": "Invalid token" }),
        );

        let err = match (method, path) {
            (HttpMethod::Get, "/agents") => h.api.list_agents(AgentQuery::default()).await.err(),
            (HttpMethod::Get, _) => h.api.get_distribution("d1").await.err(),
            _ => h.api.delete_distribution("d1").await.err(),
        };

        assert_eq!(err, Some(ClientError::Unauthorized("Invalid token".to_string())));
        assert_eq!(h.credentials.get(), None, "{path} must clear the credential");
        assert_eq!(h.expired.get(), 1, "{path} must notify the session");
    }
}

#[tokio::test]
async fn unauthorized_without_envelope_uses_default_message() {
    let h = harness(MemoryCredentials::with_token("stale"));
    h.transport
        .mock_response(HttpMethod::Get, &url("/auth/verify"), 401, json!("Unauthorized"));

    let err = h.api.verify().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.message(), "Session expired. Please log in again.");
}

#[tokio::test]
async fn non_envelope_error_reports_status() {
    let h = harness(MemoryCredentials::default());
    // 没有预设响应时 MockTransport 返回纯文本 404
    let err = h.api.get_agent("missing").await.unwrap_err();
    assert_eq!(err, ClientError::Status(404));
    assert_eq!(err.message(), "Request failed with status code 404");
    assert_eq!(h.expired.get(), 0);
}

#[tokio::test]
async fn agent_list_sends_query_and_unwraps_page() {
    let h = harness(MemoryCredentials::with_token("tok"));
    h.transport.mock_response(
        HttpMethod::Get,
        &url("/agents"),
        200,
        json!({
            "success": true,
            "data": {
                "agents": [agent_json("a1", "Jo", true), agent_json("a2", "Amy", false)],
                "pagination": {
                    "currentPage": 2, "totalPages": 3, "totalAgents": 25,
                    "hasNextPage": true, "hasPrevPage": true
                }
            }
        }),
    );

    let page = h
        .api
        .list_agents(AgentQuery {
            page: Some(2),
            limit: Some(10),
            search: Some("  ".to_string()),
            status: Some(dispatchboard_shared::AgentStatusFilter::Active),
        })
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.pagination.and_then(|p| p.total_items), Some(25));
    let sent = h.transport.last_request().unwrap();
    assert_eq!(
        sent.query,
        vec![
            ("page".to_string(), "2".to_string()),
            ("limit".to_string(), "10".to_string()),
            ("status".to_string(), "active".to_string()),
        ]
    );
}

#[tokio::test]
async fn rejected_upload_never_reaches_the_network() {
    let h = harness(MemoryCredentials::with_token("tok"));

    let wrong_type = UploadFile::from_bytes("contacts.pdf", "application/pdf", vec![1, 2, 3]);
    let err = h.api.upload_and_distribute(wrong_type).await.unwrap_err();
    assert_eq!(
        err.message(),
        "Please select a valid CSV or Excel file (.csv, .xlsx, .xls)"
    );

    let too_big = UploadFile::from_bytes(
        "contacts.csv",
        "text/csv",
        vec![b'a'; (dispatchboard_shared::MAX_UPLOAD_BYTES + 1) as usize],
    );
    let err = h.api.upload_and_distribute(too_big).await.unwrap_err();
    assert_eq!(err.message(), "File size must be less than 5MB");

    assert_eq!(h.transport.request_count(), 0);
}

#[tokio::test]
async fn upload_posts_multipart_file_field() {
    let h = harness(MemoryCredentials::with_token("tok"));
    h.transport.mock_response(
        HttpMethod::Post,
        &url("/uploads/distribute"),
        200,
        json!({
            "success": true,
            "data": {
                "fileName": "contacts.csv",
                "totalRecords": 5,
                "validRecords": 5,
                "invalidRecords": 0,
                "agentsCount": 2,
                "distributions": [
                    { "agentId": "a1", "agentName": "Jo", "agentEmail": "jo@example.com", "itemsAssigned": 3, "distributionId": "d1" },
                    { "agentId": "a2", "agentName": "Amy", "agentEmail": "amy@example.com", "itemsAssigned": 2, "distributionId": "d2" }
                ]
            }
        }),
    );

    let file = UploadFile::from_bytes("contacts.csv", "text/csv", b"FirstName,Phone\nJo,1".to_vec());
    let result = h.api.upload_and_distribute(file).await.unwrap();

    assert_eq!(result.valid_records, 5);
    let assigned: u64 = result.distributions.iter().map(|d| d.items_assigned).sum();
    assert_eq!(assigned, result.valid_records);

    let sent = h.transport.last_request().unwrap();
    match sent.body {
        Some(RequestBody::Multipart { field, file }) => {
            assert_eq!(field, "file");
            assert_eq!(file.name, "contacts.csv");
        }
        other => panic!("expected multipart body, got {other:?}"),
    }
}

#[tokio::test]
async fn logout_is_local_only() {
    let h = harness(MemoryCredentials::with_token("tok"));
    h.api.logout();
    assert!(!h.api.has_credential());
    assert_eq!(h.transport.request_count(), 0);
    assert_eq!(h.expired.get(), 0);
}
