#![allow(clippy::unwrap_used)]
// Integration tests for `TenantsClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tenants_api::{
    ApiResponse, Credentials, Error, TenantFilter, TenantId, TenantInfo, TenantQuery,
    TenantStatus, TenantUpdate, TenantsClient, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, TenantsClient) {
    let server = MockServer::start().await;
    let client =
        TenantsClient::from_reqwest(&format!("{}/api", server.uri()), reqwest::Client::new())
            .unwrap();
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_create_tenant_returns_id() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/tenants"))
        .and(body_json(json!({ "name": "acme" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!(42)))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.create_tenant("acme").await.unwrap();
    assert_eq!(resp, ApiResponse::Success(42));
}

#[tokio::test]
async fn test_create_tenant_sends_empty_name_unvalidated() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/tenants"))
        .and(body_json(json!({ "name": "" })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Validation failed",
            "errors": ["Name must not be empty"]
        })))
        .mount(&server)
        .await;

    let err = client.create_tenant("").await.unwrap().err().unwrap();
    assert_eq!(err.message, "Validation failed");
    assert_eq!(err.status_code, Some(400));
    assert_eq!(err.errors, vec!["Name must not be empty".to_owned()]);
}

#[tokio::test]
async fn test_get_tenants_builds_filter_and_paging() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tenants"))
        .and(query_param("pageNumber", "2"))
        .and(query_param("pageSize", "5"))
        .and(query_param("filterTerm", r#"name @=* "acme" && status == 0"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "id": 6, "name": "Acme Corp", "status": 0 },
                { "id": 9, "name": "acme labs", "status": 0 }
            ],
            "pageNumber": 2,
            "pageSize": 5,
            "totalCount": 7
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = TenantQuery::new(2, 5, TenantFilter::from_labels("Active", "acme"));
    let page = client.get_tenants(&query).await.unwrap().ok().unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, TenantId::from("6"));
    assert_eq!(page.items[1].status(), Some(TenantStatus::Active));
    assert_eq!(page.total_count, 7);
    assert!(!page.has_next_page());
}

#[tokio::test]
async fn test_get_tenants_unknown_status_filters_by_name_only() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tenants"))
        .and(query_param("filterTerm", r#"name @=* "x""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [], "pageNumber": 1, "pageSize": 5, "totalCount": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = TenantQuery::new(1, 5, TenantFilter::from_labels("Archived", "x"));
    let resp = client.get_tenants(&query).await.unwrap();
    assert!(resp.is_success());
}

#[tokio::test]
async fn test_get_tenant_by_id() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tenants/17"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 17, "name": "Initech", "status": 2
        })))
        .mount(&server)
        .await;

    let tenant = client
        .get_tenant_by_id(&TenantId::from("17"))
        .await
        .unwrap()
        .ok()
        .unwrap();

    assert_eq!(tenant.name, "Initech");
    assert_eq!(tenant.status_label(), "Demo");
}

#[tokio::test]
async fn test_update_tenant_sends_only_present_fields() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/tenants/3"))
        .and(body_json(json!({ "status": 2 })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let update = TenantUpdate::new().status(TenantStatus::Demo);
    let resp = client
        .update_tenant(&TenantId::from("3"), &update)
        .await
        .unwrap();
    assert_eq!(resp, ApiResponse::Success(()));
}

#[tokio::test]
async fn test_delete_tenant() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/tenants/3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.delete_tenant(&TenantId::from("3")).await.unwrap();
    assert!(resp.is_success());
}

#[tokio::test]
async fn test_get_tenants_info() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tenants/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "active": 3, "inactive": 1, "demo": 2, "total": 6
        })))
        .mount(&server)
        .await;

    let info = client.get_tenants_info().await.unwrap();
    assert_eq!(
        info,
        ApiResponse::Success(TenantInfo {
            active: 3,
            inactive: 1,
            demo: 2,
            total: 6,
        })
    );
}

// ── Auth ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_with_auth_sends_bearer_and_refresh_headers() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tenants/1"))
        .and(header("Authorization", "Bearer t0ken"))
        .and(header("RefreshToken", "r3fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "name": "acme", "status": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let creds = Credentials::new("t0ken".to_owned(), "r3fresh".to_owned()).unwrap();
    let client = client.with_auth(&creds).unwrap();

    let resp = client.get_tenant_by_id(&TenantId::from("1")).await.unwrap();
    assert!(resp.is_success());
}

#[tokio::test]
async fn test_sessions_do_not_share_tokens() {
    let (server, base) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tenants/info"))
        .and(header("Authorization", "Bearer alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "active": 1, "inactive": 0, "demo": 0, "total": 1
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tenants/info"))
        .and(header("Authorization", "Bearer bob"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "Forbidden"
        })))
        .mount(&server)
        .await;

    let alice = base
        .clone()
        .with_auth(&Credentials::new("alice".to_owned(), "ra".to_owned()).unwrap())
        .unwrap();
    let bob = base
        .with_auth(&Credentials::new("bob".to_owned(), "rb".to_owned()).unwrap())
        .unwrap();

    let (a, b) = tokio::join!(alice.get_tenants_info(), bob.get_tenants_info());
    assert!(a.unwrap().is_success());
    assert!(b.unwrap().err().unwrap().is_unauthorized());
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_envelope_with_success_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tenants/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Tenant 5 does not exist",
            "statusCode": 404
        })))
        .mount(&server)
        .await;

    let err = client
        .get_tenant_by_id(&TenantId::from("5"))
        .await
        .unwrap()
        .err()
        .unwrap();
    assert!(err.is_not_found());
    assert_eq!(err.message, "Tenant 5 does not exist");
}

#[tokio::test]
async fn test_empty_401_becomes_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let resp = client.get_tenants_info().await.unwrap();
    let err = resp.err().unwrap();
    assert_eq!(err.status_code, Some(401));
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_delete_error_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/tenants/8"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "Tenant has active users"
        })))
        .mount(&server)
        .await;

    let err = client
        .delete_tenant(&TenantId::from("8"))
        .await
        .unwrap()
        .err()
        .unwrap();
    assert_eq!(err.status_code, Some(409));
}

#[tokio::test]
async fn test_update_error_envelope_with_field_map() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/tenants/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Tenant is locked",
            "errors": { "Name": ["taken"] }
        })))
        .mount(&server)
        .await;

    let update = TenantUpdate::new().name("acme");
    let err = client
        .update_tenant(&TenantId::from("5"), &update)
        .await
        .unwrap()
        .err()
        .unwrap();
    assert_eq!(err.message, "Tenant is locked");
    assert_eq!(err.errors, vec!["Name: taken".to_owned()]);
}

#[tokio::test]
async fn test_malformed_success_body_is_transport_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tenants/info"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let result = client.get_tenants_info().await;
    match result {
        Err(Error::Deserialization { body, .. }) => {
            assert_eq!(body, "<html>proxy error</html>");
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let client = TenantsClient::new(
        "http://127.0.0.1:9/api",
        &TransportConfig::default().with_timeout(std::time::Duration::from_secs(2)),
    )
    .unwrap();

    let result = client.get_tenants_info().await;
    assert!(
        matches!(result, Err(Error::Transport(_))),
        "expected Transport error, got: {result:?}"
    );
    let err = result.unwrap_err();
    assert!(err.is_connect());
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn test_slow_server_is_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tenants/info"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "active": 0, "inactive": 0, "demo": 0, "total": 0 }))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = TenantsClient::new(
        &format!("{}/api", server.uri()),
        &TransportConfig::default().with_timeout(std::time::Duration::from_millis(200)),
    )
    .unwrap();

    let err = client.get_tenants_info().await.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got: {err:?}");
    assert!(!err.is_connect());
}
