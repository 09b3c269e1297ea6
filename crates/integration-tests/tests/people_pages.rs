//! Page rendering, the authentication gate and the page object protocol.

use axum::http::{Method, StatusCode, header};
use serde_json::json;

use pessoas_integration_tests::{TestApp, person_json};
use pessoas_web::views::{INERTIA_HEADER, LOCATION_HEADER, VERSION_HEADER};

// ============================================================================
// Authentication gate
// ============================================================================

#[tokio::test]
async fn test_anonymous_user_is_sent_to_login() {
    let mut app = TestApp::new();

    for path in ["/pessoas", "/pessoas/manutencao", "/pessoas/edit/1"] {
        let response = app.get(path).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{path}");
        assert_eq!(response.location(), Some("/login"), "{path}");
    }

    let response = app
        .submit(Method::POST, "/pessoas", &person_json("123"))
        .await;
    assert_eq!(response.location(), Some("/login"));
    assert_eq!(app.count().await, 0);
}

#[tokio::test]
async fn test_root_list_is_open_to_anonymous_visitors() {
    let mut app = TestApp::logged_in().await;
    app.submit(Method::POST, "/pessoas", &person_json("111")).await;
    app.clear_cookies();

    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains(r#"<div id="app" data-page=""#));

    let response = app.visit("/").await;
    assert_eq!(response.status, StatusCode::OK);
    let page = response.json();
    assert_eq!(page["component"], "pessoas/Index");
    assert!(page["props"]["auth"]["user"].is_null());
    assert_eq!(page["props"]["pessoas"][0]["cpf"], "111");
}

#[tokio::test]
async fn test_unverified_user_sees_root_as_anonymous() {
    let mut app = TestApp::new();
    app.login(false).await;

    let page = app.page("/").await;
    assert!(page["props"]["auth"]["user"].is_null());
}

#[tokio::test]
async fn test_unverified_user_is_sent_to_verification_notice() {
    let mut app = TestApp::new();
    app.login(false).await;

    let response = app.get("/pessoas").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/verify-email"));

    let response = app.delete("/pessoas/1").await;
    assert_eq!(response.location(), Some("/verify-email"));
}

#[tokio::test]
async fn test_health_is_not_gated() {
    let mut app = TestApp::new();

    let response = app.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "ok");

    assert_eq!(app.get("/health/ready").await.status, StatusCode::OK);
    app.store().set_unavailable(true);
    assert_eq!(
        app.get("/health/ready").await.status,
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let mut app = TestApp::new();
    let response = app.get("/health").await;
    assert!(response.headers.contains_key("x-request-id"));
}

// ============================================================================
// Page object
// ============================================================================

#[tokio::test]
async fn test_list_page_object() {
    let mut app = TestApp::logged_in().await;
    app.submit(Method::POST, "/pessoas", &person_json("111")).await;
    app.submit(Method::POST, "/pessoas", &person_json("222")).await;

    let response = app.visit("/pessoas").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers.get(INERTIA_HEADER).unwrap(), "true");
    assert_eq!(response.headers.get(header::VARY).unwrap(), INERTIA_HEADER);

    let page = response.json();
    assert_eq!(page["component"], "pessoas/Index");
    assert_eq!(page["url"], "/pessoas");
    assert_eq!(page["version"], app.config().assets.version.as_str());
    assert_eq!(page["props"]["auth"]["user"]["email"], "maria@example.com");
    assert_eq!(page["props"]["errors"], json!({}));

    let pessoas = page["props"]["pessoas"].as_array().unwrap();
    let cpfs: Vec<_> = pessoas.iter().map(|p| p["cpf"].clone()).collect();
    assert_eq!(cpfs, vec![json!("111"), json!("222")]);
    assert_eq!(pessoas[0]["id"], 1);
    assert_eq!(pessoas[0]["tipo"], "Física");
}

#[tokio::test]
async fn test_root_is_the_list() {
    let mut app = TestApp::logged_in().await;
    let page = app.page("/").await;
    assert_eq!(page["component"], "pessoas/Index");
    assert_eq!(page["props"]["auth"]["user"]["email"], "maria@example.com");
}

#[tokio::test]
async fn test_first_visit_gets_html_shell() {
    let mut app = TestApp::logged_in().await;

    let response = app.get("/pessoas").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.headers.get(INERTIA_HEADER).is_none());

    let html = response.text();
    assert!(html.contains(r#"<div id="app" data-page=""#));
    assert!(html.contains("Index"));
    assert!(html.contains(&app.config().assets.entry));
}

#[tokio::test]
async fn test_stale_asset_version_forces_reload() {
    let mut app = TestApp::logged_in().await;

    let response = app
        .send(
            Method::GET,
            "/pessoas?x=1",
            None,
            &[(INERTIA_HEADER, "true"), (VERSION_HEADER, "stale")],
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.headers.get(LOCATION_HEADER).unwrap(), "/pessoas?x=1");
}

#[tokio::test]
async fn test_new_form_has_no_person() {
    let mut app = TestApp::logged_in().await;

    let page = app.page("/pessoas/manutencao").await;
    assert_eq!(page["component"], "pessoas/Manutencao");
    assert!(page["props"].get("pessoa").is_none());
    assert!(page["props"].get("old").is_none());
}

#[tokio::test]
async fn test_edit_form_has_the_person() {
    let mut app = TestApp::logged_in().await;
    app.submit(Method::POST, "/pessoas", &person_json("123.456.789-00"))
        .await;

    let page = app.page("/pessoas/edit/1").await;
    assert_eq!(page["component"], "pessoas/Manutencao");
    assert_eq!(page["props"]["pessoa"]["cpf"], "123.456.789-00");
    assert_eq!(page["props"]["pessoa"]["nome"], "Ana Silva");
}

#[tokio::test]
async fn test_edit_form_unknown_id_is_404() {
    let mut app = TestApp::logged_in().await;

    assert_eq!(app.visit("/pessoas/edit/99").await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.visit("/pessoas/edit/abc").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_signed_id_is_not_an_alias() {
    let mut app = TestApp::logged_in().await;
    app.submit(Method::POST, "/pessoas", &person_json("111")).await;

    assert_eq!(app.visit("/pessoas/edit/+1").await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.delete("/pessoas/+1").await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.count().await, 1);
}

#[tokio::test]
async fn test_store_read_failure_is_generic_500() {
    let mut app = TestApp::logged_in().await;
    app.store().set_unavailable(true);

    let response = app.visit("/pessoas").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "Internal server error");

    let response = app.visit("/pessoas/edit/1").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}
