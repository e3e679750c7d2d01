mod common;

use actix_web::test;
use serde_json::{json, Value};

use common::{sign_up, TestApp};

#[actix_rt::test]
async fn test_health_check_reports_store_and_generation() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["services"]["store"]["status"], "ok");
    assert_eq!(body["services"]["generation"]["status"], "ok");
}

#[actix_rt::test]
async fn test_signup_returns_token_and_session() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let session = sign_up(&app, "Ana@Example.com", "Ana Silva").await;

    let req = test::TestRequest::get()
        .uri("/api/auth/session")
        .insert_header(session.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], session.user_id.as_str());
    assert_eq!(body["email"], "ana@example.com");
    assert_eq!(body["full_name"], "Ana Silva");
    assert!(body.get("password").is_none());
}

#[actix_rt::test]
async fn test_signup_duplicate_email_conflicts() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    sign_up(&app, "ana@example.com", "Ana").await;

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({ "email": " ANA@example.com", "password": "password123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 409);
}

#[actix_rt::test]
async fn test_signup_invalid_input() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let cases = [
        json!({ "email": "invalid-email", "password": "password123" }),
        json!({ "email": "ana@example.com", "password": "short" }),
        json!({ "email": "ana@example.com" }),
    ];
    for body in cases {
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "{}", body);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }
}

#[actix_rt::test]
async fn test_signin_checks_password() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    sign_up(&app, "ana@example.com", "Ana").await;

    let req = test::TestRequest::post()
        .uri("/api/auth/signin")
        .set_json(json!({ "email": "ana@example.com", "password": "password123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["auth_token"].as_str().is_some());

    for (email, password) in [
        ("ana@example.com", "wrong-password"),
        ("nobody@example.com", "password123"),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/auth/signin")
            .set_json(json!({ "email": email, "password": password }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }
}

#[actix_rt::test]
async fn test_session_requires_valid_token() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/auth/session").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get()
        .uri("/api/auth/session")
        .insert_header(("Authorization", "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get()
        .uri("/api/auth/session")
        .insert_header(("Authorization", "Token abc"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn test_profile_update() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let session = sign_up(&app, "ana@example.com", "Ana").await;

    let req = test::TestRequest::put()
        .uri("/api/auth/profile")
        .insert_header(session.bearer())
        .set_json(json!({
            "full_name": "Ana Maria Silva",
            "avatar_url": "https://cdn.example.com/ana.png"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["full_name"], "Ana Maria Silva");
    assert_eq!(body["avatar_url"], "https://cdn.example.com/ana.png");
}

#[actix_rt::test]
async fn test_trip_options_catalog() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/trip-options").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["budgets"][0], json!({ "value": "budget", "label": "$500-1000" }));
    assert_eq!(body["travelers"][3], json!({ "value": "5+", "label": "5+ People" }));
    assert_eq!(body["interests"].as_array().unwrap().len(), 8);
}
