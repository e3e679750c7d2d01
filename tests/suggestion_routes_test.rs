mod common;

use std::time::Duration;

use actix_web::test;
use serde_json::{json, Value};

use common::{ScriptedGenerator, TestApp};
use trip_planner_api::config::SuggestionFallback;

async fn suggest(test_app: &TestApp, query: &str) -> (u16, Value) {
    let app = test::init_service(test_app.create_app()).await;
    let req = test::TestRequest::get()
        .uri(&format!("/api/suggestions?q={}", query))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status().as_u16();
    (status, test::read_body_json(resp).await)
}

#[actix_rt::test]
async fn test_short_query_returns_nothing() {
    let test_app = TestApp::new();

    let (status, body) = suggest(&test_app, "p").await;
    assert_eq!(status, 200);
    assert_eq!(body["suggestions"], json!([]));
    assert_eq!(body["enabled"], true);
    assert_eq!(test_app.generator.calls(), 0);
}

#[actix_rt::test]
async fn test_remote_suggestions() {
    let reply = r#"```json
[{"id":"porto-portugal","name":"Porto","fullName":"Porto, Portugal","country":"Portugal","type":"city","flag":"🇵🇹"}]
```"#;
    let test_app =
        TestApp::with_generator(ScriptedGenerator::replying(reply), SuggestionFallback::Static);

    let (status, body) = suggest(&test_app, "por").await;
    assert_eq!(status, 200);
    assert_eq!(body["suggestions"][0]["fullName"], "Porto, Portugal");
    assert_eq!(body["suggestions"][0]["type"], "city");
    assert_eq!(body["superseded"], false);
    assert_eq!(test_app.generator.calls(), 1);
}

#[actix_rt::test]
async fn test_static_fallback_without_key() {
    let test_app =
        TestApp::with_generator(ScriptedGenerator::unconfigured(), SuggestionFallback::Static);

    let (status, body) = suggest(&test_app, "par").await;
    assert_eq!(status, 200);
    assert_eq!(body["enabled"], true);
    assert_eq!(body["suggestions"][0]["id"], "paris-france");
}

#[actix_rt::test]
async fn test_static_fallback_on_remote_failure() {
    let test_app = TestApp::with_generator(
        ScriptedGenerator::failing("unavailable"),
        SuggestionFallback::Static,
    );

    let (status, body) = suggest(&test_app, "tok").await;
    assert_eq!(status, 200);
    assert_eq!(body["suggestions"][0]["name"], "Tokyo");
}

#[actix_rt::test]
async fn test_strict_mode() {
    let disabled =
        TestApp::with_generator(ScriptedGenerator::unconfigured(), SuggestionFallback::Strict);
    let (status, body) = suggest(&disabled, "paris").await;
    assert_eq!(status, 200);
    assert_eq!(body["enabled"], false);
    assert_eq!(body["suggestions"], json!([]));

    let failing = TestApp::with_generator(
        ScriptedGenerator::failing("unavailable"),
        SuggestionFallback::Strict,
    );
    let (status, body) = suggest(&failing, "paris").await;
    assert_eq!(status, 502);
    assert!(body["error"].is_string());
}

#[actix_rt::test]
async fn test_anonymous_clients_debounce_independently() {
    let test_app = TestApp::with_debounce(
        ScriptedGenerator::unconfigured(),
        SuggestionFallback::Static,
        Duration::from_millis(200),
    );
    let app = test::init_service(test_app.create_app()).await;
    let request = |client_id: &str| {
        test::TestRequest::get()
            .uri(&format!("/api/suggestions?q=par&client_id={}", client_id))
            .to_request()
    };

    let (first, second): (Value, Value) = futures::join!(
        test::call_and_read_body_json(&app, request("tab-a")),
        test::call_and_read_body_json(&app, request("tab-b")),
    );
    assert_eq!(first["superseded"], false);
    assert_eq!(second["superseded"], false);
    assert_eq!(first["suggestions"][0]["id"], "paris-france");
    assert_eq!(second["suggestions"][0]["id"], "paris-france");

    let (older, newer): (Value, Value) = futures::join!(
        test::call_and_read_body_json(&app, request("tab-a")),
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            test::call_and_read_body_json(&app, request("tab-a")).await
        },
    );
    assert_eq!(older["superseded"], true);
    assert_eq!(older["suggestions"], json!([]));
    assert_eq!(newer["superseded"], false);
}
