
use axum::http::StatusCode;
use fixtures::{create_mock_config, create_test_app, create_test_app_with, premium_result, send, FakeValidationService};
use opaylink_opay::SettingsRepository;
use serde_json::json;

#[tokio::test]
async fn test_cached_settings_do_not_call_validation_service() {
    let app = create_test_app(FakeValidationService::succeeding(premium_result(30)), Some("key_1")).await;

    let (status, body) = send(&app.router, "GET", "/opay/settings", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["apiKey"], "key_1");
    assert_eq!(body["running"], false);
    assert!(body.get("error").is_none());
    assert_eq!(app.service.calls(), 0);
}

#[tokio::test]
async fn test_uncached_settings_validate_exactly_once() {
    let app = create_test_app(FakeValidationService::succeeding(premium_result(30)), Some("key_1")).await;

    let (status, body) = send(&app.router, "GET", "/opay/settings?cached=false", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.service.calls(), 1);
    assert_eq!(app.service.keys(), vec!["key_1".to_string()]);
    assert_eq!(body["validation"]["plan"], "Premium");
    assert_eq!(body["validation"]["valid"], true);
}

#[tokio::test]
async fn test_uncached_settings_failure_reports_error_and_keeps_last_good() {
    let app = create_test_app(FakeValidationService::succeeding(premium_result(30)), Some("key_1")).await;
    send(&app.router, "GET", "/opay/settings?cached=false", None).await;

    app.service.reject_with(503, "Validator under maintenance");
    let (status, body) = send(&app.router, "GET", "/opay/settings?cached=false", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["error"]
        .as_str()
        .is_some_and(|e| e.contains("Validator under maintenance")));
    assert_eq!(body["validation"]["plan"], "Premium");
    assert_eq!(app.monitor.store().current().plan, "Premium");
}

#[tokio::test]
async fn test_save_blank_key_is_rejected_and_not_persisted() {
    let app = create_test_app(FakeValidationService::succeeding(premium_result(30)), None).await;

    let (status, body) = send(&app.router, "POST", "/opay/save-key", Some(json!({ "apiKey": "   " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);
    assert!(app.repository.load().await.unwrap().api_key.is_none());
    assert_eq!(app.service.calls(), 0);
}

#[tokio::test]
async fn test_save_key_persists_trimmed_key() {
    let app = create_test_app(FakeValidationService::succeeding(premium_result(30)), None).await;

    let (status, body) = send(&app.router, "POST", "/opay/save-key", Some(json!({ "apiKey": " key_2 " }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["apiKey"], "key_2");
    assert_eq!(app.repository.load().await.unwrap().api_key.as_deref(), Some("key_2"));
}

#[tokio::test]
async fn test_toggle_running_while_invalid_does_not_validate() {
    let app = create_test_app(FakeValidationService::succeeding(premium_result(30)), Some("key_1")).await;
    assert!(!app.monitor.store().is_valid());

    let (status, body) = send(&app.router, "POST", "/opay/toggle-running", Some(json!({ "running": true }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["running"], true);
    assert_eq!(app.service.calls(), 0);
    assert!(app.repository.load().await.unwrap().running);
    assert!(app.monitor.history().is_empty());
}

#[tokio::test]
async fn test_validate_without_body_uses_stored_key() {
    let app = create_test_app(FakeValidationService::succeeding(premium_result(2)), Some("stored_key")).await;

    let (status, body) = send(&app.router, "POST", "/opay/validate", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["deviceCount"], 3);
    assert_eq!(app.service.keys(), vec!["stored_key".to_string()]);
}

#[tokio::test]
async fn test_validate_prefers_explicit_key() {
    let app = create_test_app(FakeValidationService::succeeding(premium_result(2)), Some("stored_key")).await;

    let (status, _) = send(&app.router, "POST", "/opay/validate", Some(json!({ "apiKey": "typed_key" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.service.keys(), vec!["typed_key".to_string()]);
}

#[tokio::test]
async fn test_validate_without_any_key_is_bad_request() {
    let app = create_test_app(FakeValidationService::succeeding(premium_result(2)), None).await;

    let (status, body) = send(&app.router, "POST", "/opay/validate", Some(json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().is_some());
    assert_eq!(app.service.calls(), 0);

    let history = app.monitor.history();
    assert_eq!(history.len(), 1);
    assert!(!history[0].valid);
}

#[tokio::test]
async fn test_validate_blank_explicit_key_ignores_stored_key() {
    let app = create_test_app(FakeValidationService::succeeding(premium_result(2)), Some("stored_key")).await;

    let (status, body) = send(&app.router, "POST", "/opay/validate", Some(json!({ "apiKey": "   " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().is_some());
    assert_eq!(app.service.calls(), 0);
    assert!(!app.monitor.history()[0].valid);
}

#[tokio::test]
async fn test_failed_validation_keeps_stored_result() {
    let app = create_test_app(FakeValidationService::succeeding(premium_result(30)), Some("key_1")).await;
    send(&app.router, "POST", "/opay/validate", None).await;
    let before = app.monitor.store().current();

    app.service.reject_with(401, "Invalid API key");
    let (status, body) = send(&app.router, "POST", "/opay/validate", None).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], 502);

    let after = app.monitor.store().current();
    assert_eq!(after.domains, before.domains);
    assert_eq!(after.plan, before.plan);
    assert_eq!(after.device_count, before.device_count);
}

#[tokio::test]
async fn test_status_and_history_report_newest_first() {
    let app = create_test_app(FakeValidationService::succeeding(premium_result(30)), Some("key_1")).await;
    send(&app.router, "POST", "/opay/validate", None).await;
    app.service.reject_with(401, "Invalid API key");
    send(&app.router, "POST", "/opay/validate", None).await;

    let (status, body) = send(&app.router, "GET", "/opay/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "valid");
    assert_eq!(body["validation"]["plan"], "Premium");
    assert!(body["timeRemaining"]["days"].as_u64().is_some_and(|d| d >= 29));
    assert_eq!(body["history"].as_array().map(Vec::len), Some(2));

    let (status, body) = send(&app.router, "GET", "/opay/history", None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries[0]["valid"], false);
    assert!(entries[0]["error"].as_str().is_some());
    assert_eq!(entries[1]["valid"], true);
}

#[tokio::test]
async fn test_history_keeps_five_entries() {
    let app = create_test_app(FakeValidationService::rejecting(401, "Invalid API key"), Some("key_1")).await;
    for _ in 0..6 {
        send(&app.router, "POST", "/opay/validate", None).await;
    }

    let (_, body) = send(&app.router, "GET", "/opay/history", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(5));
    assert_eq!(app.service.calls(), 6);
}

#[tokio::test]
async fn test_disabled_integration_is_unavailable() {
    let app = create_test_app_with(
        create_mock_config(false),
        FakeValidationService::succeeding(premium_result(30)),
        Some("key_1"),
    )
    .await;

    let (status, body) = send(&app.router, "GET", "/opay/status", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], 503);
}
