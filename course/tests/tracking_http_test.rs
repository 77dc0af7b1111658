//! `HttpTrackingClient` against a mock tracking endpoint.

use course_progress::{
    CourseDefinition, CourseEnvironment, CourseStore, HttpTrackingClient, TrackingClient,
    TrackingConfig, TrackingError,
};
use course_progress_testing::test_clock;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpTrackingClient {
    HttpTrackingClient::new(format!("{}/tracking", server.uri()))
}

#[tokio::test]
async fn posts_completion_and_returns_body() -> Result<(), TrackingError> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tracking"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "isComplete": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "saved" })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).send_tracking_data(true).await?;

    assert_eq!(response, json!({ "status": "saved" }));
    Ok(())
}

#[tokio::test]
async fn empty_body_becomes_null() -> Result<(), TrackingError> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tracking"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let response = client_for(&server).send_tracking_data(true).await?;

    assert_eq!(response, serde_json::Value::Null);
    Ok(())
}

#[tokio::test]
async fn error_status_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .mount(&server)
        .await;

    let result = client_for(&server).send_tracking_data(true).await;

    match result {
        Err(TrackingError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "database down");
        },
        other => unreachable!("expected an API error, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_json_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let result = client_for(&server).send_tracking_data(true).await;

    assert!(matches!(result, Err(TrackingError::ResponseParseFailed(_))));
}

#[tokio::test]
async fn slow_endpoint_hits_configured_timeout() -> Result<(), TrackingError> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let config = TrackingConfig {
        enabled: true,
        endpoint: format!("{}/tracking", server.uri()),
        timeout: Duration::from_millis(50),
    };
    let result = HttpTrackingClient::from_config(&config)?
        .send_tracking_data(true)
        .await;

    assert!(matches!(result, Err(TrackingError::RequestFailed(_))));
    Ok(())
}

#[tokio::test]
async fn store_reports_completion_once_over_http() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tracking"))
        .and(body_json(json!({ "isComplete": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let env = CourseEnvironment::new(Arc::new(test_clock()))
        .with_tracker(Arc::new(client_for(&server)));
    let store = CourseStore::new(CourseDefinition::sample(), env)?;

    store.set_element_as_complete("1").await?;
    store.set_element_as_complete("2").await?;
    store.set_element_as_complete("3").await?;
    store.wait_for_tracking(Duration::from_secs(5)).await?;

    assert!(store.state(|s| s.is_course_complete).await);
    assert!(!store.state(|s| s.is_saving_tracking).await);
    // `expect(1)` is verified when the server drops
    Ok(())
}
