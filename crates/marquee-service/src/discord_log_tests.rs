//! Tests for Discord log forwarding.

use super::*;
use tracing_subscriber::layer::SubscriberExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn forward(
    server: &MockServer,
    min_level: Level,
    emit: impl FnOnce(),
) -> Vec<serde_json::Value> {
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;

    let (layer, forwarder) =
        DiscordLogLayer::new(format!("{}/webhook", server.uri()), min_level);
    let subscriber = tracing_subscriber::registry().with(layer);

    tracing::subscriber::with_default(subscriber, emit);

    // The subscriber (and with it the channel sender) is dropped once
    // with_default returns, so the forwarder drains and exits.
    forwarder.await.expect("forwarder should not panic");

    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_events_at_or_above_threshold_are_forwarded() {
    let server = MockServer::start().await;

    let bodies = forward(&server, Level::WARN, || {
        tracing::error!("disk on fire");
        tracing::warn!("smoke detected");
        tracing::info!("all quiet");
    })
    .await;

    assert_eq!(bodies.len(), 2);
    let contents: Vec<&str> = bodies
        .iter()
        .map(|body| body["content"].as_str().unwrap())
        .collect();
    assert!(contents[0].contains("disk on fire"));
    assert!(contents[0].starts_with("**ERROR**"));
    assert!(contents[1].contains("smoke detected"));
}

#[tokio::test]
async fn test_structured_fields_render_after_message() {
    let server = MockServer::start().await;

    let bodies = forward(&server, Level::WARN, || {
        tracing::warn!(status = 429, "sink rate limited");
    })
    .await;

    assert_eq!(bodies.len(), 1);
    let content = bodies[0]["content"].as_str().unwrap();
    assert!(content.contains("sink rate limited"));
    assert!(content.contains("status=429"));
}

#[tokio::test]
async fn test_http_stack_targets_are_not_forwarded() {
    let server = MockServer::start().await;

    let bodies = forward(&server, Level::TRACE, || {
        tracing::warn!(target: "hyper::client", "connection noise");
        tracing::warn!(target: "reqwest::connect", "more noise");
    })
    .await;

    assert!(bodies.is_empty());
}
