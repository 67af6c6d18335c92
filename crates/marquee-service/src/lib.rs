//! # Marquee Service
//!
//! HTTP layer for the Marquee playback notifier: a single webhook intake
//! endpoint that classifies media-server events and runs the playback
//! pipeline, plus a health endpoint.
//!
//! The media server has posted its payload two ways over the years — a
//! form field named `payload` carrying a JSON document (multipart or
//! urlencoded), and a raw JSON body. Both decode to the same
//! [`WebhookPayload`].

/// Service configuration types.
pub mod config;

/// Discord log forwarding layer.
pub mod discord_log;

use std::sync::Arc;

use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, instrument, trace, warn};

use marquee_core::{classify, Action, NotificationDispatcher, PlaybackEventBuilder, WebhookPayload};

use crate::config::ServiceConfig;

// ============================================================================
// Application State
// ============================================================================

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Immutable service configuration
    pub config: Arc<ServiceConfig>,

    /// Builder assembling playback notifications
    pub builder: Arc<PlaybackEventBuilder>,

    /// Dispatcher delivering notifications to Discord
    pub dispatcher: Arc<NotificationDispatcher>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        config: Arc<ServiceConfig>,
        builder: Arc<PlaybackEventBuilder>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            config,
            builder,
            dispatcher,
        }
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create the HTTP router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(handle_webhook))
        .route("/health", get(handle_health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Errors that prevent the server from running.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to bind {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("server failed: {message}")]
    ServerFailed { message: String },
}

/// Start the HTTP server and run it until shutdown.
pub async fn start_server(state: AppState) -> Result<(), ServiceError> {
    let address = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    );

    let listener =
        tokio::net::TcpListener::bind(&address)
            .await
            .map_err(|e| ServiceError::BindFailed {
                address: address.clone(),
                message: e.to_string(),
            })?;

    info!(address = %address, "listening for webhook events");

    let shutdown_timeout = state.config.server.shutdown_timeout_seconds;
    let app = create_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })?;

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Resolve when the process receives SIGINT or SIGTERM.
async fn shutdown_signal(shutdown_timeout_seconds: u64) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!(
                timeout_seconds = shutdown_timeout_seconds,
                "received SIGINT, finishing in-flight requests"
            );
        },
        _ = terminate => {
            info!(
                timeout_seconds = shutdown_timeout_seconds,
                "received SIGTERM, finishing in-flight requests"
            );
        },
    }
}

// ============================================================================
// Webhook Handler
// ============================================================================

/// Machine-readable rejections for the webhook endpoint.
#[derive(Debug, thiserror::Error)]
pub enum WebhookHandlerError {
    /// Event name outside the known vocabulary.
    #[error("unknown webhook event '{event}'")]
    UnknownEvent { event: String },

    /// Body that decodes under none of the supported conventions.
    #[error("could not decode webhook payload: {message}")]
    InvalidPayload { message: String },
}

impl WebhookHandlerError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            message: message.into(),
        }
    }

    /// Stable code clients can branch on.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownEvent { .. } => "UNKNOWN_EVENT",
            Self::InvalidPayload { .. } => "INVALID_PAYLOAD",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::UnknownEvent { .. } => StatusCode::NOT_FOUND,
            Self::InvalidPayload { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

/// Error body returned for rejected webhook requests.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for WebhookHandlerError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Handle an inbound media-server webhook.
///
/// Classification decides the outcome: playback events run the build and
/// dispatch pipeline inline, recognized-but-unhandled events are logged,
/// and unknown events are rejected with `UNKNOWN_EVENT`. Enrichment and
/// dispatch failures never change the HTTP outcome.
#[instrument(skip(state, request))]
pub async fn handle_webhook(
    State(state): State<AppState>,
    request: Request,
) -> Result<StatusCode, WebhookHandlerError> {
    let payload = decode_payload(request, state.config.server.max_body_size).await?;
    debug!(event = %payload.event, "received webhook event");

    match classify(&payload.event, state.config.events.notify_on_play) {
        Action::HandlePlayback => {
            let notification = state.builder.build(&payload).await;

            if notification.has_title() {
                state.dispatcher.dispatch(notification).await;
            } else {
                info!("playback notification has no title; skipping dispatch");
            }

            Ok(StatusCode::NO_CONTENT)
        }
        Action::LogUnsupported(event) => {
            info!(event = %event, "webhook event is not supported yet");
            Ok(StatusCode::NO_CONTENT)
        }
        Action::RejectUnknown(unknown) => {
            warn!(event = %unknown.event, "webhook payload carries an unknown event");
            trace!(payload = ?payload, "unknown event payload");
            Err(WebhookHandlerError::UnknownEvent {
                event: unknown.event,
            })
        }
    }
}

/// Decode the webhook body under whichever convention the sender used.
async fn decode_payload(
    request: Request,
    max_body_size: usize,
) -> Result<WebhookPayload, WebhookHandlerError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        return decode_multipart(request).await;
    }

    let body = axum::body::to_bytes(request.into_body(), max_body_size)
        .await
        .map_err(|e| WebhookHandlerError::invalid(format!("failed to read body: {}", e)))?;

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let payload = url::form_urlencoded::parse(&body)
            .find(|(name, _)| name == "payload")
            .map(|(_, value)| value.into_owned())
            .ok_or_else(|| WebhookHandlerError::invalid("form body has no payload field"))?;

        return parse_payload(payload.as_bytes());
    }

    // Raw JSON body, the direct convention. Also the fallback for senders
    // that omit a content type.
    parse_payload(&body)
}

/// Extract the `payload` field from a multipart form body.
async fn decode_multipart(request: Request) -> Result<WebhookPayload, WebhookHandlerError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| WebhookHandlerError::invalid(format!("malformed multipart body: {}", e)))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebhookHandlerError::invalid(format!("malformed multipart field: {}", e)))?
    {
        if field.name() != Some("payload") {
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| WebhookHandlerError::invalid(format!("unreadable payload field: {}", e)))?;

        return parse_payload(text.as_bytes());
    }

    Err(WebhookHandlerError::invalid(
        "multipart body has no payload field",
    ))
}

fn parse_payload(bytes: &[u8]) -> Result<WebhookPayload, WebhookHandlerError> {
    serde_json::from_slice(bytes)
        .map_err(|e| WebhookHandlerError::invalid(format!("malformed JSON payload: {}", e)))
}

// ============================================================================
// Health Handler
// ============================================================================

/// Health check response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Basic liveness endpoint.
async fn handle_health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
