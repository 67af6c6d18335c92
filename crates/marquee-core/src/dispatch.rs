//! # Notification Dispatch
//!
//! Delivers an assembled notification to the configured Discord webhook.
//! Delivery is best-effort: an unconfigured webhook is a quiet no-op, and
//! failures are logged without ever reaching the inbound request. The one
//! retry concern owned here is the sink's rate limiting, honored via the
//! `Retry-After` header.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::notification::Notification;

/// Accent color stamped on every dispatched notification.
pub const ACCENT_COLOR: u32 = 0xEBAF00;

/// Bound on each delivery request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Cap on a single advertised rate-limit delay.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Final state of a dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No webhook URL configured; nothing was sent.
    Skipped,

    /// The sink accepted the notification.
    Delivered,

    /// The sink rejected the notification or was unreachable.
    Failed,
}

/// Construction-time failures for the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("failed to construct HTTP client: {message}")]
    Configuration { message: String },
}

/// Discord webhook body wrapping a single embed.
#[derive(Debug, Serialize)]
struct WebhookBody<'a> {
    embeds: [&'a Notification; 1],
}

/// Sends notifications to a Discord webhook, if one is configured.
pub struct NotificationDispatcher {
    webhook_url: Option<String>,
    http: reqwest::Client,
    max_rate_limit_retries: u32,
}

impl NotificationDispatcher {
    /// Create a new dispatcher.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Configuration`] if the HTTP client cannot
    /// be constructed.
    pub fn new(webhook_url: Option<String>) -> Result<Self, DispatchError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DispatchError::Configuration {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            webhook_url,
            http,
            max_rate_limit_retries: 3,
        })
    }

    /// Override the rate-limit retry budget.
    pub fn with_max_rate_limit_retries(mut self, retries: u32) -> Self {
        self.max_rate_limit_retries = retries;
        self
    }

    /// Deliver a notification to the configured webhook.
    ///
    /// Stamps the presentation defaults (accent color, current timestamp)
    /// before sending. A 429 from the sink is retried after its advertised
    /// `Retry-After` delay until the retry budget runs out; every other
    /// failure is logged and dropped.
    pub async fn dispatch(&self, mut notification: Notification) -> DispatchOutcome {
        let Some(url) = &self.webhook_url else {
            info!("Discord webhook for notifications is not set");
            return DispatchOutcome::Skipped;
        };

        notification.color = Some(ACCENT_COLOR);
        notification.timestamp = Some(Utc::now());

        let body = WebhookBody {
            embeds: [&notification],
        };

        let mut rate_limit_retries = 0u32;
        loop {
            let response = match self.http.post(url).json(&body).send().await {
                Ok(response) => response,
                Err(e) => {
                    error!(error = %e, "failed to deliver notification to Discord");
                    return DispatchOutcome::Failed;
                }
            };

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS
                && rate_limit_retries < self.max_rate_limit_retries
            {
                let delay = retry_after(&response);
                rate_limit_retries += 1;
                warn!(
                    delay_ms = delay.as_millis() as u64,
                    attempt = rate_limit_retries,
                    "Discord webhook rate limited; retrying"
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            if !status.is_success() {
                error!(
                    status = status.as_u16(),
                    "Discord webhook rejected notification"
                );
                return DispatchOutcome::Failed;
            }

            debug!(
                title = notification.title.as_deref().unwrap_or(""),
                "notification delivered"
            );
            return DispatchOutcome::Delivered;
        }
    }
}

/// Delay advertised by the sink. Defaults to one second and never exceeds
/// [`MAX_RETRY_AFTER`].
fn retry_after(response: &reqwest::Response) -> Duration {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
        .map(Duration::from_secs_f64)
        .unwrap_or(Duration::from_secs(1))
        .min(MAX_RETRY_AFTER)
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
