//! # Discord Log Forwarding
//!
//! A tracing layer that forwards log records at or above a configured
//! severity to a Discord webhook, mirroring the console output operators
//! already watch.
//!
//! Forwarding is best-effort by construction: records flow through a
//! bounded channel into a background task, and both a full channel and a
//! failed delivery drop the record. The forwarding path itself never logs
//! through tracing, which would feed straight back into this layer.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

const CHANNEL_CAPACITY: usize = 256;
const FORWARD_TIMEOUT: Duration = Duration::from_secs(10);

/// Tracing layer forwarding formatted records to a Discord webhook.
pub struct DiscordLogLayer {
    min_level: Level,
    tx: mpsc::Sender<String>,
}

impl DiscordLogLayer {
    /// Create the layer and spawn its forwarding task.
    ///
    /// The task drains until every sender clone is dropped, so it ends
    /// with the subscriber that owns the layer.
    pub fn new(webhook_url: String, min_level: Level) -> (Self, tokio::task::JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let forwarder = tokio::spawn(forward_loop(webhook_url, rx));

        (Self { min_level, tx }, forwarder)
    }
}

impl<S: Subscriber> Layer<S> for DiscordLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        // Level orders ERROR lowest, so "at or above severity" is <=.
        if *metadata.level() > self.min_level {
            return;
        }

        // Events from the forwarding client's own HTTP stack must not feed
        // back into the channel.
        let target = metadata.target();
        if target.starts_with("hyper") || target.starts_with("reqwest") || target.starts_with("h2")
        {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let content = format!("**{}** `{}` {}", metadata.level(), target, visitor.rendered);
        let _ = self.tx.try_send(content);
    }
}

/// Renders an event's fields into a single line, message first.
#[derive(Default)]
struct MessageVisitor {
    rendered: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        use std::fmt::Write;

        if !self.rendered.is_empty() {
            self.rendered.push(' ');
        }

        if field.name() == "message" {
            let _ = write!(self.rendered, "{:?}", value);
        } else {
            let _ = write!(self.rendered, "{}={:?}", field.name(), value);
        }
    }
}

/// Drain the channel, posting each record as a plain content message.
async fn forward_loop(webhook_url: String, mut rx: mpsc::Receiver<String>) {
    let Ok(http) = reqwest::Client::builder().timeout(FORWARD_TIMEOUT).build() else {
        return;
    };

    while let Some(content) = rx.recv().await {
        let body = serde_json::json!({ "content": content });
        // Delivery failures are dropped; reporting them through tracing
        // would loop back into this channel.
        let _ = http.post(&webhook_url).json(&body).send().await;
    }
}

#[cfg(test)]
#[path = "discord_log_tests.rs"]
mod tests;
