//! # Service Configuration
//!
//! Immutable configuration for the Marquee service, deserialized once at
//! startup from optional YAML files and `MARQUEE`-prefixed environment
//! variables, then handed by reference into each component constructor.
//!
//! The flat environment variables earlier deployments used
//! (`TMDB_API_KEY`, `DISCORD_WEBHOOK_URL`, ...) are still honored as
//! fallbacks for fields the structured sources leave unset.

use marquee_core::TmdbConfig;
use serde::Deserialize;
use tracing::Level;

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Event handling toggles
    pub events: EventConfig,

    /// TMDB metadata enrichment settings
    pub tmdb: TmdbConfig,

    /// Discord delivery settings
    pub discord: DiscordConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum request size in bytes
    pub max_body_size: usize,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_body_size: 10 * 1024 * 1024, // 10MB
            shutdown_timeout_seconds: 30,
        }
    }
}

/// Event handling configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Build and dispatch notifications for `media.play` events.
    ///
    /// Off by default; every other event is acknowledged without
    /// producing a notification regardless of this flag.
    pub notify_on_play: bool,
}

/// Discord delivery configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Webhook receiving playback notifications. Unset disables dispatch.
    pub webhook_url: Option<String>,

    /// Webhook receiving forwarded log records. Unset disables forwarding.
    pub log_webhook_url: Option<String>,

    /// Minimum severity forwarded to the log webhook.
    pub log_webhook_level: String,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            log_webhook_url: None,
            log_webhook_level: "warn".to_string(),
        }
    }
}

impl DiscordConfig {
    /// Parsed form of `log_webhook_level`.
    pub fn log_level(&self) -> Result<Level, ConfigError> {
        self.log_webhook_level
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel {
                field: "discord.log_webhook_level",
                value: self.log_webhook_level.clone(),
            })
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Console logging directive, used when `RUST_LOG` is unset. Accepts
    /// anything an env-filter does, from a bare level to per-target
    /// directives.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Error type for invalid configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid log level '{value}' for {field}")]
    InvalidLogLevel {
        field: &'static str,
        value: String,
    },
}

impl ServiceConfig {
    /// Validate values the type system cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.discord.log_level()?;

        tracing_subscriber::EnvFilter::try_new(&self.logging.level).map_err(|_| {
            ConfigError::InvalidLogLevel {
                field: "logging.level",
                value: self.logging.level.clone(),
            }
        })?;

        Ok(())
    }

    /// Fill unset fields from the legacy flat environment variables.
    pub fn apply_legacy_env(&mut self) {
        self.apply_legacy_env_from(|name| std::env::var(name).ok());
    }

    /// Testable form of [`ServiceConfig::apply_legacy_env`].
    ///
    /// A legacy variable only applies when it is non-empty and the
    /// structured configuration left the field unset (for optional fields)
    /// or at its default (for the rest). `PLEX_EVENT_MEDIAPLAY` can only
    /// enable the play flag, never disable it.
    pub fn apply_legacy_env_from(&mut self, get: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| get(name).filter(|value| !value.is_empty());

        if self.tmdb.api_key.is_none() {
            self.tmdb.api_key = get("TMDB_API_KEY");
        }

        if self.discord.webhook_url.is_none() {
            self.discord.webhook_url = get("DISCORD_WEBHOOK_URL");
        }

        if self.discord.log_webhook_url.is_none() {
            self.discord.log_webhook_url = get("LOG_DISCORD_WEBHOOK_URL");
        }

        if self.discord.log_webhook_level == DiscordConfig::default().log_webhook_level {
            if let Some(level) = get("LOG_DISCORD_WEBHOOK_LEVEL") {
                self.discord.log_webhook_level = level;
            }
        }

        if self.logging.level == LoggingConfig::default().level {
            if let Some(level) = get("LOG_LEVEL") {
                self.logging.level = level;
            }
        }

        if get("PLEX_EVENT_MEDIAPLAY").is_some() {
            self.events.notify_on_play = true;
        }

        if self.server.port == ServerConfig::default().port {
            if let Some(port) = get("MARQUEE_PORT").and_then(|value| value.parse().ok()) {
                self.server.port = port;
            }
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
