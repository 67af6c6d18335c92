//! # Marquee
//!
//! Binary entry point for the Marquee playback notifier.
//!
//! This executable:
//! - Loads configuration from environment and files
//! - Initializes logging (console, plus optional Discord forwarding)
//! - Wires the metadata client, notification builder, and dispatcher
//! - Starts the HTTP server from marquee-service

use std::sync::Arc;

use marquee_core::{NotificationDispatcher, PlaybackEventBuilder, TmdbClient};
use marquee_service::config::ServiceConfig;
use marquee_service::discord_log::DiscordLogLayer;
use marquee_service::{start_server, AppState, ServiceError};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // -------------------------------------------------------------------------
    // Load configuration
    //
    // Sources (applied in order — later sources override earlier ones):
    //  1. /etc/marquee/service.yaml            — system-wide defaults
    //  2. ./config/service.yaml                — deployment-local override
    //  3. Path given by MARQUEE_CONFIG_FILE    — operator-specified file
    //  4. Environment variables prefixed MARQUEE__ (double-underscore
    //     separator), e.g. MARQUEE__SERVER__PORT=9000 sets server.port
    //  5. Legacy flat variables (TMDB_API_KEY, DISCORD_WEBHOOK_URL, ...)
    //     for fields the sources above left unset
    //
    // Every field carries a serde default, so an entirely unconfigured
    // environment produces a valid config. A malformed file or an
    // unparseable value is a hard error.
    //
    // Configuration is loaded before tracing is initialized so the
    // configured console level can seed the filter; load failures go to
    // stderr directly.
    // -------------------------------------------------------------------------
    let mut config_builder = config::Config::builder()
        .add_source(
            config::File::with_name("/etc/marquee/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        )
        .add_source(
            config::File::with_name("config/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        );

    // Optional explicit path supplied by the operator.
    if let Ok(explicit_path) = std::env::var("MARQUEE_CONFIG_FILE") {
        if !explicit_path.is_empty() {
            config_builder = config_builder.add_source(
                config::File::with_name(&explicit_path)
                    .required(true)
                    .format(config::FileFormat::Yaml),
            );
        }
    }

    let raw_config = match config_builder
        .add_source(config::Environment::with_prefix("MARQUEE").separator("__"))
        .build()
    {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("failed to build configuration: {}", e);
            std::process::exit(3);
        }
    };

    let mut service_config: ServiceConfig = match raw_config.try_deserialize() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("could not deserialize service configuration: {}", e);
            std::process::exit(3);
        }
    };

    service_config.apply_legacy_env();

    if let Err(e) = service_config.validate() {
        eprintln!("service configuration is invalid: {}", e);
        std::process::exit(3);
    }

    // -------------------------------------------------------------------------
    // Initialize logging
    //
    // RUST_LOG wins when set; otherwise the configured console level
    // applies. The optional Discord layer forwards records at or above its
    // own severity, within whatever the global filter lets through.
    // -------------------------------------------------------------------------
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&service_config.logging.level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let discord_layer = match &service_config.discord.log_webhook_url {
        Some(url) => {
            let level = match service_config.discord.log_level() {
                Ok(level) => level,
                Err(e) => {
                    eprintln!("service configuration is invalid: {}", e);
                    std::process::exit(3);
                }
            };
            let (layer, _forwarder) = DiscordLogLayer::new(url.clone(), level);
            Some(layer)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(discord_layer)
        .init();

    info!("starting Marquee");

    if service_config.discord.log_webhook_url.is_some() {
        info!(
            level = %service_config.discord.log_webhook_level,
            "forwarding log records to Discord webhook"
        );
    }

    // -------------------------------------------------------------------------
    // Wire components
    //
    // All three are constructed once from the immutable configuration and
    // shared across request handlers.
    // -------------------------------------------------------------------------
    if service_config.tmdb.api_key.is_none() {
        info!("TMDB API key is not set; metadata enrichment is disabled");
    }
    if service_config.discord.webhook_url.is_none() {
        info!("Discord webhook for notifications is not set; dispatch is disabled");
    }
    if !service_config.events.notify_on_play {
        info!("media.play notifications are disabled; set events.notify_on_play to enable");
    }

    let tmdb = match TmdbClient::new(service_config.tmdb.clone()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!(error = %e, "failed to construct TMDB client; aborting");
            std::process::exit(3);
        }
    };

    let dispatcher = match NotificationDispatcher::new(service_config.discord.webhook_url.clone())
    {
        Ok(dispatcher) => Arc::new(dispatcher),
        Err(e) => {
            error!(error = %e, "failed to construct notification dispatcher; aborting");
            std::process::exit(3);
        }
    };

    let builder = Arc::new(PlaybackEventBuilder::new(tmdb));

    let state = AppState::new(Arc::new(service_config), builder, dispatcher);

    // Start the server
    if let Err(e) = start_server(state).await {
        error!(error = %e, "failed to run server");

        let exit_code = match e {
            ServiceError::BindFailed { .. } => 1,
            ServiceError::ServerFailed { .. } => 2,
        };

        std::process::exit(exit_code);
    }

    Ok(())
}
