//! # Marquee Core
//!
//! Domain logic for the Marquee playback notifier: classifying media-server
//! webhook events, enriching playback events with TMDB metadata, and
//! assembling and dispatching Discord notifications.
//!
//! ## Architecture
//!
//! The event pipeline is a straight line with one seam:
//!
//! 1. [`event::classify`] maps the raw event name onto an [`event::Action`].
//! 2. [`playback::PlaybackEventBuilder`] assembles a
//!    [`notification::Notification`] from the payload, calling the
//!    [`tmdb::MetadataLookup`] seam zero, one, or two times.
//! 3. [`dispatch::NotificationDispatcher`] delivers the result, or no-ops
//!    when no webhook is configured.
//!
//! Nothing in the pipeline shares mutable state; configuration is built
//! once at startup and handed into each component constructor.

/// Typed webhook payload schema.
pub mod payload;

/// Event name classification.
pub mod event;

/// Outbound notification model.
pub mod notification;

/// Playback notification assembly.
pub mod playback;

/// TMDB metadata enrichment client.
pub mod tmdb;

/// Discord webhook delivery.
pub mod dispatch;

// Re-export the types the service layer wires together.
pub use dispatch::{DispatchError, DispatchOutcome, NotificationDispatcher, ACCENT_COLOR};
pub use event::{classify, Action, UnknownEventError, WebhookEvent};
pub use notification::Notification;
pub use payload::{MediaMetadata, MediaType, WebhookPayload};
pub use playback::PlaybackEventBuilder;
pub use tmdb::{
    MetadataCandidate, MetadataLookup, ProviderKind, SearchError, SearchOutcome, TmdbClient,
    TmdbConfig,
};
