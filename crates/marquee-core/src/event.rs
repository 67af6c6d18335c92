//! # Event Classification
//!
//! Maps raw webhook event names onto handling actions. The media server
//! documents a fixed vocabulary of event names; anything outside it is a
//! client protocol error surfaced to the caller, while known-but-unhandled
//! events are acknowledged and logged only.

use std::fmt;
use std::str::FromStr;

/// Webhook event names the media server is known to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookEvent {
    MediaPlay,
    MediaPause,
    MediaResume,
    MediaStop,
    MediaScrobble,
    MediaRate,
    LibraryOnDeck,
    LibraryNew,
    DatabaseBackup,
    DatabaseCorrupted,
    NewDevice,
    PlaybackStarted,
}

impl WebhookEvent {
    /// All events that are recognized but produce no notification.
    pub const UNSUPPORTED: [WebhookEvent; 11] = [
        Self::MediaPause,
        Self::MediaResume,
        Self::MediaStop,
        Self::MediaScrobble,
        Self::MediaRate,
        Self::LibraryOnDeck,
        Self::LibraryNew,
        Self::DatabaseBackup,
        Self::DatabaseCorrupted,
        Self::NewDevice,
        Self::PlaybackStarted,
    ];

    /// Event name as the media server spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MediaPlay => "media.play",
            Self::MediaPause => "media.pause",
            Self::MediaResume => "media.resume",
            Self::MediaStop => "media.stop",
            Self::MediaScrobble => "media.scrobble",
            Self::MediaRate => "media.rate",
            Self::LibraryOnDeck => "library.on.deck",
            Self::LibraryNew => "library.new",
            Self::DatabaseBackup => "admin.database.backup",
            Self::DatabaseCorrupted => "admin.database.corrupted",
            Self::NewDevice => "device.new",
            Self::PlaybackStarted => "playback.started",
        }
    }
}

impl fmt::Display for WebhookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error for event names outside the known vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown webhook event '{event}'")]
pub struct UnknownEventError {
    pub event: String,
}

impl FromStr for WebhookEvent {
    type Err = UnknownEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "media.play" => Ok(Self::MediaPlay),
            "media.pause" => Ok(Self::MediaPause),
            "media.resume" => Ok(Self::MediaResume),
            "media.stop" => Ok(Self::MediaStop),
            "media.scrobble" => Ok(Self::MediaScrobble),
            "media.rate" => Ok(Self::MediaRate),
            "library.on.deck" => Ok(Self::LibraryOnDeck),
            "library.new" => Ok(Self::LibraryNew),
            "admin.database.backup" => Ok(Self::DatabaseBackup),
            "admin.database.corrupted" => Ok(Self::DatabaseCorrupted),
            "device.new" => Ok(Self::NewDevice),
            "playback.started" => Ok(Self::PlaybackStarted),
            _ => Err(UnknownEventError {
                event: s.to_string(),
            }),
        }
    }
}

/// How an inbound event should be handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Build and dispatch a playback notification.
    HandlePlayback,

    /// Recognized event with no handler; log and acknowledge.
    LogUnsupported(WebhookEvent),

    /// Event name outside the known vocabulary; reject as a client error.
    RejectUnknown(UnknownEventError),
}

/// Classify an event name into a handling action.
///
/// Pure function of the event name and the media-play feature flag: no
/// logging, no side effects. `media.play` yields [`Action::HandlePlayback`]
/// only while `notify_on_play` is enabled; with the flag off it is treated
/// like the other recognized-but-unhandled events.
pub fn classify(event: &str, notify_on_play: bool) -> Action {
    match event.parse::<WebhookEvent>() {
        Ok(WebhookEvent::MediaPlay) if notify_on_play => Action::HandlePlayback,
        Ok(recognized) => Action::LogUnsupported(recognized),
        Err(unknown) => Action::RejectUnknown(unknown),
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
