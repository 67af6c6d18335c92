//! # Playback Notification Builder
//!
//! Assembles a [`Notification`] from a `media.play` webhook payload:
//! per-media-type title and enrichment, then the common library / device /
//! connection / footer details. Missing payload keys degrade to omitted
//! fields; nothing in here errors.

use std::sync::Arc;

use tracing::{trace, warn};

use crate::notification::{Author, Footer, Notification, NotificationField, Thumbnail};
use crate::payload::{MediaMetadata, MediaType, WebhookPayload};
use crate::tmdb::MetadataLookup;

/// Fixed description for every playback notification.
const NOW_PLAYING: &str = "Now Playing";

/// Icon shown next to the server name in the footer.
const FOOTER_ICON_URL: &str = "https://i.imgur.com/HAcu5a1.png";

/// Builds playback notifications, enriching movie and episode events
/// through the configured metadata lookup.
pub struct PlaybackEventBuilder {
    metadata: Arc<dyn MetadataLookup>,
}

impl PlaybackEventBuilder {
    pub fn new(metadata: Arc<dyn MetadataLookup>) -> Self {
        Self { metadata }
    }

    /// Assemble a notification for a playback event.
    ///
    /// Movie and episode events issue up to two sequential metadata
    /// lookups (thumbnail, then info link); tracks and clips are formatted
    /// locally. An unrecognized media type is logged and yields a
    /// degenerate notification carrying only the common fields; the caller
    /// decides whether that is worth dispatching.
    pub async fn build(&self, payload: &WebhookPayload) -> Notification {
        let mut notification = Notification {
            description: Some(NOW_PLAYING.to_string()),
            ..Notification::default()
        };

        if let Some(account) = &payload.account {
            if let Some(user) = non_empty(&account.title) {
                notification.author = Some(Author {
                    name: user.to_string(),
                    icon_url: non_empty(&account.thumb).map(String::from),
                });
            }
        }

        let metadata = payload.metadata.clone().unwrap_or_default();

        match metadata.media_type() {
            MediaType::Movie => self.build_movie(&mut notification, &metadata).await,
            MediaType::Episode => self.build_episode(&mut notification, &metadata).await,
            MediaType::Track => build_track(&mut notification, &metadata),
            MediaType::Clip => build_clip(&mut notification, &metadata),
            MediaType::Unknown => {
                warn!(
                    media_type = metadata.raw_type.as_deref().unwrap_or("<missing>"),
                    "playback payload carries an unsupported media type"
                );
                trace!(metadata = ?metadata, "unsupported media metadata");
            }
        }

        if let Some(library) = non_empty(&metadata.library_section_title) {
            notification
                .fields
                .push(NotificationField::new("Library", library));
        }

        if let Some(player) = &payload.player {
            if let Some(device) = non_empty(&player.title) {
                notification
                    .fields
                    .push(NotificationField::new("Device", device));
            }

            // Key presence governs inclusion: an absent `local` adds no
            // field, while any present falsy value reads as Remote.
            if let Some(local) = player.local {
                notification.fields.push(NotificationField::new(
                    "Connection",
                    if local { "Local" } else { "Remote" },
                ));
            }
        }

        if let Some(server) = &payload.server {
            if let Some(name) = non_empty(&server.title) {
                notification.footer = Some(Footer {
                    text: name.to_string(),
                    icon_url: Some(FOOTER_ICON_URL.to_string()),
                });
            }
        }

        notification
    }

    async fn build_movie(&self, notification: &mut Notification, metadata: &MediaMetadata) {
        let Some(title) = non_empty(&metadata.title) else {
            return;
        };

        notification.title = Some(title.to_string());

        if let Some(url) = self.metadata.thumbnail(title, MediaType::Movie).await {
            notification.thumbnail = Some(Thumbnail { url });
        }
        notification.url = self.metadata.info(title, MediaType::Movie).await;
    }

    async fn build_episode(&self, notification: &mut Notification, metadata: &MediaMetadata) {
        let season = metadata.parent_index.unwrap_or(0);
        let episode = metadata.index.unwrap_or(0);

        if let Some(title) = non_empty(&metadata.title) {
            notification
                .fields
                .push(NotificationField::new("Title", title));
        }
        notification
            .fields
            .push(NotificationField::new("Season", format_count(season)));
        notification
            .fields
            .push(NotificationField::new("Episode", format_count(episode)));

        let Some(series) = non_empty(&metadata.grandparent_title) else {
            return;
        };

        notification.title = Some(series.to_string());

        if let Some(url) = self.metadata.thumbnail(series, MediaType::Episode).await {
            notification.thumbnail = Some(Thumbnail { url });
        }
        notification.url = self.metadata.info(series, MediaType::Episode).await;
    }
}

fn build_track(notification: &mut Notification, metadata: &MediaMetadata) {
    if let (Some(artist), Some(title)) = (
        non_empty(&metadata.parent_title),
        non_empty(&metadata.title),
    ) {
        notification.title = Some(format!("{} - {}", artist, title));
    }
}

fn build_clip(notification: &mut Notification, metadata: &MediaMetadata) {
    if let (Some(title), Some(subtype)) =
        (non_empty(&metadata.title), non_empty(&metadata.subtype))
    {
        notification.title = Some(format!("{} ({})", title, subtype));
    }
}

/// Treat absent and empty-string payload values alike.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Format a count with thousands separators, e.g. `1234` → `"1,234"`.
fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    let leading = digits.len() % 3;
    if leading > 0 {
        grouped.push_str(&digits[..leading]);
    }
    for (i, chunk) in digits.as_bytes()[leading..].chunks(3).enumerate() {
        if leading > 0 || i > 0 {
            grouped.push(',');
        }
        grouped.push_str(std::str::from_utf8(chunk).expect("ascii digits"));
    }

    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
#[path = "playback_tests.rs"]
mod tests;
