//! # Notification Model
//!
//! The assembled outbound notification. Serializes directly to the Discord
//! embed wire shape, so the dispatcher only has to wrap it in a webhook
//! body. Built once per event and discarded after dispatch.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single rich notification, shaped as a Discord embed object.
///
/// All presentation-only members (`color`, `timestamp`) are stamped by the
/// dispatcher, not the builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Notification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<NotificationField>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<Footer>,

    /// Accent color as a 24-bit RGB integer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Notification {
    /// Whether the builder produced a presentable notification.
    ///
    /// Unrecognized media types yield a degenerate notification carrying
    /// only common fields; those are logged but not dispatched.
    pub fn has_title(&self) -> bool {
        self.title.is_some()
    }
}

/// Embed author block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Embed thumbnail block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thumbnail {
    pub url: String,
}

/// Ordered name/value pair rendered in the embed body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl NotificationField {
    /// Create an inline field; every field this service emits is short
    /// enough to render side by side.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: true,
        }
    }
}

/// Embed footer block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Footer {
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;
