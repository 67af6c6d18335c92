//! # Webhook Payload Schema
//!
//! Typed representation of the JSON document the media server pushes on
//! playback and library events. The server omits keys freely depending on
//! event type, client, and library section, so every nested field is an
//! explicit `Option` and deserialization never fails on an absent key.

use serde::{Deserialize, Deserializer};

/// Inbound webhook document, decoded once per request.
///
/// Unknown keys are ignored; the server sends far more than we consume.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    /// Event name, e.g. `media.play`. Absent events decode to an empty
    /// string and are rejected by classification.
    #[serde(default)]
    pub event: String,

    #[serde(rename = "Account", default)]
    pub account: Option<Account>,

    #[serde(rename = "Server", default)]
    pub server: Option<Server>,

    #[serde(rename = "Player", default)]
    pub player: Option<Player>,

    #[serde(rename = "Metadata", default)]
    pub metadata: Option<MediaMetadata>,
}

/// The account that triggered the event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub title: Option<String>,

    /// Avatar URL, used as the notification author icon.
    #[serde(default)]
    pub thumb: Option<String>,
}

/// The media server instance that emitted the event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Server {
    #[serde(default)]
    pub title: Option<String>,
}

/// The client device the event originated from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Player {
    #[serde(default)]
    pub title: Option<String>,

    /// Whether the player is on the server's local network.
    ///
    /// The server has emitted this as a bool, an integer, and a string over
    /// the years; any present value coerces to its truthiness. `None` means
    /// the key was absent, which downstream treats differently from a
    /// present-but-falsy value.
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub local: Option<bool>,
}

/// The subset of the `Metadata` section relevant to notification building.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    /// Raw media type tag as sent by the server. Use
    /// [`MediaMetadata::media_type`] for the closed enum form.
    #[serde(rename = "type", default)]
    pub raw_type: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    /// Series title for episodes.
    #[serde(default)]
    pub grandparent_title: Option<String>,

    /// Album or artist title for tracks.
    #[serde(default)]
    pub parent_title: Option<String>,

    /// Season number for episodes.
    #[serde(default)]
    pub parent_index: Option<i64>,

    /// Episode number within the season.
    #[serde(default)]
    pub index: Option<i64>,

    /// Clip subtype, e.g. `trailer`.
    #[serde(default)]
    pub subtype: Option<String>,

    #[serde(default)]
    pub library_section_title: Option<String>,
}

impl MediaMetadata {
    /// Media type as a closed enum; unrecognized or absent tags fall back to
    /// [`MediaType::Unknown`].
    pub fn media_type(&self) -> MediaType {
        self.raw_type
            .as_deref()
            .map(MediaType::from_tag)
            .unwrap_or(MediaType::Unknown)
    }
}

/// Recognized media types, with a fallback variant so server-added types
/// degrade instead of failing to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaType {
    Movie,
    Episode,
    Track,
    Clip,
    #[default]
    Unknown,
}

impl MediaType {
    /// Parse a media type tag, falling back to `Unknown`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "movie" => Self::Movie,
            "episode" => Self::Episode,
            "track" => Self::Track,
            "clip" => Self::Clip,
            _ => Self::Unknown,
        }
    }

    /// Tag string as the media server spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Episode => "episode",
            Self::Track => "track",
            Self::Clip => "clip",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coerce any present JSON value to its truthiness.
///
/// Called by serde only when the key exists, so `Some(false)` is
/// distinguishable from an absent key. An explicit `null` counts as present
/// and falsy.
fn deserialize_truthy<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let truthy = match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        serde_json::Value::String(s) => {
            !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false"))
        }
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    };
    Ok(Some(truthy))
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
