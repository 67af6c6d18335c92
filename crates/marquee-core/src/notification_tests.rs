//! Tests for the notification wire shape.

use super::*;
use chrono::TimeZone;
use serde_json::json;

#[test]
fn test_empty_notification_serializes_to_empty_object() {
    let notification = Notification::default();
    let value = serde_json::to_value(&notification).unwrap();
    assert_eq!(value, json!({}));
}

#[test]
fn test_full_notification_matches_embed_wire_shape() {
    let notification = Notification {
        author: Some(Author {
            name: "ethan".to_string(),
            icon_url: Some("https://plex.tv/users/abc/avatar".to_string()),
        }),
        description: Some("Now Playing".to_string()),
        title: Some("Inception".to_string()),
        url: Some("https://www.themoviedb.org/movie/27205".to_string()),
        thumbnail: Some(Thumbnail {
            url: "https://image.tmdb.org/t/p/original/x.jpg".to_string(),
        }),
        fields: vec![NotificationField::new("Library", "Movies")],
        footer: Some(Footer {
            text: "den".to_string(),
            icon_url: Some("https://i.imgur.com/HAcu5a1.png".to_string()),
        }),
        color: Some(0xEBAF00),
        timestamp: Some(Utc.with_ymd_and_hms(2024, 5, 1, 20, 15, 0).unwrap()),
    };

    let mut value = serde_json::to_value(&notification).unwrap();

    // The timestamp must be an RFC3339 string; the exact fractional-second
    // rendering is chrono's business.
    let timestamp = value
        .as_object_mut()
        .unwrap()
        .remove("timestamp")
        .expect("timestamp should serialize");
    assert!(timestamp.as_str().unwrap().starts_with("2024-05-01T20:15:00"));

    assert_eq!(
        value,
        json!({
            "author": {"name": "ethan", "icon_url": "https://plex.tv/users/abc/avatar"},
            "description": "Now Playing",
            "title": "Inception",
            "url": "https://www.themoviedb.org/movie/27205",
            "thumbnail": {"url": "https://image.tmdb.org/t/p/original/x.jpg"},
            "fields": [{"name": "Library", "value": "Movies", "inline": true}],
            "footer": {"text": "den", "icon_url": "https://i.imgur.com/HAcu5a1.png"},
            "color": 15446784
        })
    );
}

#[test]
fn test_author_without_icon_omits_icon_url() {
    let author = Author {
        name: "ethan".to_string(),
        icon_url: None,
    };
    assert_eq!(serde_json::to_value(&author).unwrap(), json!({"name": "ethan"}));
}

#[test]
fn test_has_title_reflects_degenerate_notifications() {
    let mut notification = Notification::default();
    assert!(!notification.has_title());

    notification.title = Some("Inception".to_string());
    assert!(notification.has_title());
}
