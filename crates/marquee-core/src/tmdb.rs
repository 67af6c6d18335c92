//! # TMDB Metadata Client
//!
//! Queries The Movie Database's multi-search endpoint to enrich playback
//! notifications with poster thumbnails and detail-page links.
//!
//! Lookups are strictly best-effort: every failure mode (missing API key,
//! transport error, non-success status, no matching result) is logged here
//! and surfaces to the notification builder as an absent enrichment, never
//! as an error. The typed [`SearchError`] exists so tests can tell
//! provider-down apart from no-match even though both degrade identically.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info, trace};

use crate::payload::MediaType;

/// Configuration for the TMDB client.
///
/// Base URLs are configurable so tests can point the client at a mock
/// server; production leaves them at the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    /// API key enabling metadata lookups. Absent key disables enrichment.
    pub api_key: Option<String>,

    /// API root, e.g. `https://api.themoviedb.org/3`.
    pub api_base_url: String,

    /// Root for full-size poster images.
    pub image_base_url: String,

    /// Root for human-facing detail pages.
    pub site_base_url: String,

    /// Bound in seconds on each outbound request.
    pub timeout_seconds: u64,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p/original".to_string(),
            site_base_url: "https://www.themoviedb.org".to_string(),
            timeout_seconds: 10,
        }
    }
}

/// Media kind in the provider's vocabulary.
///
/// The provider's multi-search mixes movies, TV shows, and people; kinds we
/// never match collapse into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Movie,
    Tv,
    #[serde(other)]
    Other,
}

impl ProviderKind {
    /// URL path segment for detail pages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
            Self::Other => "other",
        }
    }
}

/// Translate a local media type into the provider kind it must match.
///
/// Episodes are looked up by their series, which the provider files under
/// `tv`. Types the provider has no vocabulary for return `None` and can
/// never match.
fn provider_kind_for(media_type: MediaType) -> Option<ProviderKind> {
    match media_type {
        MediaType::Movie => Some(ProviderKind::Movie),
        MediaType::Episode => Some(ProviderKind::Tv),
        MediaType::Track | MediaType::Clip | MediaType::Unknown => None,
    }
}

/// A single accepted result from the provider's search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataCandidate {
    pub display_name: String,
    pub kind: ProviderKind,
    pub id: Option<u64>,
    pub poster_path: Option<String>,
}

/// Outcome of a completed search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(MetadataCandidate),
    NoMatch,
}

/// Failure reasons for a search that never produced an outcome.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("TMDB API key is not configured")]
    MissingApiKey,

    #[error("failed to construct HTTP client: {message}")]
    Configuration { message: String },

    #[error("TMDB request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("TMDB returned status {status}")]
    Status { status: u16 },
}

/// Enrichment lookups the notification builder depends on.
///
/// Behind a trait so builder tests can substitute a recording mock for the
/// real client.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Full-size poster URL for the best-matching candidate, if any.
    async fn thumbnail(&self, title: &str, media_type: MediaType) -> Option<String>;

    /// Detail-page URL for the best-matching candidate, if any.
    async fn info(&self, title: &str, media_type: MediaType) -> Option<String>;
}

/// TMDB-backed implementation of [`MetadataLookup`].
pub struct TmdbClient {
    config: TmdbConfig,
    http: reqwest::Client,
}

/// Wire shape of the provider's multi-search response.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    /// TV shows and people carry `name`; movies carry `title`.
    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    title: Option<String>,

    #[serde(default)]
    media_type: Option<ProviderKind>,

    #[serde(default)]
    id: Option<u64>,

    #[serde(default)]
    poster_path: Option<String>,
}

impl TmdbClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Configuration`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: TmdbConfig) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| SearchError::Configuration {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { config, http })
    }

    /// Search the provider for a title of the given local media type.
    ///
    /// Issues one multi-search request and selects the first entry, in the
    /// provider's response order, whose display name equals the query
    /// case-insensitively and whose kind matches the (translated) local
    /// type. First-in-response-order is the documented tie-break when
    /// several entries qualify.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MissingApiKey`] without issuing a request
    /// when no API key is configured, and transport/status errors when the
    /// request itself fails. "No entry matched" is not an error; it is
    /// [`SearchOutcome::NoMatch`].
    pub async fn search(
        &self,
        title: &str,
        media_type: MediaType,
    ) -> Result<SearchOutcome, SearchError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(SearchError::MissingApiKey)?;

        let url = format!("{}/search/multi", self.config.api_base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("api_key", api_key), ("query", title)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
            });
        }

        let body: SearchResponse = response.json().await?;
        trace!(
            title = %title,
            media_type = %media_type,
            results = body.results.len(),
            "TMDB multi-search response"
        );

        let Some(expected_kind) = provider_kind_for(media_type) else {
            debug!(
                media_type = %media_type,
                "media type has no provider vocabulary; nothing can match"
            );
            return Ok(SearchOutcome::NoMatch);
        };

        for entry in body.results {
            // TV entries carry `name`, movie entries `title`; prefer `name`
            // when both are present.
            let Some(display_name) = entry.name.or(entry.title) else {
                continue;
            };

            if display_name.to_lowercase() != title.to_lowercase() {
                continue;
            }

            if entry.media_type != Some(expected_kind) {
                continue;
            }

            return Ok(SearchOutcome::Found(MetadataCandidate {
                display_name,
                kind: expected_kind,
                id: entry.id,
                poster_path: entry.poster_path,
            }));
        }

        Ok(SearchOutcome::NoMatch)
    }

    /// Run a search and log every degraded outcome for the given purpose.
    async fn search_logged(
        &self,
        title: &str,
        media_type: MediaType,
        purpose: &str,
    ) -> Option<MetadataCandidate> {
        match self.search(title, media_type).await {
            Ok(SearchOutcome::Found(candidate)) => Some(candidate),
            Ok(SearchOutcome::NoMatch) => {
                info!(
                    title = %title,
                    media_type = %media_type,
                    "unable to locate {} on TMDB",
                    purpose
                );
                None
            }
            Err(SearchError::MissingApiKey) => {
                info!("skipping {} lookup, TMDB API key is not set", purpose);
                None
            }
            Err(e) => {
                error!(
                    title = %title,
                    media_type = %media_type,
                    error = %e,
                    "failed to fetch {} from TMDB",
                    purpose
                );
                None
            }
        }
    }
}

#[async_trait]
impl MetadataLookup for TmdbClient {
    async fn thumbnail(&self, title: &str, media_type: MediaType) -> Option<String> {
        let candidate = self.search_logged(title, media_type, "thumbnail").await?;

        match candidate.poster_path {
            Some(poster_path) => Some(format!("{}{}", self.config.image_base_url, poster_path)),
            None => {
                info!(
                    title = %title,
                    media_type = %media_type,
                    "TMDB candidate has no poster"
                );
                None
            }
        }
    }

    async fn info(&self, title: &str, media_type: MediaType) -> Option<String> {
        let candidate = self.search_logged(title, media_type, "information").await?;

        match candidate.id {
            Some(id) => Some(format!(
                "{}/{}/{}",
                self.config.site_base_url,
                candidate.kind.as_str(),
                id
            )),
            None => {
                info!(
                    title = %title,
                    media_type = %media_type,
                    "TMDB candidate has no id"
                );
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "tmdb_tests.rs"]
mod tests;
