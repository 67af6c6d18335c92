//! Tests for the TMDB metadata client.

use super::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, api_key: Option<&str>) -> TmdbClient {
    TmdbClient::new(TmdbConfig {
        api_key: api_key.map(String::from),
        api_base_url: server.uri(),
        image_base_url: "https://image.tmdb.org/t/p/original".to_string(),
        site_base_url: "https://www.themoviedb.org".to_string(),
        timeout_seconds: 5,
    })
    .expect("client should construct")
}

async fn mount_search(server: &MockServer, query: &str, results: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("query", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": results})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_search_selects_first_matching_entry() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "Inception",
        json!([
            // Wrong kind, skipped even though the name matches.
            {"name": "Inception", "media_type": "person", "id": 1},
            {"title": "Inception", "media_type": "movie", "id": 27205, "poster_path": "/x.jpg"},
            {"title": "Inception", "media_type": "movie", "id": 999, "poster_path": "/later.jpg"}
        ]),
    )
    .await;

    let client = client_for(&server, Some("test-key"));
    let outcome = client.search("Inception", MediaType::Movie).await.unwrap();

    // First in response order wins among equally-qualified entries.
    assert_eq!(
        outcome,
        SearchOutcome::Found(MetadataCandidate {
            display_name: "Inception".to_string(),
            kind: ProviderKind::Movie,
            id: Some(27205),
            poster_path: Some("/x.jpg".to_string()),
        })
    );
}

#[tokio::test]
async fn test_search_title_match_is_case_insensitive() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "the wire",
        json!([{"name": "The Wire", "media_type": "tv", "id": 1438}]),
    )
    .await;

    let client = client_for(&server, Some("test-key"));
    let outcome = client.search("the wire", MediaType::Episode).await.unwrap();

    assert!(matches!(outcome, SearchOutcome::Found(c) if c.id == Some(1438)));
}

#[tokio::test]
async fn test_search_translates_episode_to_tv_kind() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "Severance",
        json!([
            {"title": "Severance", "media_type": "movie", "id": 8},
            {"name": "Severance", "media_type": "tv", "id": 95396}
        ]),
    )
    .await;

    let client = client_for(&server, Some("test-key"));
    let outcome = client.search("Severance", MediaType::Episode).await.unwrap();

    // The movie entry must be skipped: episodes match the provider's tv kind.
    assert!(matches!(
        outcome,
        SearchOutcome::Found(MetadataCandidate {
            kind: ProviderKind::Tv,
            id: Some(95396),
            ..
        })
    ));
}

#[tokio::test]
async fn test_search_prefers_name_over_title() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "Dark",
        json!([{"name": "Dark", "title": "Something Else", "media_type": "tv", "id": 70523}]),
    )
    .await;

    let client = client_for(&server, Some("test-key"));
    let outcome = client.search("Dark", MediaType::Episode).await.unwrap();

    assert!(matches!(outcome, SearchOutcome::Found(c) if c.display_name == "Dark"));
}

#[tokio::test]
async fn test_search_returns_no_match_when_nothing_qualifies() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "Inception",
        json!([
            {"title": "Inception: The Cobol Job", "media_type": "movie", "id": 64956},
            {"name": "Inception", "media_type": "tv", "id": 77}
        ]),
    )
    .await;

    let client = client_for(&server, Some("test-key"));
    let outcome = client.search("Inception", MediaType::Movie).await.unwrap();

    assert_eq!(outcome, SearchOutcome::NoMatch);
}

#[tokio::test]
async fn test_search_without_api_key_makes_no_request() {
    let server = MockServer::start().await;
    // No mock mounted: any request would return 404 and the json decode
    // would fail with a different error than the one asserted here.

    let client = client_for(&server, None);
    let error = client
        .search("Inception", MediaType::Movie)
        .await
        .unwrap_err();

    assert!(matches!(error, SearchError::MissingApiKey));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_thumbnail_and_info_without_api_key_make_no_request() {
    let server = MockServer::start().await;

    let client = client_for(&server, None);
    assert_eq!(client.thumbnail("Inception", MediaType::Movie).await, None);
    assert_eq!(client.info("Inception", MediaType::Movie).await, None);

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_surfaces_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"status_code": 7})))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("bad-key"));
    let error = client
        .search("Inception", MediaType::Movie)
        .await
        .unwrap_err();

    assert!(matches!(error, SearchError::Status { status: 401 }));
}

#[tokio::test]
async fn test_thumbnail_builds_full_poster_url() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "Inception",
        json!([{"title": "Inception", "media_type": "movie", "id": 42, "poster_path": "/x.jpg"}]),
    )
    .await;

    let client = client_for(&server, Some("test-key"));
    let url = client.thumbnail("Inception", MediaType::Movie).await;

    assert_eq!(
        url.as_deref(),
        Some("https://image.tmdb.org/t/p/original/x.jpg")
    );
}

#[tokio::test]
async fn test_thumbnail_without_poster_path_is_none() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "Inception",
        json!([{"title": "Inception", "media_type": "movie", "id": 42}]),
    )
    .await;

    let client = client_for(&server, Some("test-key"));
    assert_eq!(client.thumbnail("Inception", MediaType::Movie).await, None);
}

#[tokio::test]
async fn test_info_builds_detail_page_url() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "Inception",
        json!([{"title": "Inception", "media_type": "movie", "id": 42, "poster_path": "/x.jpg"}]),
    )
    .await;

    let client = client_for(&server, Some("test-key"));
    let url = client.info("Inception", MediaType::Movie).await;

    assert_eq!(url.as_deref(), Some("https://www.themoviedb.org/movie/42"));
}

#[tokio::test]
async fn test_info_for_episode_uses_tv_path() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "Severance",
        json!([{"name": "Severance", "media_type": "tv", "id": 95396}]),
    )
    .await;

    let client = client_for(&server, Some("test-key"));
    let url = client.info("Severance", MediaType::Episode).await;

    assert_eq!(
        url.as_deref(),
        Some("https://www.themoviedb.org/tv/95396")
    );
}

#[tokio::test]
async fn test_info_without_id_is_none() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "Inception",
        json!([{"title": "Inception", "media_type": "movie", "poster_path": "/x.jpg"}]),
    )
    .await;

    let client = client_for(&server, Some("test-key"));
    assert_eq!(client.info("Inception", MediaType::Movie).await, None);
}

#[tokio::test]
async fn test_thumbnail_and_info_each_issue_their_own_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .and(query_param("query", "Inception"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"title": "Inception", "media_type": "movie", "id": 42, "poster_path": "/x.jpg"}]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-key"));
    client.thumbnail("Inception", MediaType::Movie).await;
    client.info("Inception", MediaType::Movie).await;

    // Mock expectation of exactly two requests is verified on drop.
}

#[tokio::test]
async fn test_search_for_track_never_matches() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        "Holocene",
        json!([{"title": "Holocene", "media_type": "movie", "id": 7}]),
    )
    .await;

    let client = client_for(&server, Some("test-key"));
    let outcome = client.search("Holocene", MediaType::Track).await.unwrap();

    assert_eq!(outcome, SearchOutcome::NoMatch);
}
