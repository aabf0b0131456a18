//! In-process stand-in for every third-party API the server talks to.
//!
//! One axum router serves the generative API, the Spotify accounts and web
//! APIs, Deezer and Last.fm under distinct path prefixes. Behaviour is fixed
//! at spawn time and every endpoint counts its hits.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::constants::*;

/// How the fake upstream answers.
#[derive(Clone, Debug)]
pub struct UpstreamBehavior {
    /// Text of the generative API's first content block.
    pub llm_text: String,
    /// Non-200 status returned by the generative API instead of `llm_text`.
    pub llm_status: Option<u16>,
    pub llm_delay: Duration,
    /// `expires_in` of issued Spotify tokens.
    pub token_expires_in: u64,
    pub spotify_matches: bool,
    pub deezer_matches: bool,
    pub deezer_delay: Duration,
    pub lastfm_matches: bool,
    pub trending_available: bool,
}

impl Default for UpstreamBehavior {
    fn default() -> Self {
        Self {
            llm_text: LLM_THREE_SONGS.to_string(),
            llm_status: None,
            llm_delay: Duration::ZERO,
            token_expires_in: 3600,
            spotify_matches: false,
            deezer_matches: false,
            deezer_delay: Duration::ZERO,
            lastfm_matches: false,
            trending_available: true,
        }
    }
}

#[derive(Default)]
pub struct UpstreamCounters {
    pub llm_requests: AtomicUsize,
    pub token_requests: AtomicUsize,
    pub spotify_searches: AtomicUsize,
    pub trending_requests: AtomicUsize,
    pub deezer_searches: AtomicUsize,
    pub lastfm_lookups: AtomicUsize,
}

struct UpstreamState {
    behavior: UpstreamBehavior,
    counters: Arc<UpstreamCounters>,
}

type SharedState = Arc<UpstreamState>;

pub struct FakeUpstream {
    pub base_url: String,
    pub counters: Arc<UpstreamCounters>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl FakeUpstream {
    pub async fn spawn(behavior: UpstreamBehavior) -> Self {
        let counters = Arc::new(UpstreamCounters::default());
        let state = Arc::new(UpstreamState {
            behavior,
            counters: counters.clone(),
        });

        let app = Router::new()
            .route("/v1/messages", post(messages))
            .route("/api/token", post(token))
            .route("/v1/search", get(spotify_search))
            .route("/v1/browse/new-releases", get(new_releases))
            .route("/v1/browse/featured-playlists", get(featured_playlists))
            .route("/deezer/search", get(deezer_search))
            .route("/lastfm/2.0/", get(lastfm_track_info))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake upstream");
        let port = listener.local_addr().expect("No local address").port();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Fake upstream failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            counters,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn llm_requests(&self) -> usize {
        self.counters.llm_requests.load(Ordering::SeqCst)
    }

    pub fn token_requests(&self) -> usize {
        self.counters.token_requests.load(Ordering::SeqCst)
    }

    pub fn spotify_searches(&self) -> usize {
        self.counters.spotify_searches.load(Ordering::SeqCst)
    }

    pub fn deezer_searches(&self) -> usize {
        self.counters.deezer_searches.load(Ordering::SeqCst)
    }

    pub fn lastfm_lookups(&self) -> usize {
        self.counters.lastfm_lookups.load(Ordering::SeqCst)
    }
}

impl Drop for FakeUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

// ============================================================================
// Generative API
// ============================================================================

async fn messages(State(state): State<SharedState>) -> Response {
    state.counters.llm_requests.fetch_add(1, Ordering::SeqCst);
    let behavior = &state.behavior;
    if !behavior.llm_delay.is_zero() {
        tokio::time::sleep(behavior.llm_delay).await;
    }

    if let Some(status) = behavior.llm_status {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = json!({"type": "error", "error": {"type": "api_error", "message": "fake"}});
        return (status, Json(body)).into_response();
    }

    Json(json!({
        "id": "msg_fake",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": behavior.llm_text}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 120, "output_tokens": 340}
    }))
    .into_response()
}

// ============================================================================
// Spotify
// ============================================================================

async fn token(State(state): State<SharedState>) -> Json<Value> {
    let issued = state.counters.token_requests.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({
        "access_token": format!("fake-token-{}", issued),
        "token_type": "Bearer",
        "expires_in": state.behavior.token_expires_in
    }))
}

/// Splits Spotify's `track:<title> artist:<artist>` query.
fn split_spotify_query(query: &str) -> (String, String) {
    let rest = query.strip_prefix("track:").unwrap_or(query);
    match rest.split_once(" artist:") {
        Some((title, artist)) => (title.to_string(), artist.to_string()),
        None => (rest.to_string(), String::new()),
    }
}

async fn spotify_search(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let hit = state.counters.spotify_searches.fetch_add(1, Ordering::SeqCst);
    if !state.behavior.spotify_matches {
        return Json(json!({"tracks": {"items": []}}));
    }

    let (title, artist) = split_spotify_query(params.get("q").map(String::as_str).unwrap_or(""));
    let id = format!("sp{}", hit);
    Json(json!({
        "tracks": {"items": [{
            "id": id,
            "name": title,
            "artists": [{"name": artist}],
            "album": {
                "name": "Spotify Album",
                "release_date": "1959-08-17",
                "total_tracks": 5,
                "images": [{"url": "https://i.scdn.co/image/fake", "height": 640, "width": 640}]
            },
            "preview_url": null,
            "external_urls": {"spotify": format!("{}{}", SPOTIFY_LINK_PREFIX, id)}
        }]}
    }))
}

async fn new_releases(State(state): State<SharedState>) -> Response {
    state.counters.trending_requests.fetch_add(1, Ordering::SeqCst);
    if !state.behavior.trending_available {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    Json(json!({
        "albums": {"items": [
            {"id": "alb1", "name": "Fresh Album", "artists": [{"id": "ar1", "name": "New Band"}],
             "images": [{"url": "https://i.scdn.co/image/alb1", "height": 640, "width": 640}],
             "external_urls": {"spotify": "https://open.spotify.com/album/alb1"},
             "release_date": "2026-10-01", "type": "album"},
            {"name": "Untyped Single"}
        ]}
    }))
    .into_response()
}

async fn featured_playlists(State(state): State<SharedState>) -> Response {
    state.counters.trending_requests.fetch_add(1, Ordering::SeqCst);
    if !state.behavior.trending_available {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    Json(json!({
        "playlists": {"items": [
            {"id": "pl1", "name": "Hot Hits", "description": "", "images": []},
            null
        ]}
    }))
    .into_response()
}

// ============================================================================
// Deezer
// ============================================================================

async fn deezer_search(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let hit = state.counters.deezer_searches.fetch_add(1, Ordering::SeqCst);
    if !state.behavior.deezer_delay.is_zero() {
        tokio::time::sleep(state.behavior.deezer_delay).await;
    }
    if !state.behavior.deezer_matches {
        return Json(json!({"data": [], "total": 0}));
    }

    let query = params.get("q").cloned().unwrap_or_default();
    let id = 3_000_000 + hit as u64;
    Json(json!({
        "data": [{
            "id": id,
            "title": query,
            "artist": {"name": "Deezer Artist"},
            "album": {
                "title": "Deezer Album",
                "cover": "https://e-cdns-images.dzcdn.net/cover.jpg",
                "cover_big": "https://e-cdns-images.dzcdn.net/cover_big.jpg",
                "cover_xl": "https://e-cdns-images.dzcdn.net/cover_xl.jpg"
            },
            "preview": "https://cdns-preview.dzcdn.net/preview.mp3",
            "link": format!("{}{}", DEEZER_LINK_PREFIX, id)
        }],
        "total": 1
    }))
}

// ============================================================================
// Last.fm
// ============================================================================

async fn lastfm_track_info(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.counters.lastfm_lookups.fetch_add(1, Ordering::SeqCst);
    if !state.behavior.lastfm_matches || params.get("api_key").map(String::as_str) != Some(TEST_LASTFM_KEY) {
        return Json(json!({"error": 6, "message": "Track not found"}));
    }

    Json(json!({
        "track": {
            "name": params.get("track").cloned().unwrap_or_default(),
            "artist": {"name": params.get("artist").cloned().unwrap_or_default()},
            "url": "https://www.last.fm/music/fake",
            "album": {
                "title": "Last.fm Album",
                "image": [
                    {"#text": "https://lastfm.freetls.fastly.net/small.png", "size": "small"},
                    {"#text": "https://lastfm.freetls.fastly.net/xl.png", "size": "extralarge"}
                ]
            }
        }
    }))
}
