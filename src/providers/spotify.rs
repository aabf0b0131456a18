//! Spotify Web API client.

use super::{
    null_as_default, AlbumArt, AlbumInfo, ProviderError, TrackMetadata, TrackProvider, TrackSource,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Size reported for images Spotify returns without dimensions.
const DEFAULT_IMAGE_SIZE: u32 = 300;

pub struct SpotifyClient {
    client: Client,
    api_base: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct SearchResponse {
    tracks: Option<Paging<SpotifyTrack>>,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Paging<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    items: Vec<T>,
}

#[derive(Deserialize)]
struct SpotifyTrack {
    id: String,
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    artists: Vec<SpotifyArtistRef>,
    album: SpotifyAlbum,
    preview_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    external_urls: ExternalUrls,
}

#[derive(Deserialize)]
struct SpotifyArtistRef {
    name: String,
}

#[derive(Deserialize)]
struct SpotifyAlbum {
    name: String,
    release_date: Option<String>,
    total_tracks: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    images: Vec<SpotifyImage>,
}

#[derive(Deserialize)]
struct SpotifyImage {
    url: String,
    height: Option<u32>,
    width: Option<u32>,
}

#[derive(Deserialize, Default)]
struct ExternalUrls {
    spotify: Option<String>,
}

impl SpotifyClient {
    /// # Arguments
    /// * `api_base` - Web API base (e.g., "https://api.spotify.com/v1").
    /// * `timeout` - Per-request timeout.
    pub fn new(client: Client, api_base: impl Into<String>, timeout: Duration) -> Self {
        let api_base: String = api_base.into();
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// GETs `endpoint` (relative to the API base, including query) with a bearer token.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        token: &str,
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.api_base, endpoint);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Http {
                status: response.status().as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }

    /// Searches for the best match of `title` by `artist`.
    pub async fn search_track(
        &self,
        token: &str,
        title: &str,
        artist: &str,
    ) -> Result<TrackMetadata, ProviderError> {
        let query = format!("track:{} artist:{}", title, artist);
        let endpoint = format!(
            "/search?q={}&type=track&limit=1",
            urlencoding::encode(&query)
        );

        let body: SearchResponse = self.get_json(&endpoint, token).await?;
        let track = body
            .tracks
            .and_then(|t| t.items.into_iter().next())
            .ok_or(ProviderError::NotFound)?;

        debug!(id = %track.id, "Spotify match found");
        Ok(normalize_track(track, artist))
    }
}

fn normalize_track(track: SpotifyTrack, requested_artist: &str) -> TrackMetadata {
    let artist = track
        .artists
        .into_iter()
        .next()
        .map(|a| a.name)
        .unwrap_or_else(|| requested_artist.to_string());

    let album_art = track
        .album
        .images
        .into_iter()
        .map(|img| AlbumArt {
            url: img.url,
            height: img.height.unwrap_or(DEFAULT_IMAGE_SIZE),
            width: img.width.unwrap_or(DEFAULT_IMAGE_SIZE),
        })
        .collect();

    TrackMetadata {
        source: TrackSource::Spotify,
        id: Some(track.id),
        title: track.name,
        artist,
        album_art,
        preview_url: track.preview_url,
        external_url: track.external_urls.spotify,
        album: AlbumInfo {
            name: Some(track.album.name),
            release_date: track.album.release_date,
            total_tracks: track.album.total_tracks,
        },
    }
}

/// Spotify bound to a token for the duration of one request.
pub struct SpotifyTrackSearch {
    client: Arc<SpotifyClient>,
    token: String,
}

impl SpotifyTrackSearch {
    pub fn new(client: Arc<SpotifyClient>, token: String) -> Self {
        Self { client, token }
    }
}

#[async_trait]
impl TrackProvider for SpotifyTrackSearch {
    fn source(&self) -> TrackSource {
        TrackSource::Spotify
    }

    async fn search(&self, title: &str, artist: &str) -> Result<TrackMetadata, ProviderError> {
        self.client.search_track(&self.token, title, artist).await
    }
}
