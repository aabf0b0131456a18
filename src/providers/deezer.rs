//! Deezer public search API client.

use super::{
    null_as_default, AlbumArt, AlbumInfo, ProviderError, TrackMetadata, TrackProvider, TrackSource,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Deezer covers carry no dimensions; `cover_xl` is 1000px but clients
/// render them at this size.
const COVER_SIZE: u32 = 500;

pub struct DeezerProvider {
    client: Client,
    api_base: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    data: Vec<DeezerTrack>,
}

#[derive(Deserialize)]
struct DeezerTrack {
    id: u64,
    title: String,
    artist: DeezerArtist,
    album: DeezerAlbum,
    preview: Option<String>,
    link: Option<String>,
}

#[derive(Deserialize)]
struct DeezerArtist {
    name: String,
}

#[derive(Deserialize)]
struct DeezerAlbum {
    title: String,
    cover: Option<String>,
    cover_big: Option<String>,
    cover_xl: Option<String>,
}

impl DeezerProvider {
    /// # Arguments
    /// * `api_base` - API base (e.g., "https://api.deezer.com").
    /// * `timeout` - Per-request timeout.
    pub fn new(client: Client, api_base: impl Into<String>, timeout: Duration) -> Self {
        let api_base: String = api_base.into();
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl TrackProvider for DeezerProvider {
    fn source(&self) -> TrackSource {
        TrackSource::Deezer
    }

    async fn search(&self, title: &str, artist: &str) -> Result<TrackMetadata, ProviderError> {
        let query = format!("{} {}", title, artist);
        let url = format!(
            "{}/search?q={}&limit=1",
            self.api_base,
            urlencoding::encode(&query)
        );

        let response = self.client.get(&url).timeout(self.timeout).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Http {
                status: response.status().as_u16(),
            });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        let track = body.data.into_iter().next().ok_or(ProviderError::NotFound)?;
        debug!(id = track.id, "Deezer match found");
        Ok(normalize_track(track))
    }
}

fn normalize_track(track: DeezerTrack) -> TrackMetadata {
    let album = track.album;
    let album_art = album
        .cover_xl
        .or(album.cover_big)
        .or(album.cover)
        .map(|url| AlbumArt {
            url,
            height: COVER_SIZE,
            width: COVER_SIZE,
        })
        .into_iter()
        .collect();

    TrackMetadata {
        source: TrackSource::Deezer,
        id: Some(track.id.to_string()),
        title: track.title,
        artist: track.artist.name,
        album_art,
        preview_url: track.preview.filter(|p| !p.is_empty()),
        external_url: track.link,
        album: AlbumInfo {
            name: Some(album.title),
            release_date: None,
            total_tracks: None,
        },
    }
}
