//! Last.fm API client for track metadata lookups.

use super::{
    null_as_default, AlbumArt, AlbumInfo, ProviderError, TrackMetadata, TrackProvider, TrackSource,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Size reported for Last.fm "extralarge"/"large" images.
const IMAGE_SIZE: u32 = 300;

pub struct LastFmProvider {
    client: Client,
    api_base: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct TrackInfoResponse {
    track: Option<LastFmTrack>,
    /// Last.fm reports lookup failures with a 200 and an error code.
    error: Option<i64>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct LastFmTrack {
    name: String,
    artist: LastFmArtist,
    url: Option<String>,
    album: Option<LastFmAlbum>,
}

#[derive(Deserialize)]
struct LastFmArtist {
    name: String,
}

#[derive(Deserialize)]
struct LastFmAlbum {
    title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    image: Vec<LastFmImage>,
}

#[derive(Deserialize)]
struct LastFmImage {
    #[serde(rename = "#text")]
    url: String,
    size: String,
}

impl LastFmProvider {
    /// # Arguments
    /// * `api_base` - API root (e.g., "https://ws.audioscrobbler.com/2.0/").
    /// * `api_key` - Last.fm API key.
    /// * `timeout` - Per-request timeout.
    pub fn new(
        client: Client,
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            api_key: api_key.into(),
            timeout,
        }
    }
}

#[async_trait]
impl TrackProvider for LastFmProvider {
    fn source(&self) -> TrackSource {
        TrackSource::Lastfm
    }

    async fn search(&self, title: &str, artist: &str) -> Result<TrackMetadata, ProviderError> {
        let url = format!(
            "{}?method=track.getInfo&api_key={}&artist={}&track={}&format=json",
            self.api_base,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(artist),
            urlencoding::encode(title)
        );

        let response = self.client.get(&url).timeout(self.timeout).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Http {
                status: response.status().as_u16(),
            });
        }

        let body: TrackInfoResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        if let Some(code) = body.error {
            debug!(code, message = ?body.message, "Last.fm lookup error");
            return Err(ProviderError::NotFound);
        }

        let track = body.track.ok_or(ProviderError::NotFound)?;
        Ok(normalize_track(track))
    }
}

fn pick_image(images: &[LastFmImage]) -> Option<String> {
    ["extralarge", "large"].iter().find_map(|size| {
        images
            .iter()
            .find(|img| img.size == *size && !img.url.is_empty())
            .map(|img| img.url.clone())
    })
}

fn normalize_track(track: LastFmTrack) -> TrackMetadata {
    let (album_name, album_art) = match track.album {
        Some(album) => {
            let art = pick_image(&album.image)
                .map(|url| AlbumArt {
                    url,
                    height: IMAGE_SIZE,
                    width: IMAGE_SIZE,
                })
                .into_iter()
                .collect();
            (album.title, art)
        }
        None => (None, Vec::new()),
    };

    TrackMetadata {
        source: TrackSource::Lastfm,
        id: None,
        title: track.name,
        artist: track.artist.name,
        album_art,
        preview_url: None,
        external_url: track.url,
        album: AlbumInfo {
            name: album_name,
            release_date: None,
            total_tracks: None,
        },
    }
}
