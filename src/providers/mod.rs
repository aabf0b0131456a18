//! Music catalog providers used to enrich recommendations.
//!
//! Each adapter searches one external catalog by title/artist and normalizes
//! the provider's answer into [`TrackMetadata`]:
//! - Spotify: client-credentials bearer token, exact-match `track:`/`artist:` query
//! - Deezer: no authentication, freeform query
//! - Last.fm: API key, `track.getInfo` lookup

mod chain;
mod deezer;
mod lastfm;
mod spotify;
mod token_cache;

pub use chain::{PreparedChain, ProviderChain};
pub use deezer::DeezerProvider;
pub use lastfm::LastFmProvider;
pub use spotify::{SpotifyClient, SpotifyTrackSearch};
pub use token_cache::{SpotifyCredentials, SpotifyTokenCache};

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Which catalog produced a piece of metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackSource {
    Spotify,
    Deezer,
    Lastfm,
    /// No catalog matched, metadata is a synthesized placeholder.
    None,
}

impl TrackSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackSource::Spotify => "spotify",
            TrackSource::Deezer => "deezer",
            TrackSource::Lastfm => "lastfm",
            TrackSource::None => "none",
        }
    }
}

impl std::fmt::Display for TrackSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumArt {
    pub url: String,
    pub height: u32,
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumInfo {
    pub name: Option<String>,
    pub release_date: Option<String>,
    pub total_tracks: Option<u32>,
}

/// Track metadata normalized from any provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackMetadata {
    pub source: TrackSource,
    pub id: Option<String>,
    pub title: String,
    pub artist: String,
    pub album_art: Vec<AlbumArt>,
    pub preview_url: Option<String>,
    pub external_url: Option<String>,
    pub album: AlbumInfo,
}

/// Why a provider lookup produced no metadata.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider is not configured")]
    Unavailable,

    #[error("No matching track")]
    NotFound,

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP status {status}")]
    Http { status: u16 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Unavailable => "unavailable",
            ProviderError::NotFound => "not_found",
            ProviderError::Auth(_) => "auth",
            ProviderError::Http { .. } => "http",
            ProviderError::Transport(_) => "transport",
            ProviderError::Timeout => "timeout",
            ProviderError::Decode(_) => "decode",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ProviderError::Http {
                status: status.as_u16(),
            }
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

/// A catalog that can look up a single track by title and artist.
///
/// Implementations return only the provider's best match and never retry.
#[async_trait]
pub trait TrackProvider: Send + Sync {
    fn source(&self) -> TrackSource;

    async fn search(&self, title: &str, artist: &str) -> Result<TrackMetadata, ProviderError>;
}

/// Catalog APIs send `null` where they mean an empty list.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
