//! Trending content straight from the Spotify catalog: new releases and
//! featured playlists.

use crate::providers::{null_as_default, ProviderError, SpotifyClient, SpotifyTokenCache};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

const NEW_RELEASES_ENDPOINT: &str = "/browse/new-releases?limit=20&country=US";
const FEATURED_PLAYLISTS_ENDPOINT: &str = "/browse/featured-playlists?limit=6&country=US";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistSummary {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalUrls {
    pub spotify: String,
}

impl Default for ExternalUrls {
    fn default() -> Self {
        Self {
            spotify: "#".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumSummary {
    pub id: String,
    pub name: String,
    pub artists: Vec<ArtistSummary>,
    pub images: Vec<Image>,
    pub external_urls: ExternalUrls,
    pub release_date: Option<String>,
    #[serde(rename = "type")]
    pub album_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub images: Vec<Image>,
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingMeta {
    pub total_new_releases: usize,
    pub total_playlists: usize,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingResponse {
    pub new_releases: Vec<AlbumSummary>,
    pub featured_playlists: Vec<PlaylistSummary>,
    #[serde(rename = "_meta")]
    pub meta: TrendingMeta,
}

#[derive(Debug, Error)]
pub enum TrendingError {
    #[error("Spotify credentials not configured")]
    NotConfigured,

    #[error("Failed to authenticate with Spotify: {0}")]
    Auth(ProviderError),

    #[error("Failed to reach Spotify: {0}")]
    Network(ProviderError),

    #[error("No music content available")]
    NoContent,
}

impl TrendingError {
    pub fn code(&self) -> &'static str {
        match self {
            TrendingError::Network(_) => "NETWORK_ERROR",
            _ => "API_ERROR",
        }
    }
}

// Upstream items are loosely typed; every field is optional here and the
// documented defaults are filled in by the transforms below.
#[derive(Deserialize, Default)]
struct NewReleasesPage {
    #[serde(default)]
    albums: Option<ItemsPage<RawAlbum>>,
}

#[derive(Deserialize, Default)]
struct FeaturedPlaylistsPage {
    #[serde(default)]
    playlists: Option<ItemsPage<RawPlaylist>>,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ItemsPage<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    items: Vec<Option<T>>,
}

#[derive(Deserialize)]
struct RawAlbum {
    id: Option<String>,
    name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    artists: Vec<ArtistSummary>,
    #[serde(default, deserialize_with = "null_as_default")]
    images: Vec<Image>,
    external_urls: Option<ExternalUrls>,
    release_date: Option<String>,
    #[serde(rename = "type")]
    album_type: Option<String>,
}

#[derive(Deserialize)]
struct RawPlaylist {
    id: String,
    name: String,
    description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    images: Vec<Image>,
    external_urls: Option<ExternalUrls>,
}

fn transform_album(album: RawAlbum) -> AlbumSummary {
    AlbumSummary {
        id: album
            .id
            .unwrap_or_else(|| format!("album-{}", rand::rng().random::<u32>())),
        name: album.name.unwrap_or_else(|| "Unknown Album".to_string()),
        artists: album.artists,
        images: album.images,
        external_urls: album.external_urls.unwrap_or_default(),
        release_date: album.release_date,
        album_type: album.album_type.unwrap_or_else(|| "album".to_string()),
    }
}

fn transform_playlist(playlist: RawPlaylist) -> PlaylistSummary {
    PlaylistSummary {
        id: playlist.id,
        name: playlist.name,
        description: playlist
            .description
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "Featured Spotify playlist".to_string()),
        images: playlist.images,
        external_urls: playlist.external_urls.unwrap_or_default(),
    }
}

fn is_network_failure(err: &ProviderError) -> bool {
    matches!(err, ProviderError::Transport(_) | ProviderError::Timeout)
}

pub struct TrendingService {
    token_cache: Arc<SpotifyTokenCache>,
    spotify: Arc<SpotifyClient>,
}

impl TrendingService {
    pub fn new(token_cache: Arc<SpotifyTokenCache>, spotify: Arc<SpotifyClient>) -> Self {
        Self {
            token_cache,
            spotify,
        }
    }

    pub async fn fetch(&self) -> Result<TrendingResponse, TrendingError> {
        let token = match self.token_cache.try_get_token().await {
            Ok(token) => token,
            Err(ProviderError::Unavailable) => return Err(TrendingError::NotConfigured),
            Err(err) if is_network_failure(&err) => return Err(TrendingError::Network(err)),
            Err(err) => return Err(TrendingError::Auth(err)),
        };

        let (releases, playlists) = tokio::join!(
            self.spotify
                .get_json::<NewReleasesPage>(NEW_RELEASES_ENDPOINT, &token),
            self.spotify
                .get_json::<FeaturedPlaylistsPage>(FEATURED_PLAYLISTS_ENDPOINT, &token),
        );

        let mut network_failure = None;
        let releases = releases.unwrap_or_else(|err| {
            warn!(endpoint = NEW_RELEASES_ENDPOINT, error = %err, "Spotify request failed");
            if is_network_failure(&err) {
                network_failure = Some(err);
            }
            NewReleasesPage::default()
        });
        let playlists = playlists.unwrap_or_else(|err| {
            warn!(endpoint = FEATURED_PLAYLISTS_ENDPOINT, error = %err, "Spotify request failed");
            if is_network_failure(&err) {
                network_failure = Some(err);
            }
            FeaturedPlaylistsPage::default()
        });

        let new_releases: Vec<AlbumSummary> = releases
            .albums
            .map(|page| page.items)
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .map(transform_album)
            .collect();
        let featured_playlists: Vec<PlaylistSummary> = playlists
            .playlists
            .map(|page| page.items)
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .map(transform_playlist)
            .collect();

        if new_releases.is_empty() && featured_playlists.is_empty() {
            return Err(match network_failure {
                Some(err) => TrendingError::Network(err),
                None => TrendingError::NoContent,
            });
        }

        info!(
            new_releases = new_releases.len(),
            playlists = featured_playlists.len(),
            "Fetched trending content"
        );

        Ok(TrendingResponse {
            meta: TrendingMeta {
                total_new_releases: new_releases.len(),
                total_playlists: featured_playlists.len(),
                timestamp: chrono::Utc::now()
                    .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            },
            new_releases,
            featured_playlists,
        })
    }
}
