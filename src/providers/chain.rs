//! Provider fallback chain.
//!
//! All usable providers are raced for each lookup; the first match wins and
//! the losing lookups are dropped, which cancels their in-flight requests.
//! A wrapping deadline bounds the whole race.

use super::spotify::{SpotifyClient, SpotifyTrackSearch};
use super::token_cache::SpotifyTokenCache;
use super::{ProviderError, TrackMetadata, TrackProvider};
use crate::server::metrics;
use futures::future::select_ok;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct ProviderChain {
    spotify: Option<(Arc<SpotifyTokenCache>, Arc<SpotifyClient>)>,
    providers: Vec<Arc<dyn TrackProvider>>,
    deadline: Duration,
}

impl ProviderChain {
    pub fn new(deadline: Duration) -> Self {
        Self {
            spotify: None,
            providers: Vec::new(),
            deadline,
        }
    }

    /// Adds Spotify, which only joins a lookup when a token can be obtained.
    pub fn with_spotify(
        mut self,
        token_cache: Arc<SpotifyTokenCache>,
        client: Arc<SpotifyClient>,
    ) -> Self {
        self.spotify = Some((token_cache, client));
        self
    }

    /// Adds a provider that needs no per-request credentials.
    pub fn with_provider(mut self, provider: Arc<dyn TrackProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Resolves per-request prerequisites (the Spotify token) once, so the
    /// returned chain can serve many lookups.
    pub async fn prepare(&self) -> PreparedChain {
        let mut providers: Vec<Arc<dyn TrackProvider>> =
            Vec::with_capacity(self.providers.len() + 1);

        if let Some((token_cache, client)) = &self.spotify {
            match token_cache.get_token().await {
                Some(token) => providers.push(Arc::new(SpotifyTrackSearch::new(
                    client.clone(),
                    token,
                ))),
                None => debug!("Spotify unavailable for this request"),
            }
        }
        providers.extend(self.providers.iter().cloned());

        PreparedChain::new(providers, self.deadline)
    }
}

/// A chain whose providers are ready to be queried.
pub struct PreparedChain {
    providers: Vec<Arc<dyn TrackProvider>>,
    deadline: Duration,
}

impl PreparedChain {
    pub fn new(providers: Vec<Arc<dyn TrackProvider>>, deadline: Duration) -> Self {
        Self {
            providers,
            deadline,
        }
    }

    /// Races every provider. Never fails: no match, all errors and the
    /// deadline all resolve to `None`.
    pub async fn find_track(&self, title: &str, artist: &str) -> Option<TrackMetadata> {
        if self.providers.is_empty() {
            return None;
        }

        let lookups = self.providers.iter().map(|provider| {
            Box::pin(async move {
                let source = provider.source();
                let result = provider.search(title, artist).await;
                match &result {
                    Ok(_) => metrics::record_provider_lookup(source.as_str(), "hit"),
                    Err(err) => {
                        metrics::record_provider_lookup(source.as_str(), err.kind());
                        match err {
                            ProviderError::NotFound => {
                                debug!(%source, title, artist, "No match")
                            }
                            _ => warn!(%source, title, artist, error = %err, "Provider lookup failed"),
                        }
                    }
                }
                result
            })
        });

        match tokio::time::timeout(self.deadline, select_ok(lookups)).await {
            Ok(Ok((metadata, _losers))) => Some(metadata),
            Ok(Err(_)) => None,
            Err(_) => {
                warn!(
                    title,
                    artist,
                    deadline_ms = self.deadline.as_millis() as u64,
                    "Provider chain deadline elapsed"
                );
                None
            }
        }
    }
}
