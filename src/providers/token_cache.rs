//! Client-credentials token cache for the Spotify Web API.

use super::ProviderError;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct TokenCacheEntry {
    token: String,
    expires_at_epoch_ms: i64,
}

impl TokenCacheEntry {
    fn is_valid_at(&self, now_epoch_ms: i64) -> bool {
        now_epoch_ms < self.expires_at_epoch_ms
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Process-wide cache for one bearer token.
///
/// Two requests racing past an expired entry both refresh; the last write wins.
/// Tokens are interchangeable while valid so the duplicate fetch is harmless,
/// and the lock keeps the entry itself consistent.
pub struct SpotifyTokenCache {
    client: Client,
    token_url: String,
    credentials: Option<SpotifyCredentials>,
    skew: Duration,
    timeout: Duration,
    entry: RwLock<Option<TokenCacheEntry>>,
}

impl SpotifyTokenCache {
    /// # Arguments
    /// * `token_url` - Accounts endpoint (e.g., "https://accounts.spotify.com/api/token").
    /// * `credentials` - Client id/secret pair; `None` disables the provider.
    /// * `skew` - Subtracted from the advertised TTL before caching.
    /// * `timeout` - Timeout of the token exchange request.
    pub fn new(
        client: Client,
        token_url: impl Into<String>,
        credentials: Option<SpotifyCredentials>,
        skew: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            credentials,
            skew,
            timeout,
            entry: RwLock::new(None),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Returns a valid token, or `None` when the provider is unusable right now.
    pub async fn get_token(&self) -> Option<String> {
        match self.try_get_token().await {
            Ok(token) => Some(token),
            Err(ProviderError::Unavailable) => {
                debug!("Spotify credentials not configured, skipping token fetch");
                None
            }
            Err(err) => {
                warn!(error = %err, "Failed to obtain Spotify access token");
                None
            }
        }
    }

    /// Like [`get_token`](Self::get_token) but keeps the failure kind.
    pub async fn try_get_token(&self) -> Result<String, ProviderError> {
        let credentials = self.credentials.as_ref().ok_or(ProviderError::Unavailable)?;

        {
            let guard = self.entry.read().await;
            if let Some(entry) = guard.as_ref() {
                if entry.is_valid_at(now_epoch_ms()) {
                    return Ok(entry.token.clone());
                }
            }
        }

        let entry = self.fetch_token(credentials).await?;
        let token = entry.token.clone();
        *self.entry.write().await = Some(entry);
        Ok(token)
    }

    async fn fetch_token(
        &self,
        credentials: &SpotifyCredentials,
    ) -> Result<TokenCacheEntry, ProviderError> {
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Auth(format!("status {}: {}", status, body)));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        let ttl_secs = body.expires_in.saturating_sub(self.skew.as_secs());
        let expires_at_epoch_ms = now_epoch_ms() + (ttl_secs as i64) * 1000;

        info!(ttl_secs, "Obtained new Spotify access token");

        Ok(TokenCacheEntry {
            token: body.access_token,
            expires_at_epoch_ms,
        })
    }
}

fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
