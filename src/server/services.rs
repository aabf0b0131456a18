//! Wires upstream clients and pipeline services from the resolved config.

use crate::config::AppConfig;
use crate::llm::{AnthropicProvider, CompletionOptions, LlmProvider};
use crate::providers::{
    DeezerProvider, LastFmProvider, ProviderChain, SpotifyClient, SpotifyTokenCache,
};
use crate::recommendations::{RecommendationGenerator, RecommendationService, RetryPolicy};
use crate::trending::TrendingService;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

const USER_AGENT: &str = concat!("music-discovery-server/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct Services {
    pub recommendations: Arc<RecommendationService>,
    pub trending: Arc<TrendingService>,
}

impl Services {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        let providers = &config.providers;
        let token_cache = Arc::new(SpotifyTokenCache::new(
            client.clone(),
            providers.spotify_token_url.clone(),
            config.credentials.spotify.clone(),
            providers.token_skew(),
            providers.spotify_timeout(),
        ));
        let spotify = Arc::new(SpotifyClient::new(
            client.clone(),
            providers.spotify_api_base.clone(),
            providers.spotify_timeout(),
        ));

        let mut chain = ProviderChain::new(providers.chain_deadline());
        if token_cache.is_configured() {
            chain = chain.with_spotify(token_cache.clone(), spotify.clone());
        }
        if providers.deezer_enabled {
            chain = chain.with_provider(Arc::new(DeezerProvider::new(
                client.clone(),
                providers.deezer_api_base.clone(),
                providers.deezer_timeout(),
            )));
        }
        if let Some(api_key) = &config.credentials.lastfm_api_key {
            chain = chain.with_provider(Arc::new(LastFmProvider::new(
                client.clone(),
                providers.lastfm_api_base.clone(),
                api_key.clone(),
                providers.lastfm_timeout(),
            )));
        }

        let settings = &config.recommendations;
        let generator = config.credentials.anthropic_api_key.as_ref().map(|api_key| {
            let provider: Arc<dyn LlmProvider> = Arc::new(AnthropicProvider::new(
                client.clone(),
                settings.api_base_url.clone(),
                settings.model.clone(),
                api_key.clone(),
            ));
            info!(
                provider = provider.name(),
                model = provider.model(),
                "Recommendation generator configured"
            );
            RecommendationGenerator::new(
                provider,
                CompletionOptions {
                    temperature: settings.temperature,
                    max_tokens: settings.max_tokens,
                    timeout: settings.generation_timeout(),
                },
                RetryPolicy::new(settings),
                settings.generation_timeout(),
            )
        });

        let recommendations = Arc::new(RecommendationService::new(
            generator,
            Arc::new(chain),
            settings.count,
            settings.enrichment_deadline(),
        ));
        let trending = Arc::new(TrendingService::new(token_cache, spotify));

        Ok(Self {
            recommendations,
            trending,
        })
    }
}
