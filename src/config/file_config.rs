use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,
    pub content_cache_age_sec: Option<usize>,
    pub frontend_dir_path: Option<String>,
    pub dev_mode: Option<bool>,

    // Feature configs
    pub recommendations: Option<RecommendationsConfig>,
    pub providers: Option<ProvidersConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct RecommendationsConfig {
    pub api_base_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub count: Option<usize>,
    pub max_attempts: Option<u32>,
    pub initial_delay_ms: Option<u64>,
    pub generation_timeout_ms: Option<u64>,
    pub enrichment_deadline_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ProvidersConfig {
    pub spotify_token_url: Option<String>,
    pub spotify_api_base: Option<String>,
    pub deezer_api_base: Option<String>,
    pub lastfm_api_base: Option<String>,
    pub deezer_enabled: Option<bool>,
    pub spotify_timeout_ms: Option<u64>,
    pub deezer_timeout_ms: Option<u64>,
    pub lastfm_timeout_ms: Option<u64>,
    pub chain_deadline_ms: Option<u64>,
    pub token_skew_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
