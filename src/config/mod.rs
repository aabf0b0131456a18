mod file_config;

pub use file_config::{FileConfig, ProvidersConfig, RecommendationsConfig};

use crate::providers::SpotifyCredentials;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::time::Duration;
use tracing::warn;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
/// Credentials are only ever read from the command line/environment.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    pub dev_mode: bool,

    pub anthropic_api_key: Option<String>,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub lastfm_api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    pub dev_mode: bool,

    pub credentials: Credentials,

    // Feature configs (with defaults)
    pub recommendations: RecommendationSettings,
    pub providers: ProviderSettings,
}

/// Upstream credentials. A missing entry disables the matching capability.
#[derive(Clone, Default)]
pub struct Credentials {
    pub anthropic_api_key: Option<String>,
    pub spotify: Option<SpotifyCredentials>,
    pub lastfm_api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn presence(value: bool) -> &'static str {
            if value {
                "<set>"
            } else {
                "<unset>"
            }
        }
        f.debug_struct("Credentials")
            .field("anthropic_api_key", &presence(self.anthropic_api_key.is_some()))
            .field("spotify", &self.spotify)
            .field("lastfm_api_key", &presence(self.lastfm_api_key.is_some()))
            .finish()
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let content_cache_age_sec = file
            .content_cache_age_sec
            .unwrap_or(cli.content_cache_age_sec);
        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());
        let dev_mode = file.dev_mode.unwrap_or(cli.dev_mode);

        let credentials = resolve_credentials(cli);

        let rec_file = file.recommendations.unwrap_or_default();
        let rec_defaults = RecommendationSettings::default();
        let recommendations = RecommendationSettings {
            api_base_url: rec_file.api_base_url.unwrap_or(rec_defaults.api_base_url),
            model: rec_file.model.unwrap_or(rec_defaults.model),
            max_tokens: rec_file.max_tokens.unwrap_or(rec_defaults.max_tokens),
            temperature: rec_file.temperature.unwrap_or(rec_defaults.temperature),
            count: rec_file.count.unwrap_or(rec_defaults.count),
            max_attempts: rec_file.max_attempts.unwrap_or(rec_defaults.max_attempts),
            initial_delay_ms: rec_file
                .initial_delay_ms
                .unwrap_or(rec_defaults.initial_delay_ms),
            generation_timeout_ms: rec_file
                .generation_timeout_ms
                .unwrap_or(rec_defaults.generation_timeout_ms),
            enrichment_deadline_ms: rec_file
                .enrichment_deadline_ms
                .unwrap_or(rec_defaults.enrichment_deadline_ms),
        };

        let prov_file = file.providers.unwrap_or_default();
        let prov_defaults = ProviderSettings::default();
        let providers = ProviderSettings {
            spotify_token_url: prov_file
                .spotify_token_url
                .unwrap_or(prov_defaults.spotify_token_url),
            spotify_api_base: prov_file
                .spotify_api_base
                .unwrap_or(prov_defaults.spotify_api_base),
            deezer_api_base: prov_file
                .deezer_api_base
                .unwrap_or(prov_defaults.deezer_api_base),
            lastfm_api_base: prov_file
                .lastfm_api_base
                .unwrap_or(prov_defaults.lastfm_api_base),
            deezer_enabled: prov_file
                .deezer_enabled
                .unwrap_or(prov_defaults.deezer_enabled),
            spotify_timeout_ms: prov_file
                .spotify_timeout_ms
                .unwrap_or(prov_defaults.spotify_timeout_ms),
            deezer_timeout_ms: prov_file
                .deezer_timeout_ms
                .unwrap_or(prov_defaults.deezer_timeout_ms),
            lastfm_timeout_ms: prov_file
                .lastfm_timeout_ms
                .unwrap_or(prov_defaults.lastfm_timeout_ms),
            chain_deadline_ms: prov_file
                .chain_deadline_ms
                .unwrap_or(prov_defaults.chain_deadline_ms),
            token_skew_secs: prov_file
                .token_skew_secs
                .unwrap_or(prov_defaults.token_skew_secs),
        };

        recommendations.validate()?;
        providers.validate()?;

        Ok(Self {
            port,
            metrics_port,
            logging_level,
            content_cache_age_sec,
            frontend_dir_path,
            dev_mode,
            credentials,
            recommendations,
            providers,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn resolve_credentials(cli: &CliConfig) -> Credentials {
    let anthropic_api_key = non_blank(&cli.anthropic_api_key);
    if anthropic_api_key.is_none() {
        warn!("ANTHROPIC_API_KEY not set, recommendations are disabled");
    }

    let spotify = match (
        non_blank(&cli.spotify_client_id),
        non_blank(&cli.spotify_client_secret),
    ) {
        (Some(client_id), Some(client_secret)) => Some(SpotifyCredentials {
            client_id,
            client_secret,
        }),
        (None, None) => {
            warn!("Spotify credentials not set, Spotify lookups and trending are disabled");
            None
        }
        _ => {
            warn!("Only one of SPOTIFY_CLIENT_ID/SPOTIFY_CLIENT_SECRET is set, Spotify is disabled");
            None
        }
    };

    let lastfm_api_key = non_blank(&cli.lastfm_api_key);
    if lastfm_api_key.is_none() {
        warn!("LASTFM_API_KEY not set, Last.fm lookups are disabled");
    }

    Credentials {
        anthropic_api_key,
        spotify,
        lastfm_api_key,
    }
}

#[derive(Debug, Clone)]
pub struct RecommendationSettings {
    pub api_base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Number of songs asked of the model, and upper bound of the response.
    pub count: usize,
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    /// Bounds the whole generation step, retries included.
    pub generation_timeout_ms: u64,
    pub enrichment_deadline_ms: u64,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-opus-20240229".to_string(),
            max_tokens: 650,
            temperature: 0.7,
            count: 5,
            max_attempts: 3,
            initial_delay_ms: 1000,
            generation_timeout_ms: 15_000,
            enrichment_deadline_ms: 5_000,
        }
    }
}

impl RecommendationSettings {
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_millis(self.generation_timeout_ms)
    }

    pub fn enrichment_deadline(&self) -> Duration {
        Duration::from_millis(self.enrichment_deadline_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.count == 0 {
            bail!("recommendations.count must be greater than zero");
        }
        if self.max_attempts == 0 {
            bail!("recommendations.max_attempts must be greater than zero");
        }
        if self.generation_timeout_ms == 0 || self.enrichment_deadline_ms == 0 {
            bail!("recommendation timeouts must be greater than zero");
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            bail!(
                "recommendations.temperature must be within 0.0..=1.0, got {}",
                self.temperature
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub spotify_token_url: String,
    pub spotify_api_base: String,
    pub deezer_api_base: String,
    pub lastfm_api_base: String,
    pub deezer_enabled: bool,
    pub spotify_timeout_ms: u64,
    pub deezer_timeout_ms: u64,
    pub lastfm_timeout_ms: u64,
    pub chain_deadline_ms: u64,
    /// Subtracted from every advertised token lifetime.
    pub token_skew_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            spotify_token_url: "https://accounts.spotify.com/api/token".to_string(),
            spotify_api_base: "https://api.spotify.com/v1".to_string(),
            deezer_api_base: "https://api.deezer.com".to_string(),
            lastfm_api_base: "https://ws.audioscrobbler.com/2.0/".to_string(),
            deezer_enabled: true,
            spotify_timeout_ms: 3_000,
            deezer_timeout_ms: 3_000,
            lastfm_timeout_ms: 3_000,
            chain_deadline_ms: 5_000,
            token_skew_secs: 60,
        }
    }
}

impl ProviderSettings {
    pub fn spotify_timeout(&self) -> Duration {
        Duration::from_millis(self.spotify_timeout_ms)
    }

    pub fn deezer_timeout(&self) -> Duration {
        Duration::from_millis(self.deezer_timeout_ms)
    }

    pub fn lastfm_timeout(&self) -> Duration {
        Duration::from_millis(self.lastfm_timeout_ms)
    }

    pub fn chain_deadline(&self) -> Duration {
        Duration::from_millis(self.chain_deadline_ms)
    }

    pub fn token_skew(&self) -> Duration {
        Duration::from_secs(self.token_skew_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.spotify_timeout_ms == 0
            || self.deezer_timeout_ms == 0
            || self.lastfm_timeout_ms == 0
            || self.chain_deadline_ms == 0
        {
            bail!("provider timeouts must be greater than zero");
        }
        Ok(())
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_defaults() -> CliConfig {
        CliConfig {
            port: 3001,
            metrics_port: 9091,
            logging_level: RequestsLoggingLevel::Path,
            content_cache_age_sec: 3600,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_logging_level() {
        assert!(matches!(
            parse_logging_level("none"),
            Some(RequestsLoggingLevel::None)
        ));
        assert!(matches!(
            parse_logging_level("headers"),
            Some(RequestsLoggingLevel::Headers)
        ));
        // Case insensitive
        assert!(matches!(
            parse_logging_level("PATH"),
            Some(RequestsLoggingLevel::Path)
        ));
        assert!(parse_logging_level("invalid").is_none());
    }

    #[test]
    fn test_resolve_cli_only() {
        let cli = CliConfig {
            frontend_dir_path: Some("/frontend".to_string()),
            dev_mode: true,
            anthropic_api_key: Some("sk-test".to_string()),
            ..cli_with_defaults()
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.port, 3001);
        assert_eq!(config.metrics_port, 9091);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Path);
        assert_eq!(config.content_cache_age_sec, 3600);
        assert_eq!(config.frontend_dir_path, Some("/frontend".to_string()));
        assert!(config.dev_mode);
        assert_eq!(
            config.credentials.anthropic_api_key.as_deref(),
            Some("sk-test")
        );
        assert_eq!(config.recommendations.model, "claude-3-opus-20240229");
        assert_eq!(config.recommendations.max_tokens, 650);
        assert_eq!(config.recommendations.count, 5);
        assert_eq!(config.recommendations.max_attempts, 3);
        assert_eq!(config.providers.chain_deadline(), Duration::from_secs(5));
        assert_eq!(config.providers.token_skew(), Duration::from_secs(60));
        assert!(config.providers.deezer_enabled);
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let cli = cli_with_defaults();
        let file_config = FileConfig {
            port: Some(4000),
            logging_level: Some("body".to_string()),
            dev_mode: Some(true),
            recommendations: Some(RecommendationsConfig {
                max_attempts: Some(5),
                initial_delay_ms: Some(10),
                ..Default::default()
            }),
            providers: Some(ProvidersConfig {
                deezer_api_base: Some("http://127.0.0.1:9000".to_string()),
                deezer_enabled: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        // TOML values should override CLI
        assert_eq!(config.port, 4000);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Body);
        assert!(config.dev_mode);
        assert_eq!(config.recommendations.max_attempts, 5);
        assert_eq!(config.recommendations.initial_delay_ms, 10);
        assert_eq!(config.providers.deezer_api_base, "http://127.0.0.1:9000");
        assert!(!config.providers.deezer_enabled);
        // CLI value used when TOML doesn't specify
        assert_eq!(config.metrics_port, 9091);
        assert_eq!(config.content_cache_age_sec, 3600);
        // Defaults used when neither specifies
        assert_eq!(config.recommendations.generation_timeout_ms, 15_000);
        assert_eq!(config.providers.spotify_timeout_ms, 3_000);
    }

    #[test]
    fn test_resolve_missing_credentials_is_degraded_not_fatal() {
        let config = AppConfig::resolve(&cli_with_defaults(), None).unwrap();
        assert!(config.credentials.anthropic_api_key.is_none());
        assert!(config.credentials.spotify.is_none());
        assert!(config.credentials.lastfm_api_key.is_none());
    }

    #[test]
    fn test_resolve_blank_credentials_are_ignored() {
        let cli = CliConfig {
            anthropic_api_key: Some("   ".to_string()),
            lastfm_api_key: Some(String::new()),
            ..cli_with_defaults()
        };
        let config = AppConfig::resolve(&cli, None).unwrap();
        assert!(config.credentials.anthropic_api_key.is_none());
        assert!(config.credentials.lastfm_api_key.is_none());
    }

    #[test]
    fn test_resolve_spotify_requires_both_halves() {
        let cli = CliConfig {
            spotify_client_id: Some("id".to_string()),
            ..cli_with_defaults()
        };
        let config = AppConfig::resolve(&cli, None).unwrap();
        assert!(config.credentials.spotify.is_none());

        let cli = CliConfig {
            spotify_client_id: Some("id".to_string()),
            spotify_client_secret: Some("secret".to_string()),
            ..cli_with_defaults()
        };
        let config = AppConfig::resolve(&cli, None).unwrap();
        let spotify = config.credentials.spotify.unwrap();
        assert_eq!(spotify.client_id, "id");
        assert_eq!(spotify.client_secret, "secret");
    }

    #[test]
    fn test_resolve_zero_attempts_error() {
        let file_config = FileConfig {
            recommendations: Some(RecommendationsConfig {
                max_attempts: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli_with_defaults(), Some(file_config));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("max_attempts"));
    }

    #[test]
    fn test_resolve_zero_timeout_error() {
        let file_config = FileConfig {
            providers: Some(ProvidersConfig {
                chain_deadline_ms: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli_with_defaults(), Some(file_config));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeouts"));
    }

    #[test]
    fn test_credentials_debug_hides_values() {
        let credentials = Credentials {
            anthropic_api_key: Some("sk-secret".to_string()),
            spotify: None,
            lastfm_api_key: None,
        };
        let printed = format!("{:?}", credentials);
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("<set>"));
        assert!(printed.contains("<unset>"));
    }
}
