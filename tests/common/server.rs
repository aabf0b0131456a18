//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server wired to its own fake upstream.

use super::constants::*;
use super::fake_upstream::{FakeUpstream, UpstreamBehavior};
use music_discovery_server::config::{
    AppConfig, CliConfig, FileConfig, ProvidersConfig, RecommendationsConfig,
};
use music_discovery_server::server::{make_app, RequestsLoggingLevel, ServerConfig, Services};
use std::time::Duration;
use tokio::net::TcpListener;

/// Which credentials and limits the server under test gets.
#[derive(Clone, Debug)]
pub struct TestSetup {
    pub upstream: UpstreamBehavior,
    pub anthropic: bool,
    pub spotify: bool,
    pub lastfm: bool,
    pub deezer_enabled: bool,
    pub count: usize,
    pub max_attempts: u32,
    pub generation_timeout_ms: u64,
    pub enrichment_deadline_ms: u64,
    pub chain_deadline_ms: u64,
    pub token_skew_secs: u64,
}

impl Default for TestSetup {
    fn default() -> Self {
        Self {
            upstream: UpstreamBehavior::default(),
            anthropic: true,
            spotify: false,
            lastfm: false,
            deezer_enabled: true,
            count: 5,
            max_attempts: 2,
            generation_timeout_ms: 3000,
            enrichment_deadline_ms: 2000,
            chain_deadline_ms: 1500,
            token_skew_secs: 60,
        }
    }
}

/// Test server instance with its own fake upstream
///
/// When dropped, both servers shut down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// The fake third-party APIs, exposed for hit counters
    pub upstream: FakeUpstream,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a fake upstream and a server pointed at it, on random ports
    ///
    /// # Panics
    ///
    /// Panics if config resolution fails, a port cannot be bound, or the
    /// server doesn't become ready within timeout
    pub async fn spawn(setup: TestSetup) -> Self {
        let upstream = FakeUpstream::spawn(setup.upstream.clone()).await;

        let cli = CliConfig {
            logging_level: RequestsLoggingLevel::None,
            content_cache_age_sec: TEST_CACHE_AGE_SEC,
            anthropic_api_key: setup.anthropic.then(|| TEST_ANTHROPIC_KEY.to_string()),
            spotify_client_id: setup.spotify.then(|| TEST_SPOTIFY_CLIENT_ID.to_string()),
            spotify_client_secret: setup
                .spotify
                .then(|| TEST_SPOTIFY_CLIENT_SECRET.to_string()),
            lastfm_api_key: setup.lastfm.then(|| TEST_LASTFM_KEY.to_string()),
            ..Default::default()
        };

        let file_config = FileConfig {
            recommendations: Some(RecommendationsConfig {
                api_base_url: Some(upstream.base_url.clone()),
                count: Some(setup.count),
                max_attempts: Some(setup.max_attempts),
                initial_delay_ms: Some(10),
                generation_timeout_ms: Some(setup.generation_timeout_ms),
                enrichment_deadline_ms: Some(setup.enrichment_deadline_ms),
                ..Default::default()
            }),
            providers: Some(ProvidersConfig {
                spotify_token_url: Some(format!("{}/api/token", upstream.base_url)),
                spotify_api_base: Some(format!("{}/v1", upstream.base_url)),
                deezer_api_base: Some(format!("{}/deezer", upstream.base_url)),
                lastfm_api_base: Some(format!("{}/lastfm/2.0/", upstream.base_url)),
                deezer_enabled: Some(setup.deezer_enabled),
                chain_deadline_ms: Some(setup.chain_deadline_ms),
                token_skew_secs: Some(setup.token_skew_secs),
                ..Default::default()
            }),
            ..Default::default()
        };

        let config =
            AppConfig::resolve(&cli, Some(file_config)).expect("Failed to resolve test config");
        let services = Services::from_config(&config).expect("Failed to build services");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let server_config = ServerConfig {
            port,
            ..ServerConfig::from(&config)
        };
        let app = make_app(server_config, services);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            upstream,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the root endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
