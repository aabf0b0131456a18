use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use music_discovery_server::config::{AppConfig, CliConfig, FileConfig};
use music_discovery_server::server::{run_server, RequestsLoggingLevel, ServerConfig};
use music_discovery_server::Services;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
#[command(version, about = "Music discovery API server")]
struct CliArgs {
    /// Path to an optional TOML config file. Its values override the flags below.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Shared cache lifetime for successful API responses, in seconds.
    #[clap(long, default_value_t = 3600)]
    pub content_cache_age_sec: usize,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Include error details in API error bodies.
    #[clap(long, env = "DEV_MODE")]
    pub dev_mode: bool,

    #[clap(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub anthropic_api_key: Option<String>,

    #[clap(long, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
    pub spotify_client_id: Option<String>,

    #[clap(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub spotify_client_secret: Option<String>,

    #[clap(long, env = "LASTFM_API_KEY", hide_env_values = true)]
    pub lastfm_api_key: Option<String>,
}

impl From<CliArgs> for CliConfig {
    fn from(args: CliArgs) -> Self {
        CliConfig {
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level,
            content_cache_age_sec: args.content_cache_age_sec,
            frontend_dir_path: args.frontend_dir_path,
            dev_mode: args.dev_mode,
            anthropic_api_key: args.anthropic_api_key,
            spotify_client_id: args.spotify_client_id,
            spotify_client_secret: args.spotify_client_secret,
            lastfm_api_key: args.lastfm_api_key,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match cli_args.config.take() {
        Some(path) => {
            info!("Loading config file {:?}...", path);
            Some(FileConfig::load(&path)?)
        }
        None => None,
    };

    let config = AppConfig::resolve(&CliConfig::from(cli_args), file_config)?;
    info!("Resolved credentials: {:?}", config.credentials);

    let services = Services::from_config(&config)?;
    if !services.recommendations.is_enabled() {
        info!("Recommendations endpoint will answer with CONFIG_ERROR");
    }

    run_server(ServerConfig::from(&config), services).await
}
