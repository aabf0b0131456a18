use super::RequestsLoggingLevel;
use crate::config::AppConfig;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub metrics_port: u16,
    pub content_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    /// If true, error responses include the full error chain.
    pub dev_mode: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            metrics_port: 9091,
            content_cache_age_sec: 3600,
            frontend_dir_path: None,
            dev_mode: false,
        }
    }
}

impl From<&AppConfig> for ServerConfig {
    fn from(config: &AppConfig) -> Self {
        ServerConfig {
            requests_logging_level: config.logging_level.clone(),
            port: config.port,
            metrics_port: config.metrics_port,
            content_cache_age_sec: config.content_cache_age_sec,
            frontend_dir_path: config.frontend_dir_path.clone(),
            dev_mode: config.dev_mode,
        }
    }
}
