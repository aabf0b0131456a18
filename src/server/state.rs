use axum::extract::FromRef;

use crate::recommendations::RecommendationService;
use crate::trending::TrendingService;
use std::sync::Arc;
use std::time::Instant;

use super::services::Services;
use super::ServerConfig;

pub type GuardedRecommendationService = Arc<RecommendationService>;
pub type GuardedTrendingService = Arc<TrendingService>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub hash: String,
    pub recommendations: GuardedRecommendationService,
    pub trending: GuardedTrendingService,
}

impl ServerState {
    pub fn new(config: ServerConfig, services: Services) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            hash: env!("GIT_HASH").to_owned(),
            recommendations: services.recommendations,
            trending: services.trending,
        }
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedRecommendationService {
    fn from_ref(input: &ServerState) -> Self {
        input.recommendations.clone()
    }
}

impl FromRef<ServerState> for GuardedTrendingService {
    fn from_ref(input: &ServerState) -> Self {
        input.trending.clone()
    }
}
