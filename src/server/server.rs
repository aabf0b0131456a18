use anyhow::{Context, Result};
use std::future::IntoFuture;
use std::time::Duration;

use tower_http::services::ServeDir;
use tracing::info;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use super::error::ApiError;
use super::metrics::{self, metrics_handler};
use super::services::Services;
use super::{http_cache, log_requests, state::*, ServerConfig};
#[cfg(feature = "slowdown")]
use super::slowdown_request;
use crate::moods::{self, GenreCategory, MoodProfile, GENRE_CATEGORIES, MOODS};
use crate::recommendations::SearchCriteria;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenresResponse {
    genres: Vec<&'static str>,
    detailed_genres: Vec<&'static str>,
    categories: &'static [GenreCategory],
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

async fn get_moods() -> Json<&'static [MoodProfile]> {
    Json(MOODS.as_slice())
}

async fn get_genres() -> Json<GenresResponse> {
    Json(GenresResponse {
        genres: moods::genres(),
        detailed_genres: moods::detailed_genres(),
        categories: GENRE_CATEGORIES.as_slice(),
    })
}

async fn post_recommendations(
    State(state): State<ServerState>,
    payload: Result<Json<SearchCriteria>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(criteria) =
        payload.map_err(|rejection| ApiError::invalid_request(rejection.body_text()))?;

    let result = state.recommendations.recommend(&criteria).await.map_err(|err| {
        metrics::record_error(err.code(), "recommendations");
        ApiError::from_recommendation(err, state.config.dev_mode)
    })?;

    let degraded = result.error.is_some();
    let mut response = Json(result).into_response();
    if degraded {
        // Advisory answers must not be served from shared caches.
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }
    Ok(response)
}

async fn get_music(State(state): State<ServerState>) -> Result<Response, ApiError> {
    match state.trending.fetch().await {
        Ok(trending) => Ok(Json(trending).into_response()),
        Err(err) => {
            metrics::record_error(err.code(), "trending");
            Err(ApiError::from_trending(err, state.config.dev_mode))
        }
    }
}

pub fn make_app(config: ServerConfig, services: Services) -> Router {
    let state = ServerState::new(config.clone(), services);

    let cached_routes: Router = Router::new()
        .route("/recommendations", post(post_recommendations))
        .route("/music", get(get_music))
        .layer(middleware::from_fn_with_state(
            config.content_cache_age_sec,
            http_cache,
        ))
        .with_state(state.clone());

    let table_routes: Router = Router::new()
        .route("/moods", get(get_moods))
        .route("/genres", get(get_genres));

    let api_routes = cached_routes.merge(table_routes);

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let mut app: Router = home_router.nest("/api", api_routes);

    #[cfg(feature = "slowdown")]
    {
        app = app.layer(middleware::from_fn(slowdown_request));
    }
    app = app.layer(middleware::from_fn_with_state(state, log_requests));

    app
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

pub async fn run_server(config: ServerConfig, services: Services) -> Result<()> {
    metrics::init_metrics();

    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, services);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    let metrics_listener = tokio::net::TcpListener::bind(("0.0.0.0", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;

    info!("Ready to serve at port {}!", port);
    info!("Metrics available at port {}!", metrics_port);

    tokio::select! {
        result = axum::serve(listener, app).into_future() => {
            result.context("HTTP server failed")
        }
        result = axum::serve(metrics_listener, make_metrics_app()).into_future() => {
            result.context("Metrics server failed")
        }
    }
}
