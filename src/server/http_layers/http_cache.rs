//! Shared-cache headers for successful responses

use axum::{
    body::Body,
    extract::State,
    http::{header::CACHE_CONTROL, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

const STALE_WHILE_REVALIDATE_SEC: usize = 600;

pub fn cache_control_value(max_age_sec: usize) -> String {
    format!(
        "public, s-maxage={}, stale-while-revalidate={}",
        max_age_sec, STALE_WHILE_REVALIDATE_SEC
    )
}

/// Marks 2xx responses as cacheable by shared caches for `max_age_sec`.
/// Responses that already carry a Cache-Control header are left alone.
pub async fn http_cache(
    State(max_age_sec): State<usize>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(request).await.into_response();

    if response.status().is_success() && !response.headers().contains_key(CACHE_CONTROL) {
        if let Ok(value) = HeaderValue::from_str(&cache_control_value(max_age_sec)) {
            response.headers_mut().insert(CACHE_CONTROL, value);
        }
    }
    response
}
