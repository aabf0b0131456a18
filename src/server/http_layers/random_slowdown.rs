//! Random slowdown middleware, for exercising client-side loading states and
//! the upstream deadlines by hand.

use axum::body::Body;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::IntoResponse;
use rand_distr::{Distribution, Normal};
use std::time::Duration;

const MEAN_DELAY_MS: f64 = 1000.0;
const DELAY_STD_DEV_MS: f64 = 2000.0;

/// Delays the request by a gaussian amount of time, clamped at zero.
pub async fn slowdown_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    tokio::time::sleep(sample_delay()).await;
    next.run(request).await
}

fn sample_delay() -> Duration {
    let millis = match Normal::new(MEAN_DELAY_MS, DELAY_STD_DEV_MS) {
        Ok(normal) => normal.sample(&mut rand::rng()).max(0.0),
        Err(_) => MEAN_DELAY_MS,
    };
    Duration::from_millis(millis as u64)
}
