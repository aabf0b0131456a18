use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all music discovery metrics
const PREFIX: &str = "music_discovery";

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Upstream Metrics
    pub static ref PROVIDER_LOOKUPS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_provider_lookups_total"), "Catalog lookups by provider and outcome"),
        &["provider", "outcome"]
    ).expect("Failed to create provider_lookups_total metric");

    pub static ref LLM_ATTEMPTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_llm_attempts_total"), "Generative model calls by outcome"),
        &["outcome"]
    ).expect("Failed to create llm_attempts_total metric");

    pub static ref LLM_TOKENS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_llm_tokens_total"), "Tokens consumed by the generative model"),
        &["kind"]
    ).expect("Failed to create llm_tokens_total metric");

    pub static ref ENRICHED_RECOMMENDATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            format!("{PREFIX}_enriched_recommendations_total"),
            "Recommendations returned, by metadata source"
        ),
        &["source"]
    ).expect("Failed to create enriched_recommendations_total metric");

    // Error Metrics
    pub static ref ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_errors_total"), "Total errors by type and endpoint"),
        &["error_type", "endpoint"]
    ).expect("Failed to create errors_total metric");

    pub static ref PROCESS_MEMORY_BYTES: Gauge = Gauge::new(
        format!("{PREFIX}_process_memory_bytes"),
        "Process memory usage in bytes"
    ).expect("Failed to create process_memory_bytes metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Register all metrics - ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(PROVIDER_LOOKUPS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(LLM_ATTEMPTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(LLM_TOKENS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(ENRICHED_RECOMMENDATIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(ERRORS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(PROCESS_MEMORY_BYTES.clone()));

    tracing::info!("Metrics system initialized successfully");
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

/// `outcome` is "hit" or a provider error kind.
pub fn record_provider_lookup(provider: &str, outcome: &str) {
    PROVIDER_LOOKUPS_TOTAL
        .with_label_values(&[provider, outcome])
        .inc();
}

pub fn record_llm_attempt(outcome: &str) {
    LLM_ATTEMPTS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_llm_tokens(input: u32, output: u32) {
    LLM_TOKENS_TOTAL
        .with_label_values(&["input"])
        .inc_by(f64::from(input));
    LLM_TOKENS_TOTAL
        .with_label_values(&["output"])
        .inc_by(f64::from(output));
}

pub fn record_enrichment(source: &str) {
    ENRICHED_RECOMMENDATIONS_TOTAL
        .with_label_values(&[source])
        .inc();
}

pub fn record_error(error_type: &str, endpoint: &str) {
    ERRORS_TOTAL
        .with_label_values(&[error_type, endpoint])
        .inc();
}

/// Maps a request path to a bounded label set.
pub fn categorize_endpoint(path: &str) -> &'static str {
    match path {
        "/" => "home",
        "/api/recommendations" => "recommendations",
        "/api/music" => "trending",
        "/api/moods" | "/api/genres" => "tables",
        _ => "other",
    }
}

/// Update process memory usage
pub fn update_memory_usage() {
    #[cfg(target_os = "linux")]
    {
        if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
            for line in status.lines() {
                if line.starts_with("VmRSS:") {
                    // RSS is reported in kB
                    if let Some(kb_str) = line.split_whitespace().nth(1) {
                        if let Ok(kb) = kb_str.parse::<f64>() {
                            PROCESS_MEMORY_BYTES.set(kb * 1024.0);
                            return;
                        }
                    }
                }
            }
        }
    }
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    update_memory_usage();

    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
