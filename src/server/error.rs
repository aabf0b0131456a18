//! JSON error responses.

use crate::recommendations::RecommendationError;
use crate::trending::TrendingError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

/// An error as seen by API clients: `{error, code, details?}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    /// Only filled in dev mode.
    pub details: Option<String>,
    pub no_store: bool,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
            no_store: false,
        }
    }

    pub fn with_details(mut self, dev_mode: bool, details: impl std::fmt::Debug) -> Self {
        if dev_mode {
            self.details = Some(format!("{:?}", details));
        }
        self
    }

    pub fn no_store(mut self) -> Self {
        self.no_store = true;
        self
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
    }

    pub fn from_recommendation(err: RecommendationError, dev_mode: bool) -> Self {
        let status = match &err {
            RecommendationError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RecommendationError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RecommendationError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RecommendationError::Generation(_) | RecommendationError::Parse(_) => {
                StatusCode::BAD_GATEWAY
            }
        };
        Self::new(status, err.code(), err.to_string()).with_details(dev_mode, &err)
    }

    pub fn from_trending(err: TrendingError, dev_mode: bool) -> Self {
        let status = match &err {
            TrendingError::Network(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.code(), err.to_string())
            .with_details(dev_mode, &err)
            .no_store()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            code: self.code,
            details: self.details.as_deref(),
        };
        let mut response = (self.status, Json(body)).into_response();
        if self.no_store {
            response
                .headers_mut()
                .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        }
        response
    }
}
