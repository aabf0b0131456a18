//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all music-discovery endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::Value;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    pub async fn get_home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("GET / failed")
    }

    /// POST /api/recommendations with an arbitrary JSON body
    pub async fn recommend(&self, criteria: Value) -> Response {
        self.client
            .post(format!("{}/api/recommendations", self.base_url))
            .json(&criteria)
            .send()
            .await
            .expect("POST /api/recommendations failed")
    }

    /// POST /api/recommendations with a raw, possibly malformed body
    pub async fn recommend_raw(&self, body: &'static str) -> Response {
        self.client
            .post(format!("{}/api/recommendations", self.base_url))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("POST /api/recommendations failed")
    }

    pub async fn get_music(&self) -> Response {
        self.client
            .get(format!("{}/api/music", self.base_url))
            .send()
            .await
            .expect("GET /api/music failed")
    }

    pub async fn get_moods(&self) -> Response {
        self.client
            .get(format!("{}/api/moods", self.base_url))
            .send()
            .await
            .expect("GET /api/moods failed")
    }

    pub async fn get_genres(&self) -> Response {
        self.client
            .get(format!("{}/api/genres", self.base_url))
            .send()
            .await
            .expect("GET /api/genres failed")
    }
}
