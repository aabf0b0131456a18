//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestClient, TestServer, TestSetup};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_moods() {
//!     let server = TestServer::spawn(TestSetup::default()).await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.get_moods().await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod client;
mod constants;
mod fake_upstream;
mod server;

// Public API - this is what tests import
pub use client::TestClient;
pub use constants::*;
#[allow(unused_imports)]
pub use fake_upstream::{FakeUpstream, UpstreamBehavior};
pub use server::{TestServer, TestSetup};
