//! LLM provider trait definition.

use super::types::{CompletionResponse, Message};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Options for a completion request.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative).
    pub temperature: f32,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Per-attempt request timeout.
    pub timeout: Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 650,
            timeout: Duration::from_secs(15),
        }
    }
}

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Service overloaded")]
    Overloaded,

    #[error("Request timeout")]
    Timeout,
}

impl LlmError {
    /// HTTP status 429 and 529 are transient and worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::RateLimited | LlmError::Overloaded)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Connection(_) => "connection",
            LlmError::Api { .. } => "api",
            LlmError::InvalidResponse(_) => "invalid_response",
            LlmError::RateLimited => "rate_limited",
            LlmError::Overloaded => "overloaded",
            LlmError::Timeout => "timeout",
        }
    }

    /// Maps a non-success upstream status to the matching error.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            429 => LlmError::RateLimited,
            529 => LlmError::Overloaded,
            _ => LlmError::Api {
                status,
                message: body,
            },
        }
    }
}

/// Trait for LLM providers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider's name (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Get the model being used.
    fn model(&self) -> &str;

    /// Complete a conversation.
    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError>;
}
