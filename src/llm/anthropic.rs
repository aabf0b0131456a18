//! Anthropic Messages API provider implementation.

use super::provider::{CompletionOptions, LlmError, LlmProvider};
use super::types::{CompletionResponse, Message, MessageRole, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Anthropic LLM provider.
///
/// Talks to the `/v1/messages` endpoint with a static API key.
pub struct AnthropicProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider.
    ///
    /// # Arguments
    /// * `client` - Shared HTTP client.
    /// * `base_url` - Base URL of the API (e.g., "https://api.anthropic.com").
    /// * `model` - Model to use.
    /// * `api_key` - API key sent in the `x-api-key` header.
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/v1/messages", self.base_url);

        let request = AnthropicRequest {
            model: &self.model,
            max_tokens: options.max_tokens,
            messages: messages.iter().map(AnthropicMessage::from).collect(),
            temperature: options.temperature,
        };

        debug!(
            model = %self.model,
            message_count = messages.len(),
            max_tokens = options.max_tokens,
            "Sending completion request to Anthropic"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .json(&request)
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status.as_u16(), body));
        }

        let body: AnthropicResponse = response.json().await.map_err(|e| {
            LlmError::InvalidResponse(format!("Failed to parse Anthropic response: {}", e))
        })?;

        // Only a leading text block counts, anything else yields empty text.
        let text = match body.content.into_iter().next() {
            Some(block) if block.block_type == "text" => block.text.unwrap_or_default(),
            _ => String::new(),
        };

        let usage = body.usage.map(|u| TokenUsage {
            input_tokens: u.input_tokens,
            output_tokens: u.output_tokens,
        });

        debug!(
            stop_reason = ?body.stop_reason,
            text_len = text.len(),
            "Received completion response from Anthropic"
        );

        Ok(CompletionResponse {
            text,
            stop_reason: body.stop_reason,
            usage,
        })
    }
}

// Anthropic API types

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<AnthropicMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a Message> for AnthropicMessage<'a> {
    fn from(msg: &'a Message) -> Self {
        let role = match msg.role {
            MessageRole::User => "user",
        };
        AnthropicMessage {
            role,
            content: &msg.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}
