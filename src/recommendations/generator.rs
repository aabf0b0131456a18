//! Generative client: one prompt in, raw model text out.

use super::models::RecommendationError;
use super::retry_policy::RetryPolicy;
use crate::llm::{CompletionOptions, LlmError, LlmProvider, Message};
use crate::server::metrics;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct RecommendationGenerator {
    provider: Arc<dyn LlmProvider>,
    options: CompletionOptions,
    retry: RetryPolicy,
    timeout: Duration,
}

impl RecommendationGenerator {
    /// `timeout` bounds the whole call, backoff sleeps included.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        options: CompletionOptions,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            options,
            retry,
            timeout,
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, RecommendationError> {
        match tokio::time::timeout(self.timeout, self.generate_with_retry(prompt)).await {
            Ok(result) => result.map_err(RecommendationError::from),
            Err(_) => Err(RecommendationError::Timeout(self.timeout)),
        }
    }

    async fn generate_with_retry(&self, prompt: &str) -> Result<String, LlmError> {
        let messages = [Message::user(prompt)];
        let mut attempt = 0;

        loop {
            match self.provider.complete(&messages, &self.options).await {
                Ok(response) => {
                    metrics::record_llm_attempt("success");
                    if let Some(usage) = response.usage {
                        metrics::record_llm_tokens(usage.input_tokens, usage.output_tokens);
                    }
                    debug!(
                        provider = self.provider.name(),
                        model = self.provider.model(),
                        attempt,
                        stop_reason = ?response.stop_reason,
                        input_tokens = response.usage.map(|u| u.input_tokens),
                        output_tokens = response.usage.map(|u| u.output_tokens),
                        "Generation succeeded"
                    );
                    return Ok(response.text);
                }
                Err(err) => {
                    metrics::record_llm_attempt(err.kind());
                    if !self.retry.should_retry(&err, attempt) {
                        return Err(err);
                    }
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Generation failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
