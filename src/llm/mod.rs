//! LLM provider abstraction layer.
//!
//! Single-turn text completions: one trait with one completion call, and an
//! Anthropic Messages API backend.

mod anthropic;
mod provider;
mod types;

pub use anthropic::{AnthropicProvider, ANTHROPIC_API_VERSION};
pub use provider::{CompletionOptions, LlmError, LlmProvider};
pub use types::{CompletionResponse, Message, MessageRole, TokenUsage};
