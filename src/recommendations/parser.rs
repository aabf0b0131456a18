//! Extracts recommendations from free-form model output.
//!
//! The model is asked for bare JSON but may wrap it in prose or typographic
//! quotes. The outermost `{ ... }` span (first opening brace to last closing
//! brace) is taken as the payload, curly double quotes are replaced with
//! ASCII ones, and every candidate is validated independently.

use super::models::RawRecommendation;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("No JSON object found in response")]
    NoJsonObject,

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid recommendations format")]
    MissingRecommendations,

    #[error("No valid recommendations found")]
    NoValidRecommendations,
}

/// Parses and validates model output. Invalid candidates are dropped silently;
/// an empty result is an error.
pub fn parse_recommendations(text: &str) -> Result<Vec<RawRecommendation>, ParseError> {
    let payload = extract_json_object(text).ok_or(ParseError::NoJsonObject)?;
    let normalized = normalize_quotes(payload);

    let parsed: Value =
        serde_json::from_str(&normalized).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let candidates = parsed
        .get("recommendations")
        .and_then(Value::as_array)
        .ok_or(ParseError::MissingRecommendations)?;

    let valid: Vec<RawRecommendation> = candidates.iter().filter_map(validate_candidate).collect();

    if valid.len() < candidates.len() {
        debug!(
            total = candidates.len(),
            valid = valid.len(),
            "Dropped invalid recommendation candidates"
        );
    }

    if valid.is_empty() {
        return Err(ParseError::NoValidRecommendations);
    }
    Ok(valid)
}

/// Greedy first-`{` to last-`}` span.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

pub fn normalize_quotes(text: &str) -> String {
    text.replace(['\u{201C}', '\u{201D}'], "\"")
}

/// Keeps a candidate only when all required fields exist with the right types.
/// Unknown extra fields are ignored.
pub fn validate_candidate(candidate: &Value) -> Option<RawRecommendation> {
    if !candidate.is_object() {
        return None;
    }
    serde_json::from_value(candidate.clone()).ok()
}
