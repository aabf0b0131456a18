//! Request, intermediate and response types of the recommendation pipeline.

use super::parser::ParseError;
use crate::llm::LlmError;
use crate::moods::{find_mood, MoodProfile};
use crate::providers::{AlbumArt, AlbumInfo, TrackMetadata, TrackSource};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const PLACEHOLDER_ID_LEN: usize = 9;
const PLACEHOLDER_ART_SIZE: u32 = 300;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A mood as sent by clients: either a name from the mood table or a full
/// profile object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MoodInput {
    Name(String),
    Profile(MoodProfile),
}

impl MoodInput {
    fn name(&self) -> &str {
        match self {
            MoodInput::Name(name) => name.trim(),
            MoodInput::Profile(profile) => profile.name.trim(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.name().is_empty()
    }

    /// Names are looked up in the mood table, ignoring case.
    pub fn resolve(&self) -> Option<&MoodProfile> {
        if self.is_blank() {
            return None;
        }
        match self {
            MoodInput::Name(name) => find_mood(name.trim()),
            MoodInput::Profile(profile) => Some(profile),
        }
    }
}

impl From<MoodProfile> for MoodInput {
    fn from(profile: MoodProfile) -> Self {
        MoodInput::Profile(profile)
    }
}

/// What the user asked for. At least one criterion must be present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    #[serde(default)]
    pub mood: Option<MoodInput>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub song_name: Option<String>,
}

impl SearchCriteria {
    pub fn mood(&self) -> Option<&MoodProfile> {
        self.mood.as_ref().and_then(MoodInput::resolve)
    }

    /// A non-blank mood name that is not in the mood table.
    pub fn unknown_mood(&self) -> Option<&str> {
        self.mood
            .as_ref()
            .filter(|m| !m.is_blank() && m.resolve().is_none())
            .map(MoodInput::name)
    }

    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref().map(str::trim).filter(|g| !g.is_empty())
    }

    pub fn song_name(&self) -> Option<&str> {
        self.song_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Blank strings count as absent.
    pub fn is_empty(&self) -> bool {
        !self.mood.as_ref().is_some_and(|m| !m.is_blank())
            && self.genre().is_none()
            && self.song_name().is_none()
    }
}

/// A candidate produced by the model, only kept once every field type-checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecommendation {
    pub title: String,
    pub artist: String,
    pub year: String,
    pub genre: Vec<String>,
    pub description: String,
    pub mood_tags: Vec<String>,
    pub tempo_range: String,
    pub vibe: String,
}

/// A recommendation with catalog metadata attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRecommendation {
    pub title: String,
    pub artist: String,
    pub year: String,
    pub genre: Vec<String>,
    pub description: String,
    #[serde(rename = "mood_tags")]
    pub mood_tags: Vec<String>,
    #[serde(rename = "tempo_range")]
    pub tempo_range: String,
    pub vibe: String,

    pub source: TrackSource,
    pub id: Option<String>,
    pub album_art: Vec<AlbumArt>,
    pub preview_url: Option<String>,
    pub external_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<AlbumInfo>,
}

impl EnrichedRecommendation {
    /// Provider values win over the model's for the fields they share.
    pub fn merge(raw: RawRecommendation, metadata: TrackMetadata) -> Self {
        Self {
            title: metadata.title,
            artist: metadata.artist,
            year: raw.year,
            genre: raw.genre,
            description: raw.description,
            mood_tags: raw.mood_tags,
            tempo_range: raw.tempo_range,
            vibe: raw.vibe,
            source: metadata.source,
            id: metadata.id,
            album_art: metadata.album_art,
            preview_url: metadata.preview_url,
            external_url: metadata.external_url,
            album: Some(metadata.album),
        }
    }

    /// Used when no catalog matched in time.
    pub fn placeholder(raw: RawRecommendation) -> Self {
        Self {
            title: raw.title,
            artist: raw.artist,
            year: raw.year,
            genre: raw.genre,
            description: raw.description,
            mood_tags: raw.mood_tags,
            tempo_range: raw.tempo_range,
            vibe: raw.vibe,
            source: TrackSource::None,
            id: Some(placeholder_id()),
            album_art: vec![AlbumArt {
                url: String::new(),
                height: PLACEHOLDER_ART_SIZE,
                width: PLACEHOLDER_ART_SIZE,
            }],
            preview_url: None,
            external_url: None,
            album: None,
        }
    }
}

fn placeholder_id() -> String {
    let mut rng = rand::rng();
    (0..PLACEHOLDER_ID_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<EnrichedRecommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecommendationsResponse {
    pub fn ok(recommendations: Vec<EnrichedRecommendation>) -> Self {
        Self {
            recommendations,
            error: None,
        }
    }

    /// An empty but successful answer carrying an advisory message.
    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            recommendations: Vec::new(),
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to parse recommendations: {0}")]
    Parse(#[from] ParseError),
}

impl RecommendationError {
    pub fn code(&self) -> &'static str {
        match self {
            RecommendationError::Config(_) => "CONFIG_ERROR",
            RecommendationError::InvalidRequest(_) => "INVALID_REQUEST",
            RecommendationError::Generation(_) => "GENERATION_ERROR",
            RecommendationError::Timeout(_) => "UPSTREAM_TIMEOUT",
            RecommendationError::Parse(_) => "PARSE_ERROR",
        }
    }

    /// Message shown to users when the request degrades to an empty list.
    pub fn advisory(&self) -> String {
        match self {
            RecommendationError::Generation(LlmError::Overloaded) => {
                "Service is temporarily overloaded, please try again in a few moments".to_string()
            }
            RecommendationError::Generation(LlmError::RateLimited) => {
                "Too many requests, please try again in a few moments".to_string()
            }
            RecommendationError::Timeout(_) | RecommendationError::Generation(LlmError::Timeout) => {
                "Recommendations took too long to generate, please try again".to_string()
            }
            other => format!("Failed to get recommendations: {}", other),
        }
    }
}
