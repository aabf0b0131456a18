//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When canned upstream data changes, update only this file.

// ============================================================================
// Credentials handed to the server under test
// ============================================================================

pub const TEST_ANTHROPIC_KEY: &str = "test-anthropic-key";
pub const TEST_SPOTIFY_CLIENT_ID: &str = "test-client-id";
pub const TEST_SPOTIFY_CLIENT_SECRET: &str = "test-client-secret";
pub const TEST_LASTFM_KEY: &str = "test-lastfm-key";

// ============================================================================
// Canned upstream data
// ============================================================================

/// Model output listing three songs, wrapped in chatter the parser must skip.
pub const LLM_THREE_SONGS: &str = r#"Sure! Here you go:
{
  "recommendations": [
    {"title": "So What", "artist": "Miles Davis", "year": "1959",
     "genre": ["Jazz"], "description": "Modal classic", "mood_tags": ["cool"],
     "tempo_range": "medium", "vibe": "late night"},
    {"title": "Take Five", "artist": "Dave Brubeck", "year": "1959",
     "genre": ["Jazz"], "description": "5/4 standard", "mood_tags": ["smooth"],
     "tempo_range": "medium", "vibe": "lounge"},
    {"title": "Naima", "artist": "John Coltrane", "year": "1960",
     "genre": ["Jazz"], "description": "Ballad", "mood_tags": ["tender"],
     "tempo_range": "slow", "vibe": "quiet"}
  ]
}
Enjoy!"#;

pub const LLM_NOT_JSON: &str = "I'm sorry, I can't help with that.";

pub const DEEZER_LINK_PREFIX: &str = "https://www.deezer.com/track/";
pub const SPOTIFY_LINK_PREFIX: &str = "https://open.spotify.com/track/";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Shared cache lifetime configured on the server under test
pub const TEST_CACHE_AGE_SEC: usize = 1800;
