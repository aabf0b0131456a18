//! Static mood and genre tables offered to clients as search criteria.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Acoustic features describing a mood, on the usual 0.0..=1.0 scales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodFeatures {
    pub danceability: f64,
    pub energy: f64,
    pub valence: f64,
    pub instrumentalness: f64,
    pub acousticness: f64,
    pub speechiness: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loudness: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub features: MoodFeatures,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreCategory {
    pub main: String,
    pub subgenres: Vec<String>,
}

#[allow(clippy::too_many_arguments)]
fn mood(
    name: &str,
    emoji: &str,
    color: &str,
    description: &str,
    [danceability, energy, valence, instrumentalness, acousticness, speechiness]: [f64; 6],
    tempo: f64,
    loudness: f64,
) -> MoodProfile {
    MoodProfile {
        name: name.to_string(),
        emoji: Some(emoji.to_string()),
        color: Some(color.to_string()),
        description: Some(description.to_string()),
        features: MoodFeatures {
            danceability,
            energy,
            valence,
            instrumentalness,
            acousticness,
            speechiness,
            tempo: Some(tempo),
            loudness: Some(loudness),
        },
    }
}

fn category(main: &str, subgenres: &[&str]) -> GenreCategory {
    GenreCategory {
        main: main.to_string(),
        subgenres: subgenres.iter().map(|s| s.to_string()).collect(),
    }
}

lazy_static! {
    pub static ref MOODS: Vec<MoodProfile> = vec![
        mood(
            "Happy", "😊", "bg-yellow-500",
            "Upbeat and cheerful tunes to brighten your day",
            [0.8, 0.7, 0.9, 0.3, 0.4, 0.2], 120.0, -6.0,
        ),
        mood(
            "Energetic", "⚡", "bg-red-500",
            "High-energy tracks to get you moving",
            [0.9, 0.9, 0.7, 0.2, 0.3, 0.4], 140.0, -4.0,
        ),
        mood(
            "Relaxed", "😌", "bg-blue-500",
            "Calm and soothing melodies for unwinding",
            [0.3, 0.2, 0.6, 0.6, 0.8, 0.1], 85.0, -12.0,
        ),
        mood(
            "Melancholic", "😢", "bg-purple-500",
            "Emotional and reflective songs for deep feelings",
            [0.4, 0.3, 0.2, 0.5, 0.7, 0.2], 95.0, -10.0,
        ),
        mood(
            "Focused", "🎯", "bg-green-500",
            "Concentration-enhancing tracks for productivity",
            [0.4, 0.5, 0.6, 0.8, 0.6, 0.1], 110.0, -14.0,
        ),
        mood(
            "Romantic", "💝", "bg-pink-500",
            "Love songs and romantic melodies",
            [0.5, 0.4, 0.7, 0.3, 0.6, 0.3], 100.0, -8.0,
        ),
        mood(
            "Party", "🎉", "bg-indigo-500",
            "Upbeat party anthems to get the crowd going",
            [0.9, 0.8, 0.8, 0.1, 0.2, 0.4], 128.0, -5.0,
        ),
        mood(
            "Peaceful", "🌅", "bg-teal-500",
            "Serene and peaceful tracks for meditation",
            [0.2, 0.1, 0.5, 0.7, 0.9, 0.1], 75.0, -18.0,
        ),
    ];

    pub static ref GENRE_CATEGORIES: Vec<GenreCategory> = vec![
        category("Pop", &["Synth-pop", "K-pop", "Art Pop", "Indie Pop", "Dream Pop"]),
        category("Rock", &["Alternative", "Classic Rock", "Indie Rock", "Punk Rock", "Progressive Rock"]),
        category("Hip Hop", &["Trap", "Rap", "Alternative Hip Hop", "Lo-fi Hip Hop", "Conscious Hip Hop"]),
        category("Electronic", &["House", "Techno", "Ambient", "Drum & Bass", "Dubstep"]),
        category("R&B", &["Soul", "Contemporary R&B", "Neo Soul", "Alternative R&B"]),
        category("Jazz", &["Bebop", "Swing", "Modern Jazz", "Jazz Fusion", "Cool Jazz"]),
        category("Classical", &["Baroque", "Romantic", "Contemporary Classical", "Minimalist", "Opera"]),
        category("Country", &["Modern Country", "Bluegrass", "Country Pop", "Alternative Country"]),
        category("Folk", &["Contemporary Folk", "Traditional Folk", "Folk Rock", "Indie Folk"]),
        category("Metal", &["Heavy Metal", "Death Metal", "Black Metal", "Progressive Metal", "Metalcore"]),
        category("Indie", &["Indie Rock", "Indie Pop", "Indie Folk", "Alternative Indie"]),
        category("Latin", &["Reggaeton", "Salsa", "Latin Pop", "Bachata", "Latin Jazz"]),
        category("World", &["African", "Asian", "Celtic", "Caribbean", "Middle Eastern"]),
        category("Blues", &["Chicago Blues", "Delta Blues", "Electric Blues", "Contemporary Blues"]),
        category("Reggae", &["Roots Reggae", "Dub", "Dancehall", "Ska"]),
    ];
}

/// Looks up a mood by name, ignoring case.
pub fn find_mood(name: &str) -> Option<&'static MoodProfile> {
    MOODS.iter().find(|m| m.name.eq_ignore_ascii_case(name))
}

/// Top-level genre names.
pub fn genres() -> Vec<&'static str> {
    GENRE_CATEGORIES.iter().map(|c| c.main.as_str()).collect()
}

/// Every genre name, each main genre followed by its subgenres.
/// Subgenres shared by several categories appear once per category.
pub fn detailed_genres() -> Vec<&'static str> {
    GENRE_CATEGORIES
        .iter()
        .flat_map(|c| std::iter::once(c.main.as_str()).chain(c.subgenres.iter().map(String::as_str)))
        .collect()
}
