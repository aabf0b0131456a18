//! Prompt construction for recommendation requests.

use super::models::SearchCriteria;

const RESPONSE_FORMAT: &str = r#"Respond ONLY with a JSON object in this exact format, with no additional text or explanation:
{
  "recommendations": [
    {
      "title": "Song Title",
      "artist": "Artist Name",
      "year": "2024",
      "genre": ["Genre1", "Genre2"],
      "description": "Brief description",
      "mood_tags": ["mood1", "mood2"],
      "tempo_range": "slow/medium/fast",
      "vibe": "chill/energetic/etc"
    }
  ]
}"#;

/// Builds the prompt for `count` songs. Output is a pure function of the input.
pub fn build_prompt(criteria: &SearchCriteria, count: usize) -> String {
    let mut clauses = Vec::with_capacity(3);
    if let Some(mood) = criteria.mood() {
        clauses.push(format!("mood {}", mood.name));
    }
    if let Some(genre) = criteria.genre() {
        clauses.push(format!("genre {}", genre));
    }
    if let Some(song) = criteria.song_name() {
        clauses.push(format!("similar to \"{}\"", song));
    }

    let mut prompt = format!(
        "You are a music recommendation system. Generate exactly {} song recommendations that match the following criteria: {}.\n",
        count,
        clauses.join(" and ")
    );

    if let Some(mood) = criteria.mood() {
        let features = &mood.features;
        prompt.push_str(&format!(
            "The songs should match these musical qualities: danceability: {}, energy: {}, valence: {}.\n",
            features.danceability, features.energy, features.valence
        ));
    }

    prompt.push_str(
        "IMPORTANT: Please suggest real, existing songs that are likely to be found on music streaming services.\n\n",
    );
    prompt.push_str(RESPONSE_FORMAT);
    prompt
}
