//! Recommendation pipeline.
//!
//! A prompt built from the user's criteria goes to the generative model, the
//! reply is parsed into validated candidates, and every candidate is enriched
//! through the provider chain before the list is returned.

mod generator;
mod models;
mod orchestrator;
mod parser;
mod prompt;
mod retry_policy;

pub use generator::RecommendationGenerator;
pub use models::{
    EnrichedRecommendation, MoodInput, RawRecommendation, RecommendationError,
    RecommendationsResponse, SearchCriteria,
};
pub use orchestrator::RecommendationService;
pub use parser::{parse_recommendations, ParseError};
pub use prompt::build_prompt;
pub use retry_policy::RetryPolicy;
