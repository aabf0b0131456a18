//! Recommendation pipeline: validate, generate, parse, enrich, respond.

use super::generator::RecommendationGenerator;
use super::models::{
    EnrichedRecommendation, RawRecommendation, RecommendationError, RecommendationsResponse,
    SearchCriteria,
};
use super::parser::parse_recommendations;
use super::prompt::build_prompt;
use crate::providers::{PreparedChain, ProviderChain, TrackMetadata};
use crate::server::metrics;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

pub struct RecommendationService {
    /// `None` when no generative API key is configured.
    generator: Option<RecommendationGenerator>,
    chain: Arc<ProviderChain>,
    count: usize,
    enrichment_deadline: Duration,
}

impl RecommendationService {
    pub fn new(
        generator: Option<RecommendationGenerator>,
        chain: Arc<ProviderChain>,
        count: usize,
        enrichment_deadline: Duration,
    ) -> Self {
        Self {
            generator,
            chain,
            count,
            enrichment_deadline,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.generator.is_some()
    }

    /// Runs the whole pipeline.
    ///
    /// Only invalid input and missing configuration are errors. Generation and
    /// parse failures degrade to an empty list with an advisory message, and
    /// enrichment failures degrade per recommendation to placeholders.
    pub async fn recommend(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<RecommendationsResponse, RecommendationError> {
        if criteria.is_empty() {
            return Err(RecommendationError::InvalidRequest(
                "At least one of mood, genre or songName is required".to_string(),
            ));
        }
        if let Some(name) = criteria.unknown_mood() {
            return Err(RecommendationError::InvalidRequest(format!(
                "Unknown mood: {}",
                name
            )));
        }
        let generator = self.generator.as_ref().ok_or_else(|| {
            RecommendationError::Config("ANTHROPIC_API_KEY is not configured".to_string())
        })?;

        let started = Instant::now();
        let prompt = build_prompt(criteria, self.count);

        let raw = match self.generate_and_parse(generator, &prompt).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    code = err.code(),
                    error = %err,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Recommendation generation failed, returning empty result"
                );
                return Ok(RecommendationsResponse::degraded(err.advisory()));
            }
        };

        let recommendations = self.enrich(raw).await;
        info!(
            count = recommendations.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recommendations ready"
        );
        Ok(RecommendationsResponse::ok(recommendations))
    }

    async fn generate_and_parse(
        &self,
        generator: &RecommendationGenerator,
        prompt: &str,
    ) -> Result<Vec<RawRecommendation>, RecommendationError> {
        let text = generator.generate(prompt).await?;
        debug!(chars = text.len(), "Generation complete, parsing");

        let mut raw = parse_recommendations(&text)?;
        raw.truncate(self.count);
        debug!(count = raw.len(), "Parsed recommendations");
        Ok(raw)
    }

    /// Looks every recommendation up concurrently. The deadline also bounds
    /// chain preparation; lookups still running when it passes are aborted
    /// and their recommendations get placeholders.
    async fn enrich(&self, raw: Vec<RawRecommendation>) -> Vec<EnrichedRecommendation> {
        let deadline = tokio::time::Instant::now() + self.enrichment_deadline;
        let found = match tokio::time::timeout_at(deadline, self.chain.prepare()).await {
            Ok(chain) => self.lookup_all(Arc::new(chain), &raw, deadline).await,
            Err(_) => {
                warn!(
                    deadline_ms = self.enrichment_deadline.as_millis() as u64,
                    "Provider chain not ready before enrichment deadline, using placeholders"
                );
                raw.iter().map(|_| None).collect()
            }
        };

        raw.into_iter()
            .zip(found)
            .map(|(rec, metadata)| {
                let enriched = match metadata {
                    Some(metadata) => EnrichedRecommendation::merge(rec, metadata),
                    None => EnrichedRecommendation::placeholder(rec),
                };
                metrics::record_enrichment(enriched.source.as_str());
                enriched
            })
            .collect()
    }

    async fn lookup_all(
        &self,
        chain: Arc<PreparedChain>,
        raw: &[RawRecommendation],
        deadline: tokio::time::Instant,
    ) -> Vec<Option<TrackMetadata>> {
        let mut found: Vec<Option<TrackMetadata>> = raw.iter().map(|_| None).collect();
        let mut tasks = JoinSet::new();
        for (index, rec) in raw.iter().enumerate() {
            let chain = chain.clone();
            let title = rec.title.clone();
            let artist = rec.artist.clone();
            tasks.spawn(async move { (index, chain.find_track(&title, &artist).await) });
        }

        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((index, metadata)))) => found[index] = metadata,
                Ok(Some(Err(err))) => warn!(error = %err, "Enrichment task failed"),
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        pending = tasks.len(),
                        deadline_ms = self.enrichment_deadline.as_millis() as u64,
                        "Enrichment deadline elapsed, using placeholders"
                    );
                    tasks.abort_all();
                    break;
                }
            }
        }
        found
    }
}
