use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::core::{
    scoring::{calculate_relevance_score, RelevanceScore},
    thesis::{ThesisConfig, ValidationError},
};
use crate::models::{Candidate, InvestorThesis, MatchResult, ScoringWeights, WeightsError};

/// Scores candidates against an investor thesis and ranks them
///
/// Holds only the weight table, so a single instance can be shared freely
/// between workers.
///
/// # Pipeline
/// 1. Thesis normalization (once per call)
/// 2. Independent per-candidate scoring (parallel for batches)
/// 3. Sequential merge and deterministic sort
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
}

impl Matcher {
    /// # Errors
    /// [`WeightsError`] unless every weight is non-negative and they sum to 100.
    pub fn new(weights: ScoringWeights) -> Result<Self, WeightsError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score one candidate
    ///
    /// `thesis` may be raw configuration JSON or an already normalized
    /// [`InvestorThesis`]. `computed_at` is supplied by the caller so the
    /// result stays a pure function of the inputs.
    ///
    /// # Errors
    /// [`ValidationError`] when raw thesis configuration is malformed.
    pub fn score<'a>(
        &self,
        candidate: &Candidate,
        thesis: impl Into<ThesisConfig<'a>>,
        investor_id: &str,
        computed_at: DateTime<Utc>,
    ) -> Result<MatchResult, ValidationError> {
        let thesis = thesis.into().normalize()?;
        let relevance = calculate_relevance_score(candidate, &thesis, &self.weights);
        Ok(build_result(candidate, relevance, investor_id, computed_at))
    }

    /// Score many candidates and rank them
    ///
    /// The thesis is normalized before any scoring, so a malformed thesis
    /// fails the whole batch up front. Results are sorted by score
    /// (descending), then `created_at` (ascending, missing last), then
    /// candidate id (ascending).
    ///
    /// # Errors
    /// [`ValidationError`] when raw thesis configuration is malformed.
    pub fn score_many<'a>(
        &self,
        candidates: &[Candidate],
        thesis: impl Into<ThesisConfig<'a>>,
        investor_id: &str,
        computed_at: DateTime<Utc>,
    ) -> Result<Vec<MatchResult>, ValidationError> {
        let thesis = thesis.into().normalize()?;
        Ok(self.rank(candidates, &thesis, investor_id, computed_at))
    }

    fn rank(
        &self,
        candidates: &[Candidate],
        thesis: &InvestorThesis,
        investor_id: &str,
        computed_at: DateTime<Utc>,
    ) -> Vec<MatchResult> {
        // Fan out: every candidate is scored independently
        let mut scored: Vec<(&Candidate, RelevanceScore)> = candidates
            .par_iter()
            .map(|candidate| {
                (
                    candidate,
                    calculate_relevance_score(candidate, thesis, &self.weights),
                )
            })
            .collect();

        // Fan in: single sequential sort
        scored.sort_by(|(a, a_score), (b, b_score)| {
            b_score
                .score
                .total_cmp(&a_score.score)
                .then_with(|| compare_created_at(a.created_at, b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        tracing::debug!(
            "Ranked {} candidates for investor {}",
            scored.len(),
            investor_id
        );

        scored
            .into_iter()
            .map(|(candidate, relevance)| build_result(candidate, relevance, investor_id, computed_at))
            .collect()
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Earlier first; candidates without a timestamp sort after those with one
fn compare_created_at(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn build_result(
    candidate: &Candidate,
    relevance: RelevanceScore,
    investor_id: &str,
    computed_at: DateTime<Utc>,
) -> MatchResult {
    MatchResult {
        candidate_id: candidate.id.clone(),
        investor_id: investor_id.to_string(),
        score: relevance.score,
        factors: relevance.factors,
        reasoning: relevance.reasoning,
        disqualified: relevance.disqualified,
        computed_at,
    }
}
