use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::Candidate;

/// Request to score a single candidate
///
/// `thesis` is raw configuration; when absent the default (unconstrained)
/// thesis is used.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScoreRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "investor_id", rename = "investorId")]
    pub investor_id: String,
    pub candidate: Candidate,
    #[serde(default)]
    pub thesis: Option<serde_json::Value>,
}

/// Request to score and rank a batch of candidates
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScoreManyRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "investor_id", rename = "investorId")]
    pub investor_id: String,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub thesis: Option<serde_json::Value>,
    #[serde(default)]
    pub limit: Option<u16>,
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(alias = "min_score", rename = "minScore", default)]
    pub min_score: Option<f64>,
    /// Upsert the ranked results into the result store
    #[serde(default)]
    pub persist: bool,
}
