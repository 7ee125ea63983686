use serde::{Deserialize, Serialize};

use crate::models::domain::MatchResult;

/// Response for the batch scoring endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreManyResponse {
    #[serde(rename = "runId")]
    pub run_id: String,
    pub results: Vec<MatchResult>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    pub persisted: bool,
}

/// Stored results for one investor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResultsResponse {
    #[serde(rename = "investorId")]
    pub investor_id: String,
    pub results: Vec<MatchResult>,
    pub count: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub persistence: bool,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
