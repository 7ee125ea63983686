use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::config::MatchingSettings;
use crate::core::{Matcher, ThesisManager, ValidationError};
use crate::models::{
    HealthResponse, InvestorThesis, ScoreManyRequest, ScoreManyResponse, ScoreRequest,
    StoredResultsResponse,
};
use crate::routes::error::ApiError;
use crate::services::PostgresClient;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub matcher: Matcher,
    /// Result and thesis store; `None` runs the service without persistence
    pub store: Option<Arc<PostgresClient>>,
    pub matching: MatchingSettings,
}

impl AppState {
    pub(crate) fn store(&self) -> Result<&PostgresClient, ApiError> {
        self.store.as_deref().ok_or(ApiError::PersistenceUnavailable)
    }
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/score", web::post().to(score))
        .route("/matches/batch", web::post().to(score_batch))
        .route("/matches/results", web::get().to(get_results));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let (status, persistence) = match &state.store {
        Some(store) => {
            let healthy = store.health_check().await.unwrap_or(false);
            (if healthy { "healthy" } else { "degraded" }, healthy)
        }
        None => ("healthy", false),
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        persistence,
    })
}

/// Pick the thesis for a request
///
/// Inline configuration wins; otherwise the investor's stored thesis is used
/// when persistence is configured, falling back to the default thesis.
pub(crate) async fn resolve_thesis(
    state: &AppState,
    investor_id: &str,
    inline: Option<&serde_json::Value>,
) -> Result<InvestorThesis, ApiError> {
    if let Some(raw) = inline {
        return Ok(ThesisManager::deserialize_thesis(raw)?);
    }

    if let Some(store) = &state.store {
        if let Some(thesis) = store.get_thesis(investor_id).await? {
            return Ok(thesis);
        }
        tracing::debug!("No stored thesis for {}, using default", investor_id);
    }

    Ok(ThesisManager::default_thesis())
}

/// Score one candidate
///
/// POST /api/v1/matches/score
///
/// Request body:
/// ```json
/// {
///   "investorId": "string",
///   "candidate": { "id": "string", "sector": "Fintech", ... },
///   "thesis": { "sectors": ["Fintech"], ... }
/// }
/// ```
async fn score(
    state: web::Data<AppState>,
    req: web::Json<ScoreRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let thesis = resolve_thesis(&state, &req.investor_id, req.thesis.as_ref()).await?;
    let result = state
        .matcher
        .score(&req.candidate, &thesis, &req.investor_id, Utc::now())?;

    tracing::debug!(
        "Scored candidate {} for investor {}: {}",
        result.candidate_id,
        result.investor_id,
        result.score
    );

    Ok(HttpResponse::Ok().json(result))
}

/// Score and rank a batch of candidates
///
/// POST /api/v1/matches/batch
///
/// Request body:
/// ```json
/// {
///   "investorId": "string",
///   "candidates": [{ "id": "string", ... }],
///   "thesis": { ... },
///   "limit": 50,
///   "minScore": 40,
///   "persist": true
/// }
/// ```
async fn score_batch(
    state: web::Data<AppState>,
    req: web::Json<ScoreManyRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let req = req.into_inner();

    let max = state.matching.max_batch_size;
    if req.candidates.len() > max {
        return Err(ApiError::BatchTooLarge {
            size: req.candidates.len(),
            max,
        });
    }
    if req.persist && state.store.is_none() {
        return Err(ApiError::PersistenceUnavailable);
    }

    let thesis = resolve_thesis(&state, &req.investor_id, req.thesis.as_ref()).await?;
    let total_candidates = req.candidates.len();
    let limit = req
        .limit
        .unwrap_or(state.matching.default_limit)
        .min(state.matching.max_limit) as usize;

    tracing::info!(
        "Scoring {} candidates for investor {}, limit: {}",
        total_candidates,
        req.investor_id,
        limit
    );

    // Rayon fan-out runs on the blocking pool, off the async workers
    let matcher = state.matcher.clone();
    let investor_id = req.investor_id.clone();
    let candidates = req.candidates;
    let (candidates, ranked) = web::block(move || {
        let ranked = matcher.score_many(&candidates, &thesis, &investor_id, Utc::now())?;
        Ok::<_, ValidationError>((candidates, ranked))
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    let persisted = if req.persist {
        let written = state
            .store()?
            .upsert_match_results(&ranked, &candidates)
            .await?;
        tracing::debug!("Persisted {} results for investor {}", written, req.investor_id);
        true
    } else {
        false
    };

    let min_score = req.min_score.unwrap_or(0.0);
    let results: Vec<_> = ranked
        .into_iter()
        .filter(|r| r.score >= min_score)
        .take(limit)
        .collect();

    tracing::info!(
        "Returning {} results for investor {} (from {} candidates)",
        results.len(),
        req.investor_id,
        total_candidates
    );

    Ok(HttpResponse::Ok().json(ScoreManyResponse {
        run_id: uuid::Uuid::new_v4().to_string(),
        results,
        total_candidates,
        persisted,
    }))
}

#[derive(Debug, Deserialize)]
struct ResultsQuery {
    #[serde(rename = "investorId")]
    investor_id: String,
    limit: Option<u16>,
}

/// Stored results for an investor
///
/// GET /api/v1/matches/results?investorId={investorId}&limit={limit}
async fn get_results(
    state: web::Data<AppState>,
    query: web::Query<ResultsQuery>,
) -> Result<HttpResponse, ApiError> {
    if query.investor_id.is_empty() {
        return Err(ApiError::InvalidRequest(
            "investorId query parameter is required".to_string(),
        ));
    }

    let limit = query
        .limit
        .unwrap_or(state.matching.default_limit)
        .min(state.matching.max_limit) as usize;

    let results = state
        .store()?
        .get_match_results(&query.investor_id, limit)
        .await?;

    Ok(HttpResponse::Ok().json(StoredResultsResponse {
        investor_id: query.investor_id.clone(),
        count: results.len(),
        results,
    }))
}
