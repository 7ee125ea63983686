use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::core::{ThesisManager, ValidationError};
use crate::models::{Candidate, InvestorThesis, MatchFactors, MatchResult};

/// Same order as the engine: score desc, candidate `created_at` asc with
/// missing timestamps last, then candidate id
const STORED_RESULTS_QUERY: &str = r#"
    SELECT candidate_id, investor_id, score, factors, reasoning, disqualified, computed_at
    FROM match_results
    WHERE investor_id = $1
    ORDER BY score DESC, candidate_created_at ASC NULLS LAST, candidate_id ASC
    LIMIT $2
"#;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Stored thesis for {investor_id} is invalid: {source}")]
    InvalidStoredThesis {
        investor_id: String,
        source: ValidationError,
    },
}

/// PostgreSQL store for investor theses and match results
///
/// Results are keyed by `(candidate_id, investor_id)` and written with
/// upserts, so replaying a batch leaves exactly one row per pair.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Store an investor's thesis in serialized configuration form
    pub async fn save_thesis(
        &self,
        investor_id: &str,
        thesis: &InvestorThesis,
    ) -> Result<(), PostgresError> {
        let query = r#"
            INSERT INTO investor_theses (investor_id, config, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (investor_id)
            DO UPDATE SET
                config = EXCLUDED.config,
                updated_at = EXCLUDED.updated_at
        "#;

        sqlx::query(query)
            .bind(investor_id)
            .bind(Json(ThesisManager::serialize_thesis(thesis)))
            .execute(&self.pool)
            .await?;

        tracing::debug!("Saved thesis for investor {}", investor_id);

        Ok(())
    }

    /// Load and normalize an investor's thesis, `None` if never configured
    pub async fn get_thesis(
        &self,
        investor_id: &str,
    ) -> Result<Option<InvestorThesis>, PostgresError> {
        let query = r#"
            SELECT config
            FROM investor_theses
            WHERE investor_id = $1
        "#;

        let row = sqlx::query(query)
            .bind(investor_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let Json(config): Json<serde_json::Value> = row.try_get("config")?;
        ThesisManager::deserialize_thesis(&config)
            .map(Some)
            .map_err(|source| PostgresError::InvalidStoredThesis {
                investor_id: investor_id.to_string(),
                source,
            })
    }

    /// Upsert a batch of results in one transaction
    ///
    /// `candidates` are the scored inputs; their `created_at` is stored so
    /// stored results tie-break the way the engine does. Either every row is
    /// written or none is.
    pub async fn upsert_match_results(
        &self,
        results: &[MatchResult],
        candidates: &[Candidate],
    ) -> Result<u64, PostgresError> {
        let query = r#"
            INSERT INTO match_results
                (candidate_id, investor_id, score, factors, reasoning, disqualified, computed_at,
                 candidate_created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (candidate_id, investor_id)
            DO UPDATE SET
                score = EXCLUDED.score,
                factors = EXCLUDED.factors,
                reasoning = EXCLUDED.reasoning,
                disqualified = EXCLUDED.disqualified,
                computed_at = EXCLUDED.computed_at,
                candidate_created_at = EXCLUDED.candidate_created_at
        "#;

        let created_at = created_at_by_result(results, candidates);
        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for (result, created_at) in results.iter().zip(created_at) {
            let outcome = sqlx::query(query)
                .bind(&result.candidate_id)
                .bind(&result.investor_id)
                .bind(result.score)
                .bind(Json(&result.factors))
                .bind(Json(&result.reasoning))
                .bind(result.disqualified)
                .bind(result.computed_at)
                .bind(created_at)
                .execute(&mut *tx)
                .await?;
            written += outcome.rows_affected();
        }

        tx.commit().await?;

        tracing::debug!("Upserted {} match results", written);

        Ok(written)
    }

    /// Stored results for an investor, best first
    pub async fn get_match_results(
        &self,
        investor_id: &str,
        limit: usize,
    ) -> Result<Vec<MatchResult>, PostgresError> {
        let rows = sqlx::query(STORED_RESULTS_QUERY)
            .bind(investor_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(row_to_result)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Candidate `created_at` for each result, by candidate id (first occurrence wins)
fn created_at_by_result(
    results: &[MatchResult],
    candidates: &[Candidate],
) -> Vec<Option<DateTime<Utc>>> {
    let mut by_id: HashMap<&str, Option<DateTime<Utc>>> = HashMap::with_capacity(candidates.len());
    for candidate in candidates {
        by_id.entry(candidate.id.as_str()).or_insert(candidate.created_at);
    }

    results
        .iter()
        .map(|result| by_id.get(result.candidate_id.as_str()).copied().flatten())
        .collect()
}

fn row_to_result(row: &PgRow) -> Result<MatchResult, sqlx::Error> {
    let Json(factors): Json<MatchFactors> = row.try_get("factors")?;
    let Json(reasoning): Json<Vec<String>> = row.try_get("reasoning")?;

    Ok(MatchResult {
        candidate_id: row.try_get("candidate_id")?,
        investor_id: row.try_get("investor_id")?,
        score: row.try_get("score")?,
        factors,
        reasoning,
        disqualified: row.try_get("disqualified")?,
        computed_at: row.try_get("computed_at")?,
    })
}
