// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Candidate, FundingRange, InvestorThesis, MatchFactors, MatchResult, ScoringWeights, WeightsError};
pub use requests::{ScoreManyRequest, ScoreRequest};
pub use responses::{ErrorResponse, HealthResponse, ScoreManyResponse, StoredResultsResponse};
