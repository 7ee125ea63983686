//! Thesis Match - deterministic relevance scoring of leads against investor theses
//!
//! The core is a pure scoring function plus a batch operation that ranks many
//! candidates against one normalized thesis. Storage and HTTP live around it
//! in `services` and `routes`.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    calculate_relevance_score, denormalize_thesis, normalize_thesis, Matcher, ThesisConfig,
    ThesisManager, ValidationError,
};
pub use models::{Candidate, FundingRange, InvestorThesis, MatchFactors, MatchResult, ScoringWeights};
