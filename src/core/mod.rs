// Core engine exports
pub mod matcher;
pub mod range;
pub mod scoring;
pub mod text;
pub mod thesis;

pub use matcher::Matcher;
pub use range::{coverage_ratio, overlap_length};
pub use scoring::{calculate_relevance_score, RelevanceScore};
pub use text::{find_excluded_term, matched_keywords, matches_any, CandidateField, SearchText};
pub use thesis::{denormalize_thesis, normalize_thesis, ThesisConfig, ThesisManager, ValidationError};
