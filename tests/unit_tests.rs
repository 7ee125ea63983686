// Unit tests for Thesis Match

use serde_json::json;
use thesis_match::core::{
    calculate_relevance_score, coverage_ratio, denormalize_thesis, matches_any, normalize_thesis,
    overlap_length, CandidateField, SearchText, ThesisManager, ValidationError,
};
use thesis_match::models::{Candidate, FundingRange, InvestorThesis, ScoringWeights};

fn create_candidate() -> Candidate {
    Candidate {
        id: "lead".to_string(),
        sector: Some("Climate".to_string()),
        stage: Some("Series A".to_string()),
        funding_requirement: Some(FundingRange::new(1_000_000.0, 3_000_000.0)),
        location: Some("Berlin".to_string()),
        description: Some("Grid-scale battery storage".to_string()),
        created_at: None,
    }
}

#[test]
fn test_overlap_of_nested_ranges() {
    assert_eq!(overlap_length((10.0, 20.0), (0.0, 100.0)), 10.0);
    assert_eq!(coverage_ratio((10.0, 20.0), (0.0, 100.0)), 1.0);
}

#[test]
fn test_coverage_when_check_range_inside_raise() {
    let ratio = coverage_ratio((0.0, 1_000.0), (250.0, 500.0));
    assert!((ratio - 0.25).abs() < 1e-12);
}

#[test]
fn test_matches_any_unicode_case() {
    let preferred = vec!["ÉNERGIE".to_string()];
    assert!(matches_any("énergie", &preferred));
}

#[test]
fn test_search_text_scans_description_sector_stage() {
    let text = SearchText::from_candidate(&create_candidate());
    assert_eq!(text.find("BATTERY"), Some(CandidateField::Description));
    assert_eq!(text.find("climate"), Some(CandidateField::Sector));
    assert_eq!(text.find("series"), Some(CandidateField::Stage));
    assert_eq!(text.find("berlin"), None);
}

#[test]
fn test_geography_mismatch_costs_only_geography() {
    let thesis = normalize_thesis(&json!({"geographies": ["US", "UK"]})).unwrap();
    let result = calculate_relevance_score(&create_candidate(), &thesis, &ScoringWeights::default());

    assert_eq!(result.factors.geography, 0.0);
    assert_eq!(result.score, 90.0);
    assert_eq!(result.reasoning[3], "Geography: 'Berlin' is not among US, UK (0.00/10.00)");
}

#[test]
fn test_unconstrained_dimensions_never_penalize_missing_fields() {
    let bare = Candidate {
        id: "bare".to_string(),
        sector: None,
        stage: None,
        funding_requirement: None,
        location: None,
        description: None,
        created_at: None,
    };
    let thesis = normalize_thesis(&json!({"sectors": ["Climate"]})).unwrap();
    let result = calculate_relevance_score(&bare, &thesis, &ScoringWeights::default());

    assert_eq!(result.factors.sector, 0.0);
    assert_eq!(result.score, 70.0);
}

#[test]
fn test_excluded_keyword_in_stage() {
    let thesis = normalize_thesis(&json!({"excludedKeywords": ["series a"]})).unwrap();
    let result = calculate_relevance_score(&create_candidate(), &thesis, &ScoringWeights::default());

    assert!(result.disqualified);
    assert_eq!(
        result.reasoning,
        vec!["Disqualified: excluded keyword \"series a\" found in candidate stage"]
    );
}

#[test]
fn test_excluded_keyword_in_location_is_ignored() {
    let thesis = normalize_thesis(&json!({"excludedKeywords": ["berlin"]})).unwrap();
    let result = calculate_relevance_score(&create_candidate(), &thesis, &ScoringWeights::default());

    assert!(!result.disqualified);
    assert_eq!(result.score, 100.0);
}

#[test]
fn test_disqualification_wins_over_perfect_fit() {
    let thesis = normalize_thesis(&json!({
        "sectors": ["Climate"],
        "stages": ["Series A"],
        "checkSize": [1_000_000, 3_000_000],
        "geographies": ["Berlin"],
        "keywords": ["battery"],
        "excludedKeywords": ["grid"]
    }))
    .unwrap();
    let result = calculate_relevance_score(&create_candidate(), &thesis, &ScoringWeights::default());

    assert_eq!(result.score, 0.0);
    assert_eq!(result.factors.sector, 30.0);
    assert_eq!(result.factors.exclusion, -100.0);
}

#[test]
fn test_thesis_validation_errors() {
    assert_eq!(normalize_thesis(&json!("Fintech")), Err(ValidationError::NotAnObject));
    assert!(matches!(
        normalize_thesis(&json!({"stages": 3})),
        Err(ValidationError::WrongType { field: "stages", .. })
    ));
    assert!(matches!(
        normalize_thesis(&json!({"checkSizeMax": [1, 2]})),
        Err(ValidationError::WrongType { field: "checkSizeMax", .. })
    ));
}

#[test]
fn test_missing_max_becomes_upper_bound_after_swap() {
    let thesis = normalize_thesis(&json!({"checkSizeMin": 500_000})).unwrap();
    assert_eq!(thesis.check_size_min(), 0.0);
    assert_eq!(thesis.check_size_max(), 500_000.0);
}

#[test]
fn test_default_thesis_serialized_shape() {
    assert_eq!(
        denormalize_thesis(&ThesisManager::default_thesis()),
        json!({
            "sectors": [],
            "stages": [],
            "checkSizeMin": 0,
            "checkSizeMax": 0,
            "geographies": [],
            "keywords": [],
            "excludedKeywords": []
        })
    );
}

#[test]
fn test_thesis_serde_round_trip() {
    let thesis = normalize_thesis(&json!({
        "sectors": ["Climate", "Energy"],
        "checkSize": {"min": "1,000,000", "max": 2_500_000.5},
        "keywords": "battery, grid"
    }))
    .unwrap();

    let text = serde_json::to_string(&thesis).unwrap();
    let back: InvestorThesis = serde_json::from_str(&text).unwrap();
    assert_eq!(back, thesis);
}
