use std::fmt;

use crate::models::Candidate;

/// Candidate fields searched for keywords and exclusions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateField {
    Description,
    Sector,
    Stage,
}

impl fmt::Display for CandidateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CandidateField::Description => "description",
            CandidateField::Sector => "sector",
            CandidateField::Stage => "stage",
        };
        f.write_str(name)
    }
}

/// Lowercased free text of a candidate, built once per scoring call
#[derive(Debug, Clone)]
pub struct SearchText {
    description: String,
    sector: String,
    stage: String,
}

impl SearchText {
    pub fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            description: candidate.description().to_lowercase(),
            sector: candidate.sector().to_lowercase(),
            stage: candidate.stage().to_lowercase(),
        }
    }

    /// First field containing `term` as a case-insensitive substring
    pub fn find(&self, term: &str) -> Option<CandidateField> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        [
            (CandidateField::Description, &self.description),
            (CandidateField::Sector, &self.sector),
            (CandidateField::Stage, &self.stage),
        ]
        .into_iter()
        .find(|(_, haystack)| haystack.contains(&needle))
        .map(|(field, _)| field)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.find(term).is_some()
    }
}

/// Case-insensitive membership of `value` in `preferred`
///
/// An empty value never matches. Callers handle the unconstrained (empty
/// preference) case themselves.
#[inline]
pub fn matches_any(value: &str, preferred: &[String]) -> bool {
    let value = value.trim().to_lowercase();
    !value.is_empty()
        && preferred
            .iter()
            .any(|p| p.trim().to_lowercase() == value)
}

/// First excluded term present in the candidate text, in thesis order
pub fn find_excluded_term<'t>(
    excluded: &'t [String],
    text: &SearchText,
) -> Option<(&'t str, CandidateField)> {
    excluded
        .iter()
        .find_map(|term| text.find(term).map(|field| (term.as_str(), field)))
}

/// Distinct keywords present in the candidate text, in thesis order
pub fn matched_keywords<'k>(keywords: &'k [String], text: &SearchText) -> Vec<&'k str> {
    let mut matched: Vec<&str> = Vec::new();
    for keyword in keywords {
        let already = matched
            .iter()
            .any(|m| m.to_lowercase() == keyword.to_lowercase());
        if !already && text.contains(keyword) {
            matched.push(keyword.as_str());
        }
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(sector: &str, stage: &str, description: &str) -> Candidate {
        Candidate {
            id: "c1".to_string(),
            sector: Some(sector.to_string()),
            stage: Some(stage.to_string()),
            funding_requirement: None,
            location: None,
            description: Some(description.to_string()),
            created_at: None,
        }
    }

    fn terms(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_matches_any_is_case_insensitive() {
        assert!(matches_any("Fintech", &terms(&["fintech"])));
        assert!(matches_any(" US ", &terms(&["EU", "us"])));
        assert!(!matches_any("Biotech", &terms(&["Fintech"])));
    }

    #[test]
    fn test_empty_value_never_matches() {
        assert!(!matches_any("", &terms(&["Fintech"])));
        assert!(!matches_any("   ", &terms(&[""])));
    }

    #[test]
    fn test_find_reports_first_field() {
        let text = SearchText::from_candidate(&candidate("Fintech", "Seed", "payments rails"));
        assert_eq!(text.find("PAY"), Some(CandidateField::Description));
        assert_eq!(text.find("tech"), Some(CandidateField::Sector));
        assert_eq!(text.find("seed"), Some(CandidateField::Stage));
        assert_eq!(text.find("crypto"), None);
        assert_eq!(text.find(""), None);
    }

    #[test]
    fn test_excluded_term_in_thesis_order() {
        let text = SearchText::from_candidate(&candidate("Fintech", "Seed", "crypto wallet"));
        let excluded = terms(&["gambling", "Fintech", "crypto"]);
        assert_eq!(
            find_excluded_term(&excluded, &text),
            Some(("Fintech", CandidateField::Sector))
        );
    }

    #[test]
    fn test_matched_keywords_are_distinct() {
        let text = SearchText::from_candidate(&candidate("Fintech", "Seed", "AI lending platform"));
        let keywords = terms(&["ai", "AI", "lending", "robotics"]);
        assert_eq!(matched_keywords(&keywords, &text), vec!["ai", "lending"]);
    }

    #[test]
    fn test_location_is_not_searched() {
        let mut c = candidate("Fintech", "Seed", "payments");
        c.location = Some("Berlin".to_string());
        let text = SearchText::from_candidate(&c);
        assert!(!text.contains("berlin"));
    }
}
