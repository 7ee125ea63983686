use crate::core::{
    range::coverage_ratio,
    text::{find_excluded_term, matched_keywords, matches_any, SearchText},
};
use crate::models::{Candidate, InvestorThesis, MatchFactors, ScoringWeights};

/// Score, factor breakdown and explanation for one (candidate, thesis) pair
#[derive(Debug, Clone, PartialEq)]
pub struct RelevanceScore {
    pub score: f64,
    pub factors: MatchFactors,
    pub reasoning: Vec<String>,
    pub disqualified: bool,
}

/// One factor's points and the sentence explaining them
struct FactorScore {
    points: f64,
    reason: String,
}

/// Calculate a relevance score (0-100) for a candidate against a normalized thesis
///
/// Scoring formula (default weights):
/// score = (
///     sector      30    # candidate sector in thesis sectors
///   + stage       20    # candidate stage in thesis stages
///   + check size  25    # share of the raise inside the check range
///   + geography   10    # candidate location in thesis geographies
///   + keywords    15    # share of thesis keywords found in the candidate text
/// )
///
/// An unconstrained dimension always earns full points. Any excluded keyword
/// found in the description, sector or stage forces the score to 0; the five
/// sub-scores are still reported in `factors` and `exclusion` cancels them.
///
/// Pure and deterministic: identical inputs give identical output, reasoning
/// text included.
pub fn calculate_relevance_score(
    candidate: &Candidate,
    thesis: &InvestorThesis,
    weights: &ScoringWeights,
) -> RelevanceScore {
    let text = SearchText::from_candidate(candidate);
    let exclusion = find_excluded_term(thesis.excluded_keywords(), &text);

    let sector = score_membership(
        "Sector",
        "sector",
        candidate.sector(),
        thesis.sectors(),
        weights.sector,
    );
    let stage = score_membership(
        "Stage",
        "stage",
        candidate.stage(),
        thesis.stages(),
        weights.stage,
    );
    let check_size = score_check_size(candidate, thesis, weights.check_size);
    let geography = score_membership(
        "Geography",
        "location",
        candidate.location(),
        thesis.geographies(),
        weights.geography,
    );
    let keywords = score_keywords(thesis.keywords(), &text, weights.keywords);

    let mut factors = MatchFactors {
        sector: sector.points,
        stage: stage.points,
        check_size: check_size.points,
        geography: geography.points,
        keywords: keywords.points,
        exclusion: 0.0,
    };
    let subtotal = round2(factors.total());

    if let Some((term, field)) = exclusion {
        factors.exclusion = -subtotal;
        return RelevanceScore {
            score: 0.0,
            factors,
            reasoning: vec![format!(
                "Disqualified: excluded keyword \"{}\" found in candidate {}",
                term, field
            )],
            disqualified: true,
        };
    }

    RelevanceScore {
        score: subtotal.clamp(0.0, 100.0),
        factors,
        reasoning: vec![
            sector.reason,
            stage.reason,
            check_size.reason,
            geography.reason,
            keywords.reason,
        ],
        disqualified: false,
    }
}

/// Full points when `preferred` is empty or contains `value`, otherwise 0
fn score_membership(
    label: &str,
    noun: &str,
    value: &str,
    preferred: &[String],
    weight: f64,
) -> FactorScore {
    let weight = weight.max(0.0);

    if preferred.is_empty() {
        return FactorScore {
            points: round2(weight),
            reason: format!(
                "{}: no {} preference, full credit ({})",
                label,
                noun,
                points_of(weight, weight)
            ),
        };
    }

    if matches_any(value, preferred) {
        return FactorScore {
            points: round2(weight),
            reason: format!(
                "{}: '{}' matches the thesis ({})",
                label,
                value.trim(),
                points_of(weight, weight)
            ),
        };
    }

    let reason = if value.trim().is_empty() {
        format!("{}: candidate has no {} ({})", label, noun, points_of(0.0, weight))
    } else {
        format!(
            "{}: '{}' is not among {} ({})",
            label,
            value.trim(),
            preferred.join(", "),
            points_of(0.0, weight)
        )
    };

    FactorScore { points: 0.0, reason }
}

/// Points in proportion to the share of the raise inside the check range
fn score_check_size(candidate: &Candidate, thesis: &InvestorThesis, weight: f64) -> FactorScore {
    let weight = weight.max(0.0);

    if thesis.is_check_size_unconstrained() {
        return FactorScore {
            points: round2(weight),
            reason: format!(
                "Check size: no check size preference, full credit ({})",
                points_of(weight, weight)
            ),
        };
    }

    let check = (thesis.check_size_min(), thesis.check_size_max());

    let Some(funding) = candidate.funding_requirement else {
        return FactorScore {
            points: 0.0,
            reason: format!(
                "Check size: candidate has no funding requirement ({})",
                points_of(0.0, weight)
            ),
        };
    };

    let raise = funding.bounds();
    let ratio = coverage_ratio(raise, check);
    let points = round2((weight * ratio).clamp(0.0, weight));

    FactorScore {
        points,
        reason: format!(
            "Check size: {:.0}% of the {}-{} raise fits the {}-{} check range ({})",
            ratio * 100.0,
            raise.0,
            raise.1,
            check.0,
            check.1,
            points_of(points, weight)
        ),
    }
}

/// Points in proportion to the share of thesis keywords found in the candidate text
fn score_keywords(keywords: &[String], text: &SearchText, weight: f64) -> FactorScore {
    let weight = weight.max(0.0);

    if keywords.is_empty() {
        return FactorScore {
            points: round2(weight),
            reason: format!(
                "Keywords: no keyword preference, full credit ({})",
                points_of(weight, weight)
            ),
        };
    }

    let matched = matched_keywords(keywords, text);
    let ratio = matched.len() as f64 / keywords.len() as f64;
    let points = round2((weight * ratio).clamp(0.0, weight));

    let reason = if matched.is_empty() {
        format!(
            "Keywords: matched 0 of {} ({})",
            keywords.len(),
            points_of(points, weight)
        )
    } else {
        format!(
            "Keywords: matched {} of {} ({}) ({})",
            matched.len(),
            keywords.len(),
            matched.join(", "),
            points_of(points, weight)
        )
    };

    FactorScore { points, reason }
}

#[inline]
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[inline]
fn points_of(points: f64, weight: f64) -> String {
    format!("{:.2}/{:.2}", points, weight)
}
