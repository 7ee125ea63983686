use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::core::thesis::optional_amount;

/// An investor's funding preferences, always held in normalized form.
///
/// Fields are private: the only ways to obtain a thesis are
/// [`ThesisManager`](crate::core::ThesisManager) and serde, which routes through
/// the same normalization. Every set is trimmed and deduplicated
/// case-insensitively, both check-size bounds are finite and non-negative, and
/// `check_size_min <= check_size_max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub struct InvestorThesis {
    sectors: Vec<String>,
    stages: Vec<String>,
    check_size_min: f64,
    check_size_max: f64,
    geographies: Vec<String>,
    keywords: Vec<String>,
    excluded_keywords: Vec<String>,
}

impl InvestorThesis {
    /// Callers must uphold the normalization invariants listed on the type.
    pub(crate) fn from_normalized_parts(
        sectors: Vec<String>,
        stages: Vec<String>,
        check_size_min: f64,
        check_size_max: f64,
        geographies: Vec<String>,
        keywords: Vec<String>,
        excluded_keywords: Vec<String>,
    ) -> Self {
        Self {
            sectors,
            stages,
            check_size_min,
            check_size_max,
            geographies,
            keywords,
            excluded_keywords,
        }
    }

    pub fn sectors(&self) -> &[String] {
        &self.sectors
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    pub fn check_size_min(&self) -> f64 {
        self.check_size_min
    }

    pub fn check_size_max(&self) -> f64 {
        self.check_size_max
    }

    pub fn geographies(&self) -> &[String] {
        &self.geographies
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn excluded_keywords(&self) -> &[String] {
        &self.excluded_keywords
    }

    /// Both bounds zero means the investor has no check-size preference
    pub fn is_check_size_unconstrained(&self) -> bool {
        self.check_size_min == 0.0 && self.check_size_max == 0.0
    }
}

/// Amount range a candidate is raising
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FundingRange {
    pub min: f64,
    pub max: f64,
}

impl FundingRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Read a raise from loosely typed input
    ///
    /// Accepts `{min, max}`, a `[min, max]` pair or a single amount. Bounds may
    /// be numbers or numeric strings; `null`, blank or unusable bounds are
    /// absent. One bound present gives a single-point raise, none gives `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let (min, max) = match value {
            Value::Object(range) => (
                optional_amount(range.get("min")),
                optional_amount(range.get("max")),
            ),
            Value::Array(pair) if pair.len() == 2 => {
                (optional_amount(pair.first()), optional_amount(pair.get(1)))
            }
            Value::Array(_) => return None,
            single => {
                let amount = optional_amount(Some(single));
                (amount, amount)
            }
        };

        match (min, max) {
            (Some(min), Some(max)) => Some(Self::new(min, max)),
            (Some(point), None) | (None, Some(point)) => Some(Self::new(point, point)),
            (None, None) => None,
        }
    }

    /// Bounds in ascending order, tolerating a reversed range
    pub fn bounds(&self) -> (f64, f64) {
        if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        }
    }
}

/// Lead/startup record evaluated against a thesis
///
/// All scoring fields are optional. A missing string behaves as an empty
/// string and matches nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(
        rename = "fundingRequirement",
        alias = "funding_requirement",
        default,
        deserialize_with = "deserialize_funding"
    )]
    pub funding_requirement: Option<FundingRange>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "createdAt", alias = "created_at", default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn deserialize_funding<'de, D>(deserializer: D) -> Result<Option<FundingRange>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(FundingRange::from_value))
}

impl Candidate {
    pub fn sector(&self) -> &str {
        self.sector.as_deref().unwrap_or("")
    }

    pub fn stage(&self) -> &str {
        self.stage.as_deref().unwrap_or("")
    }

    pub fn location(&self) -> &str {
        self.location.as_deref().unwrap_or("")
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// Per-factor contributions, serialized in fixed declaration order
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchFactors {
    pub sector: f64,
    pub stage: f64,
    #[serde(rename = "checkSize")]
    pub check_size: f64,
    pub geography: f64,
    pub keywords: f64,
    /// Zero unless disqualified, in which case it cancels the other five
    pub exclusion: f64,
}

impl MatchFactors {
    pub fn total(&self) -> f64 {
        self.sector + self.stage + self.check_size + self.geography + self.keywords + self.exclusion
    }
}

/// Outcome of scoring one candidate against one thesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    #[serde(rename = "investorId")]
    pub investor_id: String,
    pub score: f64,
    pub factors: MatchFactors,
    pub reasoning: Vec<String>,
    pub disqualified: bool,
    #[serde(rename = "computedAt")]
    pub computed_at: DateTime<Utc>,
}

/// Errors for a weight table that cannot keep scores inside [0, 100]
#[derive(Debug, Error, PartialEq)]
pub enum WeightsError {
    #[error("weight for {factor} must be non-negative, got {value}")]
    Negative { factor: &'static str, value: f64 },

    #[error("weights must sum to 100, got {total}")]
    BadTotal { total: f64 },
}

/// Maximum points each factor can contribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub sector: f64,
    pub stage: f64,
    pub check_size: f64,
    pub geography: f64,
    pub keywords: f64,
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.sector + self.stage + self.check_size + self.geography + self.keywords
    }

    pub fn validate(&self) -> Result<(), WeightsError> {
        let named = [
            ("sector", self.sector),
            ("stage", self.stage),
            ("check_size", self.check_size),
            ("geography", self.geography),
            ("keywords", self.keywords),
        ];
        for (factor, value) in named {
            if value.is_nan() || value < 0.0 {
                return Err(WeightsError::Negative { factor, value });
            }
        }

        let total = self.sum();
        if (total - 100.0).abs() > 1e-6 {
            return Err(WeightsError::BadTotal { total });
        }

        Ok(())
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            sector: 30.0,
            stage: 20.0,
            check_size: 25.0,
            geography: 10.0,
            keywords: 15.0,
        }
    }
}
