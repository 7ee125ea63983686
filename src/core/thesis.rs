use std::borrow::Cow;
use std::collections::HashSet;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::InvestorThesis;

/// Largest integer an f64 holds exactly; whole amounts below it serialize as integers
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Errors raised while normalizing a thesis configuration
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("thesis configuration must be a JSON object")]
    NotAnObject,

    #[error("field `{field}` has the wrong type, expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field `{field}` is not a number: {value:?}")]
    NotANumber { field: &'static str, value: String },

    #[error("field `{field}` must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("field `{field}` must be finite")]
    NonFinite { field: &'static str },
}

/// Normalizes, validates, defaults and serializes investor theses
///
/// Raw configuration is loosely typed JSON as stored by the surrounding
/// service. Missing or `null` fields take their value from
/// [`ThesisManager::default_thesis`].
pub struct ThesisManager;

impl ThesisManager {
    /// A thesis with every dimension unconstrained
    pub fn default_thesis() -> InvestorThesis {
        InvestorThesis::from_normalized_parts(
            Vec::new(),
            Vec::new(),
            0.0,
            0.0,
            Vec::new(),
            Vec::new(),
            Vec::new(),
        )
    }

    /// Coerce a raw configuration object into a normalized thesis
    ///
    /// Set fields accept an array of strings or a single comma-separated
    /// string. Check-size fields accept numbers or numeric strings and may be
    /// given in compact form as `checkSize: [min, max]` or
    /// `checkSize: {"min": .., "max": ..}`. A reversed range is swapped.
    pub fn deserialize_thesis(raw: &Value) -> Result<InvestorThesis, ValidationError> {
        let obj = raw.as_object().ok_or(ValidationError::NotAnObject)?;

        let sectors = coerce_string_set("sectors", lookup(obj, &["sectors"]))?;
        let stages = coerce_string_set("stages", lookup(obj, &["stages"]))?;
        let geographies = coerce_string_set("geographies", lookup(obj, &["geographies"]))?;
        let keywords = coerce_string_set("keywords", lookup(obj, &["keywords"]))?;
        let excluded_keywords = coerce_string_set(
            "excludedKeywords",
            lookup(obj, &["excludedKeywords", "excluded_keywords"]),
        )?;

        let (min, max) = coerce_check_size(obj)?;
        let (check_size_min, check_size_max) = if min > max { (max, min) } else { (min, max) };

        Ok(InvestorThesis::from_normalized_parts(
            sectors,
            stages,
            check_size_min,
            check_size_max,
            geographies,
            keywords,
            excluded_keywords,
        ))
    }

    /// Project a thesis back to its configuration shape
    pub fn serialize_thesis(thesis: &InvestorThesis) -> Value {
        let mut obj = Map::new();
        obj.insert("sectors".into(), string_array(thesis.sectors()));
        obj.insert("stages".into(), string_array(thesis.stages()));
        obj.insert("checkSizeMin".into(), amount_value(thesis.check_size_min()));
        obj.insert("checkSizeMax".into(), amount_value(thesis.check_size_max()));
        obj.insert("geographies".into(), string_array(thesis.geographies()));
        obj.insert("keywords".into(), string_array(thesis.keywords()));
        obj.insert("excludedKeywords".into(), string_array(thesis.excluded_keywords()));
        Value::Object(obj)
    }
}

/// Normalize raw thesis configuration
pub fn normalize_thesis(raw: &Value) -> Result<InvestorThesis, ValidationError> {
    ThesisManager::deserialize_thesis(raw)
}

/// Inverse of [`normalize_thesis`]
pub fn denormalize_thesis(thesis: &InvestorThesis) -> Value {
    ThesisManager::serialize_thesis(thesis)
}

impl TryFrom<Value> for InvestorThesis {
    type Error = ValidationError;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        ThesisManager::deserialize_thesis(&raw)
    }
}

impl From<InvestorThesis> for Value {
    fn from(thesis: InvestorThesis) -> Self {
        ThesisManager::serialize_thesis(&thesis)
    }
}

/// A thesis supplied either as raw configuration or already normalized
#[derive(Debug, Clone, Copy)]
pub enum ThesisConfig<'a> {
    Raw(&'a Value),
    Normalized(&'a InvestorThesis),
}

impl<'a> ThesisConfig<'a> {
    /// Normalize raw input; normalized input is borrowed as-is
    pub fn normalize(self) -> Result<Cow<'a, InvestorThesis>, ValidationError> {
        match self {
            ThesisConfig::Raw(raw) => ThesisManager::deserialize_thesis(raw).map(Cow::Owned),
            ThesisConfig::Normalized(thesis) => Ok(Cow::Borrowed(thesis)),
        }
    }
}

impl<'a> From<&'a Value> for ThesisConfig<'a> {
    fn from(raw: &'a Value) -> Self {
        ThesisConfig::Raw(raw)
    }
}

impl<'a> From<&'a InvestorThesis> for ThesisConfig<'a> {
    fn from(thesis: &'a InvestorThesis) -> Self {
        ThesisConfig::Normalized(thesis)
    }
}

/// First non-null value among `keys`
fn lookup<'v>(obj: &'v Map<String, Value>, keys: &[&str]) -> Option<&'v Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

fn coerce_string_set(
    field: &'static str,
    value: Option<&Value>,
) -> Result<Vec<String>, ValidationError> {
    let wrong_type = ValidationError::WrongType {
        field,
        expected: "array of strings",
    };

    let raw: Vec<String> = match value {
        None => return Ok(Vec::new()),
        Some(Value::String(s)) => s.split(',').map(str::to_owned).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                Value::Bool(b) => Ok(b.to_string()),
                Value::Null => Ok(String::new()),
                _ => Err(wrong_type.clone()),
            })
            .collect::<Result<_, _>>()?,
        Some(_) => return Err(wrong_type),
    };

    Ok(dedupe_terms(raw))
}

/// Trim, drop empties and drop case-insensitive duplicates, keeping first occurrence order
fn dedupe_terms(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|term| term.trim().to_string())
        .filter(|term| !term.is_empty())
        .filter(|term| seen.insert(term.to_lowercase()))
        .collect()
}

fn coerce_check_size(obj: &Map<String, Value>) -> Result<(f64, f64), ValidationError> {
    let min = lookup(obj, &["checkSizeMin", "check_size_min"]);
    let max = lookup(obj, &["checkSizeMax", "check_size_max"]);

    if min.is_some() || max.is_some() {
        return Ok((
            coerce_amount("checkSizeMin", min)?,
            coerce_amount("checkSizeMax", max)?,
        ));
    }

    match lookup(obj, &["checkSize", "check_size"]) {
        None => Ok((0.0, 0.0)),
        Some(Value::Array(pair)) if pair.len() == 2 => Ok((
            coerce_amount("checkSizeMin", Some(&pair[0]))?,
            coerce_amount("checkSizeMax", Some(&pair[1]))?,
        )),
        Some(Value::Object(range)) => Ok((
            coerce_amount("checkSizeMin", lookup(range, &["min"]))?,
            coerce_amount("checkSizeMax", lookup(range, &["max"]))?,
        )),
        Some(_) => Err(ValidationError::WrongType {
            field: "checkSize",
            expected: "[min, max] pair or {min, max} object",
        }),
    }
}

fn coerce_amount(field: &'static str, value: Option<&Value>) -> Result<f64, ValidationError> {
    let amount = match value {
        None | Some(Value::Null) => return Ok(0.0),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| ValidationError::NotANumber {
            field,
            value: n.to_string(),
        })?,
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(0.0),
        Some(Value::String(s)) => parse_amount(s).ok_or_else(|| ValidationError::NotANumber {
            field,
            value: s.clone(),
        })?,
        Some(_) => {
            return Err(ValidationError::WrongType {
                field,
                expected: "number",
            })
        }
    };

    if !amount.is_finite() {
        return Err(ValidationError::NonFinite { field });
    }
    if amount < 0.0 {
        return Err(ValidationError::Negative { field, value: amount });
    }

    // -0.0 becomes 0.0
    Ok(amount + 0.0)
}

/// Candidate-side amount: `null`, blanks and unusable values count as absent
pub(crate) fn optional_amount(value: Option<&Value>) -> Option<f64> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(_) => coerce_amount("fundingRequirement", value).ok(),
    }
}

/// Parse "1,000,000" or "250_000" style amounts
fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    cleaned.parse().ok()
}

fn string_array(terms: &[String]) -> Value {
    Value::Array(terms.iter().cloned().map(Value::String).collect())
}

fn amount_value(amount: f64) -> Value {
    if amount.fract() == 0.0 && amount < MAX_EXACT_INTEGER {
        Value::from(amount as u64)
    } else {
        Value::from(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_thesis_is_unconstrained() {
        let thesis = ThesisManager::default_thesis();
        assert!(thesis.sectors().is_empty());
        assert!(thesis.stages().is_empty());
        assert!(thesis.geographies().is_empty());
        assert!(thesis.keywords().is_empty());
        assert!(thesis.excluded_keywords().is_empty());
        assert!(thesis.is_check_size_unconstrained());
    }

    #[test]
    fn test_empty_object_yields_default() {
        let thesis = ThesisManager::deserialize_thesis(&json!({})).unwrap();
        assert_eq!(thesis, ThesisManager::default_thesis());
    }

    #[test]
    fn test_non_object_rejected() {
        assert_eq!(
            ThesisManager::deserialize_thesis(&json!(["Fintech"])),
            Err(ValidationError::NotAnObject)
        );
        assert_eq!(
            ThesisManager::deserialize_thesis(&Value::Null),
            Err(ValidationError::NotAnObject)
        );
    }

    #[test]
    fn test_numeric_strings_coerced() {
        let thesis = ThesisManager::deserialize_thesis(&json!({
            "checkSizeMin": " 250,000 ",
            "checkSizeMax": "1_000_000"
        }))
        .unwrap();
        assert_eq!(thesis.check_size_min(), 250_000.0);
        assert_eq!(thesis.check_size_max(), 1_000_000.0);
    }

    #[test]
    fn test_non_numeric_check_size_rejected() {
        let err = ThesisManager::deserialize_thesis(&json!({"checkSizeMin": "lots"})).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotANumber {
                field: "checkSizeMin",
                value: "lots".to_string()
            }
        );

        let err = ThesisManager::deserialize_thesis(&json!({"checkSizeMax": true})).unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { field: "checkSizeMax", .. }));
    }

    #[test]
    fn test_negative_and_non_finite_rejected() {
        let err = ThesisManager::deserialize_thesis(&json!({"checkSizeMin": -10})).unwrap_err();
        assert!(matches!(err, ValidationError::Negative { field: "checkSizeMin", .. }));

        let err = ThesisManager::deserialize_thesis(&json!({"checkSizeMax": "inf"})).unwrap_err();
        assert_eq!(err, ValidationError::NonFinite { field: "checkSizeMax" });
    }

    #[test]
    fn test_reversed_range_is_swapped() {
        let thesis = ThesisManager::deserialize_thesis(&json!({
            "checkSizeMin": 1_000_000,
            "checkSizeMax": 200_000
        }))
        .unwrap();
        assert_eq!(thesis.check_size_min(), 200_000.0);
        assert_eq!(thesis.check_size_max(), 1_000_000.0);
    }

    #[test]
    fn test_compact_check_size_forms() {
        let pair = ThesisManager::deserialize_thesis(&json!({"checkSize": [200_000, 1_000_000]})).unwrap();
        let object = ThesisManager::deserialize_thesis(&json!({"checkSize": {"min": 200_000, "max": 1_000_000}})).unwrap();
        assert_eq!(pair, object);
        assert_eq!(pair.check_size_min(), 200_000.0);

        let err = ThesisManager::deserialize_thesis(&json!({"checkSize": 5})).unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { field: "checkSize", .. }));
    }

    #[test]
    fn test_sets_trimmed_and_deduplicated() {
        let thesis = ThesisManager::deserialize_thesis(&json!({
            "sectors": [" Fintech", "fintech", "", null, "Health"],
            "stages": "Seed, Series A ,seed",
            "keywords": ["AI", 42]
        }))
        .unwrap();
        assert_eq!(thesis.sectors(), ["Fintech", "Health"]);
        assert_eq!(thesis.stages(), ["Seed", "Series A"]);
        assert_eq!(thesis.keywords(), ["AI", "42"]);
    }

    #[test]
    fn test_wrong_set_shape_rejected() {
        let err = ThesisManager::deserialize_thesis(&json!({"sectors": {"a": 1}})).unwrap_err();
        assert_eq!(
            err,
            ValidationError::WrongType {
                field: "sectors",
                expected: "array of strings"
            }
        );

        let err = ThesisManager::deserialize_thesis(&json!({"geographies": [["US"]]})).unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { field: "geographies", .. }));
    }

    #[test]
    fn test_snake_case_aliases() {
        let thesis = ThesisManager::deserialize_thesis(&json!({
            "excluded_keywords": ["crypto"],
            "check_size_min": 10,
            "check_size_max": 20
        }))
        .unwrap();
        assert_eq!(thesis.excluded_keywords(), ["crypto"]);
        assert_eq!(thesis.check_size_max(), 20.0);
    }

    #[test]
    fn test_serialize_emits_whole_amounts_as_integers() {
        let thesis = ThesisManager::deserialize_thesis(&json!({"checkSize": [100, 250.5]})).unwrap();
        let value = ThesisManager::serialize_thesis(&thesis);
        assert_eq!(value["checkSizeMin"], json!(100));
        assert_eq!(value["checkSizeMax"], json!(250.5));
    }

    #[test]
    fn test_round_trip_of_normalized_config() {
        let config = json!({
            "sectors": ["Fintech"],
            "stages": ["Seed", "Series A"],
            "checkSizeMin": 200_000,
            "checkSizeMax": 1_000_000,
            "geographies": ["US"],
            "keywords": ["AI"],
            "excludedKeywords": []
        });
        let thesis = normalize_thesis(&config).unwrap();
        assert_eq!(denormalize_thesis(&thesis), config);
        assert_eq!(normalize_thesis(&denormalize_thesis(&thesis)).unwrap(), thesis);
    }

    #[test]
    fn test_serde_goes_through_normalization() {
        let thesis: InvestorThesis =
            serde_json::from_str(r#"{"sectors": "Fintech,fintech", "checkSizeMin": "5"}"#).unwrap();
        assert_eq!(thesis.sectors(), ["Fintech"]);
        assert_eq!(thesis.check_size_min(), 0.0);
        assert_eq!(thesis.check_size_max(), 5.0);

        assert!(serde_json::from_str::<InvestorThesis>(r#"{"checkSizeMin": "x"}"#).is_err());
    }

    #[test]
    fn test_thesis_config_borrows_normalized_input() {
        let thesis = ThesisManager::default_thesis();
        let normalized = ThesisConfig::from(&thesis).normalize().unwrap();
        assert!(matches!(normalized, Cow::Borrowed(_)));

        let raw = json!({"sectors": ["AI"]});
        let normalized = ThesisConfig::from(&raw).normalize().unwrap();
        assert!(matches!(normalized, Cow::Owned(_)));
    }
}
