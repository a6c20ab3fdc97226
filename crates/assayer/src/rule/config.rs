//! Per-type transformation settings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel resolved to today's date when a rule runs.
pub const CURRENT_DATE: &str = "CURRENT_DATE";

/// Placeholder replaced with the running occurrence index in suffixes.
pub const INDEX_PLACEHOLDER: &str = "${index}";

/// Settings for `fillMissingValues`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillConfig {
    /// Value written into missing cells (`CURRENT_DATE` is resolved).
    #[serde(default = "default_fill_value")]
    pub default_value: Value,
}

impl FillConfig {
    pub fn new(default_value: impl Into<Value>) -> Self {
        Self {
            default_value: default_value.into(),
        }
    }
}

fn default_fill_value() -> Value {
    Value::String("N/A".to_string())
}

/// Kind of validation to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationType {
    /// Value must parse as a number.
    #[default]
    Numeric,
    /// Value must parse as a number; fractions are truncated.
    Integer,
}

/// What to do with a value that fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationAction {
    /// Replace with the fallback value.
    #[default]
    Convert,
    /// Leave the value as it is.
    Keep,
}

/// Settings for `validation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationConfig {
    #[serde(default)]
    pub validation_type: ValidationType,
    #[serde(default)]
    pub action: ValidationAction,
    #[serde(default = "default_fallback")]
    pub fallback_value: Value,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            validation_type: ValidationType::Numeric,
            action: ValidationAction::Convert,
            fallback_value: default_fallback(),
        }
    }
}

fn default_fallback() -> Value {
    Value::from(0)
}

/// Arithmetic applied by `numberTransform`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberOperation {
    Abs,
    Round,
    Floor,
    Ceil,
}

impl NumberOperation {
    /// Apply the operation.
    pub fn apply(&self, n: f64) -> f64 {
        match self {
            NumberOperation::Abs => n.abs(),
            NumberOperation::Round => n.round(),
            NumberOperation::Floor => n.floor(),
            NumberOperation::Ceil => n.ceil(),
        }
    }
}

/// Settings for `numberTransform`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberTransformConfig {
    pub operation: NumberOperation,
}

/// How repeated values are made unique.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DedupStrategy {
    /// Append a suffix built from the occurrence index.
    #[default]
    AddSuffix,
}

/// Settings for `deduplicate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeduplicateConfig {
    #[serde(default)]
    pub strategy: DedupStrategy,
    #[serde(default = "default_suffix_pattern")]
    pub suffix_pattern: String,
}

impl Default for DeduplicateConfig {
    fn default() -> Self {
        Self {
            strategy: DedupStrategy::AddSuffix,
            suffix_pattern: default_suffix_pattern(),
        }
    }
}

fn default_suffix_pattern() -> String {
    format!("_{}", INDEX_PLACEHOLDER)
}

/// What to do with a date or year past the maximum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvalidDateAction {
    /// Replace with the maximum.
    #[default]
    SetToMax,
    /// Replace with null.
    SetNull,
    /// Leave the value as it is.
    Keep,
}

/// Settings for `dateValidation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateValidationConfig {
    /// `CURRENT_DATE` or a `YYYY-MM-DD` date.
    #[serde(default = "default_max_date")]
    pub max_date: String,
    #[serde(default)]
    pub invalid_action: InvalidDateAction,
}

impl Default for DateValidationConfig {
    fn default() -> Self {
        Self {
            max_date: default_max_date(),
            invalid_action: InvalidDateAction::SetToMax,
        }
    }
}

fn default_max_date() -> String {
    CURRENT_DATE.to_string()
}

/// A component of the per-row quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityFactor {
    Completeness,
    Validity,
}

/// Weight of each factor's penalty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityWeights {
    pub completeness: f64,
    pub validity: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            completeness: 1.0,
            validity: 1.0,
        }
    }
}

/// Settings for `qualityScore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityScoreConfig {
    #[serde(default = "default_factors")]
    pub factors: Vec<QualityFactor>,
    #[serde(default)]
    pub weights: QualityWeights,
}

impl Default for QualityScoreConfig {
    fn default() -> Self {
        Self {
            factors: default_factors(),
            weights: QualityWeights::default(),
        }
    }
}

fn default_factors() -> Vec<QualityFactor> {
    vec![QualityFactor::Completeness, QualityFactor::Validity]
}

/// Letter case applied by `standardizeText`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextCase {
    #[default]
    Preserve,
    Upper,
    Lower,
    Title,
}

/// Settings for `standardizeText`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardizeConfig {
    #[serde(default = "enabled")]
    pub trim: bool,
    #[serde(default = "enabled")]
    pub collapse_whitespace: bool,
    #[serde(default)]
    pub case: TextCase,
    /// Whole-word replacements, matched case-insensitively.
    #[serde(default)]
    pub replacements: IndexMap<String, String>,
}

impl Default for StandardizeConfig {
    fn default() -> Self {
        Self {
            trim: true,
            collapse_whitespace: true,
            case: TextCase::Preserve,
            replacements: IndexMap::new(),
        }
    }
}

fn enabled() -> bool {
    true
}
