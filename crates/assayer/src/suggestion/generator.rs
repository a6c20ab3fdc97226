//! Rule suggestions derived from quality issues.
//!
//! Each issue description is matched against a small set of patterns, and
//! every (field, pattern) pair yields at most one rule. Two templates are
//! appended afterwards: address standardization and the per-row quality
//! score.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::config::{QualityConfig, SuggestionConfig};
use crate::quality::{ColumnClassifier, QualityIssue};
use crate::rule::{
    DateValidationConfig, DeduplicateConfig, FillConfig, NumberOperation, NumberTransformConfig,
    QualityScoreConfig, StandardizeConfig, TextCase, Transformation, TransformationRule,
    ValidationConfig, CURRENT_DATE, WILDCARD,
};

static MISSING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)missing value").expect("valid regex"));
static NON_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)non-numeric|not a number").expect("valid regex"));
static NEGATIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)negative value").expect("valid regex"));
static DUPLICATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)duplicate").expect("valid regex"));
static BAD_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)future|invalid date").expect("valid regex"));

/// Street suffixes abbreviated by the address template.
const STREET_SUFFIXES: &[(&str, &str)] = &[
    ("Street", "St"),
    ("Avenue", "Ave"),
    ("Road", "Rd"),
    ("Boulevard", "Blvd"),
    ("Drive", "Dr"),
    ("Lane", "Ln"),
    ("Court", "Ct"),
    ("Place", "Pl"),
    ("Terrace", "Ter"),
    ("Parkway", "Pkwy"),
];

/// Kind of problem an issue description points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssuePattern {
    Missing,
    NonNumeric,
    Negative,
    Duplicate,
    InvalidDate,
}

impl IssuePattern {
    /// Match an issue description, first pattern wins.
    pub fn detect(text: &str) -> Option<Self> {
        if MISSING.is_match(text) {
            Some(IssuePattern::Missing)
        } else if NON_NUMERIC.is_match(text) {
            Some(IssuePattern::NonNumeric)
        } else if NEGATIVE.is_match(text) {
            Some(IssuePattern::Negative)
        } else if DUPLICATE.is_match(text) {
            Some(IssuePattern::Duplicate)
        } else if BAD_DATE.is_match(text) {
            Some(IssuePattern::InvalidDate)
        } else {
            None
        }
    }
}

/// Generates transformation rules from quality issues.
pub struct SuggestionEngine {
    config: SuggestionConfig,
    classifier: ColumnClassifier,
    clock: Arc<dyn Clock>,
}

impl SuggestionEngine {
    /// Create an engine with default settings and the system clock.
    pub fn new() -> Self {
        Self {
            config: SuggestionConfig::default(),
            classifier: ColumnClassifier::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Use custom suggestion settings.
    pub fn with_config(mut self, config: SuggestionConfig) -> Self {
        self.config = config;
        self
    }

    /// Use custom column heuristics for fill defaults.
    pub fn with_quality_config(mut self, config: &QualityConfig) -> Self {
        self.classifier = ColumnClassifier::new(config);
        self
    }

    /// Use a specific clock for the year fill default.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Suggest rules for a list of issues.
    pub fn suggest(&self, issues: &[QualityIssue]) -> Vec<TransformationRule> {
        let mut rules = Vec::new();
        let mut seen: HashSet<(String, IssuePattern)> = HashSet::new();
        let mut address_field: Option<String> = None;

        for issue in issues {
            if !issue.is_field_specific() {
                continue;
            }

            let is_address = issue.field.eq_ignore_ascii_case(&self.config.address_field);
            if address_field.is_none() && is_address {
                address_field = Some(issue.field.clone());
            }

            let Some(pattern) = IssuePattern::detect(&issue.issue) else {
                continue;
            };
            if !seen.insert((issue.field.clone(), pattern)) {
                continue;
            }

            rules.push(self.rule_for(&issue.field, pattern));
        }

        if let Some(field) = address_field {
            rules.push(self.address_rule(&field));
        }

        if !issues.is_empty() {
            rules.push(self.quality_score_rule());
        }

        debug!(issues = issues.len(), rules = rules.len(), "suggested rules");
        rules
    }

    fn rule_for(&self, field: &str, pattern: IssuePattern) -> TransformationRule {
        match pattern {
            IssuePattern::Missing => TransformationRule::new(
                format!("Fill missing {}", field),
                field,
                field,
                Transformation::FillMissingValues(FillConfig::new(self.fill_default(field))),
            )
            .with_description(format!("Fill missing values in {}", field)),

            IssuePattern::NonNumeric => TransformationRule::new(
                format!("Validate {}", field),
                field,
                field,
                Transformation::Validation(ValidationConfig::default()),
            )
            .with_description(format!("Convert non-numeric values in {} to 0", field)),

            IssuePattern::Negative => TransformationRule::new(
                format!("Absolute {}", field),
                field,
                field,
                Transformation::NumberTransform(NumberTransformConfig {
                    operation: NumberOperation::Abs,
                }),
            )
            .with_description(format!(
                "Replace negative values in {} with their absolute value",
                field
            )),

            IssuePattern::Duplicate => TransformationRule::new(
                format!("Deduplicate {}", field),
                field,
                field,
                Transformation::Deduplicate(DeduplicateConfig::default()),
            )
            .with_description(format!("Add suffixes to repeated values in {}", field)),

            IssuePattern::InvalidDate => TransformationRule::new(
                format!("Fix future dates in {}", field),
                field,
                field,
                Transformation::DateValidation(DateValidationConfig::default()),
            )
            .with_description(format!("Cap dates and years in {} at today", field)),
        }
    }

    /// Default written by a suggested fill rule.
    fn fill_default(&self, field: &str) -> Value {
        let profile = self.classifier.profile(field);
        if profile.date {
            Value::String(CURRENT_DATE.to_string())
        } else if profile.year {
            Value::from(self.clock.current_year())
        } else if profile.numeric {
            Value::from(0)
        } else {
            Value::String("N/A".to_string())
        }
    }

    fn address_rule(&self, field: &str) -> TransformationRule {
        let replacements: IndexMap<String, String> = STREET_SUFFIXES
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();

        TransformationRule::new(
            format!("Standardize {}", field),
            field,
            field,
            Transformation::StandardizeText(StandardizeConfig {
                trim: true,
                collapse_whitespace: true,
                case: TextCase::Title,
                replacements,
            }),
        )
        .with_description("Trim, title-case and abbreviate street suffixes")
    }

    fn quality_score_rule(&self) -> TransformationRule {
        TransformationRule::new(
            "Calculate quality score",
            WILDCARD,
            self.config.quality_score_field.clone(),
            Transformation::QualityScore(QualityScoreConfig::default()),
        )
        .with_description("Score each row from completeness and validity")
    }
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new()
    }
}
