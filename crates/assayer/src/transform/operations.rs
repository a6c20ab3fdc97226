//! Field-level transformation operations.
//!
//! Cell operations map one source value to one target value. Deduplication
//! needs the whole column and quality scoring needs the whole row, so those
//! run through their own drivers.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::clock::{Clock, DATE_FORMAT};
use crate::dataset::{as_number, as_year, is_missing, number_value, stringify, Dataset};
use crate::error::{AssayerError, Result};
use crate::quality::{ColumnClassifier, ColumnProfile};
use crate::rule::{
    DeduplicateConfig, InvalidDateAction, NumberOperation, QualityFactor, QualityScoreConfig,
    StandardizeConfig, TextCase, Transformation, ValidationAction, ValidationConfig,
    ValidationType, CURRENT_DATE, INDEX_PLACEHOLDER,
};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Result of transforming one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellOutcome {
    /// Value to write into the target cell.
    pub value: Value,
    /// Whether the write counts as a transformation.
    pub changed: bool,
}

impl CellOutcome {
    fn changed(value: Value) -> Self {
        Self {
            value,
            changed: true,
        }
    }

    fn copied(value: &Value) -> Self {
        Self {
            value: value.clone(),
            changed: false,
        }
    }
}

/// Counts produced by running an operation over a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationCounts {
    /// Cells that were transformed.
    pub transformed: usize,
    /// Cells the operation could not interpret (left unchanged).
    pub failed: usize,
}

/// A cell-level operation with its settings resolved for one run.
#[derive(Debug, Clone)]
pub enum CellOperation {
    Fill { default: Value },
    Validate(ValidationConfig),
    Number(NumberOperation),
    Date { max: NaiveDate, action: InvalidDateAction },
    Standardize(TextStandardizer),
}

impl CellOperation {
    /// Resolve a transformation into a cell operation.
    ///
    /// Returns `None` for transformations that are not cell-level.
    pub fn prepare(transformation: &Transformation, clock: &dyn Clock) -> Result<Option<Self>> {
        let op = match transformation {
            Transformation::FillMissingValues(config) => {
                let default = match &config.default_value {
                    Value::String(s) if s == CURRENT_DATE => Value::String(clock.today_string()),
                    other => other.clone(),
                };
                CellOperation::Fill { default }
            }
            Transformation::Validation(config) => CellOperation::Validate(config.clone()),
            Transformation::NumberTransform(config) => CellOperation::Number(config.operation),
            Transformation::DateValidation(config) => {
                let max = if config.max_date == CURRENT_DATE {
                    clock.today()
                } else {
                    NaiveDate::parse_from_str(config.max_date.trim(), DATE_FORMAT).map_err(|e| {
                        AssayerError::Validation(format!(
                            "invalid maxDate '{}': {}",
                            config.max_date, e
                        ))
                    })?
                };
                CellOperation::Date {
                    max,
                    action: config.invalid_action,
                }
            }
            Transformation::StandardizeText(config) => {
                CellOperation::Standardize(TextStandardizer::new(config)?)
            }
            _ => return Ok(None),
        };
        Ok(Some(op))
    }

    /// Transform one value.
    ///
    /// Fails only when the value cannot be interpreted by the operation.
    pub fn apply(&self, value: &Value) -> Result<CellOutcome> {
        match self {
            CellOperation::Fill { default } => Ok(fill_missing(value, default)),
            CellOperation::Validate(config) => Ok(validate(value, config)),
            CellOperation::Number(op) => number_transform(value, *op),
            CellOperation::Date { max, action } => Ok(validate_date(value, *max, *action)),
            CellOperation::Standardize(standardizer) => Ok(standardizer.apply(value)),
        }
    }
}

/// Write the default into missing cells; copy everything else.
fn fill_missing(value: &Value, default: &Value) -> CellOutcome {
    if is_missing(value) {
        CellOutcome::changed(default.clone())
    } else {
        CellOutcome::copied(value)
    }
}

/// Check a value parses as a number.
fn validate(value: &Value, config: &ValidationConfig) -> CellOutcome {
    match as_number(value) {
        // Numeric rewrites are canonical forms only; integer truncation counts.
        Some(n) => match config.validation_type {
            ValidationType::Numeric => CellOutcome {
                value: number_value(n),
                changed: false,
            },
            ValidationType::Integer => CellOutcome {
                value: number_value(n.trunc()),
                changed: n.trunc() != n,
            },
        },
        None => match config.action {
            ValidationAction::Convert => CellOutcome::changed(config.fallback_value.clone()),
            ValidationAction::Keep => CellOutcome::copied(value),
        },
    }
}

/// Apply arithmetic; counted only when the number changes.
fn number_transform(value: &Value, op: NumberOperation) -> Result<CellOutcome> {
    if is_missing(value) {
        return Ok(CellOutcome::copied(value));
    }
    let n = as_number(value).ok_or_else(|| {
        AssayerError::Validation(format!("'{}' is not a number", stringify(value)))
    })?;
    let result = op.apply(n);
    Ok(CellOutcome {
        value: number_value(result),
        changed: result != n,
    })
}

/// Cap years and ISO dates at the maximum date.
fn validate_date(value: &Value, max: NaiveDate, action: InvalidDateAction) -> CellOutcome {
    if is_missing(value) || action == InvalidDateAction::Keep {
        return CellOutcome::copied(value);
    }

    if let Some(year) = as_year(value) {
        if year > max.year() {
            return match action {
                InvalidDateAction::SetToMax => CellOutcome::changed(Value::from(max.year())),
                _ => CellOutcome::changed(Value::Null),
            };
        }
        return CellOutcome::copied(value);
    }

    if let Some(date) = value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok())
    {
        if date > max {
            return match action {
                InvalidDateAction::SetToMax => {
                    CellOutcome::changed(Value::String(max.format(DATE_FORMAT).to_string()))
                }
                _ => CellOutcome::changed(Value::Null),
            };
        }
    }

    CellOutcome::copied(value)
}

/// Text cleanup with precompiled word replacements.
#[derive(Debug, Clone)]
pub struct TextStandardizer {
    trim: bool,
    collapse_whitespace: bool,
    case: TextCase,
    replacements: Vec<(Regex, String)>,
}

impl TextStandardizer {
    /// Compile a standardizer from its settings.
    pub fn new(config: &StandardizeConfig) -> Result<Self> {
        let mut replacements = Vec::with_capacity(config.replacements.len());
        for (from, to) in &config.replacements {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(from));
            let re = Regex::new(&pattern).map_err(|e| {
                AssayerError::Validation(format!("invalid replacement '{}': {}", from, e))
            })?;
            replacements.push((re, to.clone()));
        }

        Ok(Self {
            trim: config.trim,
            collapse_whitespace: config.collapse_whitespace,
            case: config.case,
            replacements,
        })
    }

    /// Standardize a string cell; other values are copied.
    pub fn apply(&self, value: &Value) -> CellOutcome {
        let Value::String(original) = value else {
            return CellOutcome::copied(value);
        };

        let mut text = if self.trim {
            original.trim().to_string()
        } else {
            original.clone()
        };

        if self.collapse_whitespace {
            text = WHITESPACE.replace_all(&text, " ").into_owned();
        }

        text = match self.case {
            TextCase::Preserve => text,
            TextCase::Upper => text.to_uppercase(),
            TextCase::Lower => text.to_lowercase(),
            TextCase::Title => title_case(&text),
        };

        for (re, to) in &self.replacements {
            text = re.replace_all(&text, to.as_str()).into_owned();
        }

        let changed = &text != original;
        CellOutcome {
            value: Value::String(text),
            changed,
        }
    }
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if !ch.is_alphanumeric() && ch != '\'' {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            out.extend(ch.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

/// Run a cell operation down a column, writing results into `target`.
pub fn apply_cells(
    rows: &mut [Vec<Value>],
    source: usize,
    target: usize,
    op: &CellOperation,
) -> OperationCounts {
    let mut counts = OperationCounts::default();

    for row in rows.iter_mut() {
        let value = row.get(source).cloned().unwrap_or(Value::Null);
        let outcome = match op.apply(&value) {
            Ok(outcome) => outcome,
            Err(_) => {
                counts.failed += 1;
                CellOutcome::copied(&value)
            }
        };

        if outcome.changed {
            counts.transformed += 1;
        }
        if let Some(cell) = row.get_mut(target) {
            *cell = outcome.value;
        }
    }

    counts
}

/// Suffix repeated values so each is unique.
///
/// The first occurrence of a value is left as is; later occurrences get the
/// suffix pattern with `${index}` replaced by their occurrence number
/// (2, 3, ...). Missing cells are never treated as duplicates.
pub fn deduplicate(
    rows: &mut [Vec<Value>],
    source: usize,
    target: usize,
    config: &DeduplicateConfig,
) -> OperationCounts {
    let mut totals: HashMap<String, usize> = HashMap::new();
    for row in rows.iter() {
        if let Some(value) = row.get(source).filter(|v| !is_missing(v)) {
            *totals.entry(stringify(value)).or_insert(0) += 1;
        }
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut counts = OperationCounts::default();

    for row in rows.iter_mut() {
        let value = row.get(source).cloned().unwrap_or(Value::Null);
        let mut output = value.clone();

        if !is_missing(&value) {
            let key = stringify(&value);
            let total = totals.get(&key).copied().unwrap_or(0);
            let occurrence = seen.entry(key.clone()).or_insert(0);
            *occurrence += 1;

            if total > 1 && *occurrence > 1 {
                let suffix = config
                    .suffix_pattern
                    .replace(INDEX_PLACEHOLDER, &occurrence.to_string());
                output = Value::String(format!("{}{}", key, suffix));
                counts.transformed += 1;
            }
        }

        if let Some(cell) = row.get_mut(target) {
            *cell = output;
        }
    }

    counts
}

/// Score one row from 0 to 100.
///
/// `exclude` removes a column (the score's own target) from the fractions.
pub fn row_score(
    profiles: &[ColumnProfile],
    row: &[Value],
    exclude: Option<usize>,
    config: &QualityScoreConfig,
    current_year: i32,
) -> i64 {
    let mut considered = 0usize;
    let mut missing = 0usize;
    let mut invalid = 0usize;

    for (idx, profile) in profiles.iter().enumerate() {
        if Some(idx) == exclude {
            continue;
        }
        considered += 1;
        match row.get(idx) {
            Some(value) if !is_missing(value) => {
                if profile.is_invalid(value, current_year) {
                    invalid += 1;
                }
            }
            _ => missing += 1,
        }
    }

    if considered == 0 {
        return 100;
    }

    let mut score = 100.0;
    if config.factors.contains(&QualityFactor::Completeness) {
        score -= missing as f64 / considered as f64 * 100.0 * config.weights.completeness;
    }
    if config.factors.contains(&QualityFactor::Validity) {
        score -= invalid as f64 / considered as f64 * 100.0 * config.weights.validity;
    }

    score.clamp(0.0, 100.0).round() as i64
}

/// Write a quality score for every row into `target`.
pub fn quality_score(
    data: &mut Dataset,
    target: usize,
    config: &QualityScoreConfig,
    classifier: &ColumnClassifier,
    current_year: i32,
) -> OperationCounts {
    let profiles = classifier.profiles(&data.columns);
    let mut counts = OperationCounts::default();

    for row in data.rows.iter_mut() {
        let score = row_score(&profiles, row, Some(target), config, current_year);
        if let Some(cell) = row.get_mut(target) {
            *cell = Value::from(score);
        }
        counts.transformed += 1;
    }

    counts
}
