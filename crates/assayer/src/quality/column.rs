//! Column classification from field names.

use chrono::{Datelike, NaiveDate};
use serde_json::Value;

use crate::config::QualityConfig;
use crate::dataset::{as_number, as_year, is_missing};

/// What the name of a column says about its values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnProfile {
    /// Holds amounts (value, price, area, ...).
    pub numeric: bool,
    /// Holds calendar years (and is not a date column).
    pub year: bool,
    /// Holds dates.
    pub date: bool,
    /// Is the identifier column.
    pub identifier: bool,
}

/// Classifies columns using the configured keywords.
#[derive(Debug, Clone)]
pub struct ColumnClassifier {
    numeric_keywords: Vec<String>,
    year_keyword: String,
    date_keyword: String,
    id_column: String,
}

impl ColumnClassifier {
    /// Create a classifier from quality settings.
    pub fn new(config: &QualityConfig) -> Self {
        Self {
            numeric_keywords: config
                .numeric_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            year_keyword: config.year_keyword.to_lowercase(),
            date_keyword: config.date_keyword.to_lowercase(),
            id_column: config.id_column.clone(),
        }
    }

    /// Classify a single column name.
    pub fn profile(&self, name: &str) -> ColumnProfile {
        let lower = name.to_lowercase();
        let date = !self.date_keyword.is_empty() && lower.contains(&self.date_keyword);
        ColumnProfile {
            numeric: self
                .numeric_keywords
                .iter()
                .any(|k| !k.is_empty() && lower.contains(k.as_str())),
            year: !date && !self.year_keyword.is_empty() && lower.contains(&self.year_keyword),
            date,
            identifier: name.eq_ignore_ascii_case(&self.id_column),
        }
    }

    /// Classify every column of a dataset.
    pub fn profiles(&self, columns: &[String]) -> Vec<ColumnProfile> {
        columns.iter().map(|c| self.profile(c)).collect()
    }
}

impl Default for ColumnClassifier {
    fn default() -> Self {
        Self::new(&QualityConfig::default())
    }
}

/// Extract a year from a numeric year or an ISO date string.
pub fn year_of(value: &Value) -> Option<i32> {
    if let Some(year) = as_year(value) {
        return Some(year);
    }
    let s = value.as_str()?.trim();
    NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}

impl ColumnProfile {
    /// Whether a non-missing value violates this column's expectations.
    ///
    /// Numeric columns reject non-numeric and negative values; year and date
    /// columns reject years after `current_year`.
    pub fn is_invalid(&self, value: &Value, current_year: i32) -> bool {
        if is_missing(value) {
            return false;
        }
        if self.numeric {
            match as_number(value) {
                None => return true,
                Some(n) if n < 0.0 => return true,
                Some(_) => {}
            }
        }
        if self.year {
            if let Some(year) = as_number(value) {
                return year > current_year as f64;
            }
        }
        if self.year || self.date {
            if let Some(year) = year_of(value) {
                return year > current_year;
            }
        }
        false
    }
}
