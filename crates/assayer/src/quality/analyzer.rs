//! Quality analyzer: completeness, accuracy and consistency scoring.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::clock::{Clock, SystemClock};
use crate::config::QualityConfig;
use crate::dataset::{as_number, is_missing, is_missing_opt, stringify, Dataset};

use super::column::{ColumnClassifier, ColumnProfile};
use super::enhancer::SummaryEnhancer;
use super::issue::{IssueCategory, QualityIssue, QualityReport, Severity};

const NON_NUMERIC_PENALTY: f64 = 5.0;
const NEGATIVE_PENALTY: f64 = 3.0;
const FUTURE_YEAR_PENALTY: f64 = 2.0;
const ROW_SHAPE_PENALTY: f64 = 10.0;
const DUPLICATE_ID_PENALTY: f64 = 15.0;

/// Scores a dataset and lists its quality issues.
pub struct QualityAnalyzer {
    config: QualityConfig,
    classifier: ColumnClassifier,
    clock: Arc<dyn Clock>,
    enhancer: Option<Arc<dyn SummaryEnhancer>>,
}

impl QualityAnalyzer {
    /// Create an analyzer with default heuristics and the system clock.
    pub fn new() -> Self {
        Self::with_config(QualityConfig::default())
    }

    /// Create an analyzer with custom heuristics.
    pub fn with_config(config: QualityConfig) -> Self {
        let classifier = ColumnClassifier::new(&config);
        Self {
            config,
            classifier,
            clock: Arc::new(SystemClock),
            enhancer: None,
        }
    }

    /// Use a specific clock for the future-year check.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Add a summary enhancer.
    pub fn with_enhancer(mut self, enhancer: Arc<dyn SummaryEnhancer>) -> Self {
        self.enhancer = Some(enhancer);
        self
    }

    /// Analyze a dataset.
    pub fn analyze(&self, name: &str, dataset_type: &str, dataset: &Dataset) -> QualityReport {
        if dataset.row_count() == 0 {
            return empty_report(
                name,
                dataset_type,
                "no data rows provided",
                IssueCategory::Completeness,
            );
        }
        if dataset.column_count() == 0 {
            return empty_report(
                name,
                dataset_type,
                "no columns provided",
                IssueCategory::Consistency,
            );
        }

        let mut scan = Scan::default();

        self.check_row_shapes(dataset, &mut scan);
        self.scan_columns(dataset, &mut scan);
        self.check_duplicate_ids(dataset, &mut scan);

        let total_fields = dataset.row_count() * dataset.column_count();
        let missing_pct = scan.missing_count as f64 / total_fields as f64 * 100.0;
        self.check_aggregate_completeness(missing_pct, &mut scan);

        let completeness = clamp_score(100.0 - missing_pct);
        let accuracy = clamp_score(scan.accuracy);
        let consistency = clamp_score(scan.consistency);

        let scores = Scores {
            completeness,
            accuracy,
            consistency,
        };
        let summary = summarize(name, dataset_type, dataset, &scan.issues, &scores);

        let mut report = QualityReport {
            dataset_name: name.to_string(),
            dataset_type: dataset_type.to_string(),
            total_issues: scan.issues.len(),
            completeness,
            accuracy,
            consistency,
            issues: scan.issues,
            summary,
            ai_recommendations: None,
        };

        if let Some(ref enhancer) = self.enhancer {
            match enhancer.enhance(&report, dataset) {
                Ok(enhanced) => {
                    if !enhanced.summary.is_empty() {
                        report.summary = enhanced.summary;
                    }
                    report.ai_recommendations = Some(enhanced.recommendations);
                }
                Err(e) => {
                    tracing::warn!(dataset = name, error = %e, "summary enhancement failed");
                }
            }
        }

        tracing::debug!(
            dataset = name,
            issues = report.total_issues,
            completeness = report.completeness,
            accuracy = report.accuracy,
            consistency = report.consistency,
            "quality analysis complete"
        );

        report
    }

    /// Analyze raw JSON, returning a zeroed report if it is not a dataset.
    pub fn analyze_value(&self, name: &str, dataset_type: &str, value: &Value) -> QualityReport {
        match Dataset::from_value(value) {
            Ok(dataset) => self.analyze(name, dataset_type, &dataset),
            Err(e) => {
                tracing::warn!(dataset = name, error = %e, "rejected malformed dataset");
                empty_report(name, dataset_type, &e.to_string(), IssueCategory::Consistency)
            }
        }
    }

    fn check_row_shapes(&self, dataset: &Dataset, scan: &mut Scan) {
        for shape in dataset.check_shape() {
            scan.consistency -= ROW_SHAPE_PENALTY;
            scan.issues.push(
                QualityIssue::new(
                    IssueCategory::Consistency,
                    Severity::High,
                    "all",
                    format!(
                        "row {} has {} cells, expected {}",
                        shape.row + 1,
                        shape.actual,
                        shape.expected
                    ),
                )
                .with_recommendation(format!(
                    "Re-export the source so every row has {} cells",
                    shape.expected
                )),
            );
        }
    }

    fn scan_columns(&self, dataset: &Dataset, scan: &mut Scan) {
        let current_year = self.clock.current_year();
        let row_count = dataset.row_count();

        for (col_idx, column) in dataset.columns.iter().enumerate() {
            let profile = self.classifier.profile(column);
            let mut missing_in_column = 0;

            for (row_idx, row) in dataset.rows.iter().enumerate() {
                let cell = row.get(col_idx);
                if is_missing_opt(cell) {
                    missing_in_column += 1;
                    continue;
                }
                let Some(value) = cell else { continue };

                self.check_value(column, &profile, value, row_idx, current_year, scan);
            }

            if missing_in_column > 0 {
                scan.missing_count += missing_in_column;
                scan.fields_with_missing += 1;
                scan.issues.push(
                    QualityIssue::new(
                        IssueCategory::Completeness,
                        Severity::Medium,
                        column,
                        format!("missing value in {} of {} rows", missing_in_column, row_count),
                    )
                    .with_recommendation("Add validation for completeness"),
                );
            }
        }
    }

    fn check_value(
        &self,
        column: &str,
        profile: &ColumnProfile,
        value: &Value,
        row_idx: usize,
        current_year: i32,
        scan: &mut Scan,
    ) {
        let row = row_idx + 1;

        if profile.numeric {
            match as_number(value) {
                None => {
                    scan.accuracy -= NON_NUMERIC_PENALTY;
                    scan.issues.push(
                        QualityIssue::new(
                            IssueCategory::Accuracy,
                            Severity::High,
                            column,
                            format!("non-numeric value '{}' in row {}", stringify(value), row),
                        )
                        .with_recommendation("Convert to a number or replace with a default"),
                    );
                }
                Some(n) if n < 0.0 => {
                    scan.accuracy -= NEGATIVE_PENALTY;
                    scan.issues.push(
                        QualityIssue::new(
                            IssueCategory::Accuracy,
                            Severity::Medium,
                            column,
                            format!("negative value {} in row {}", stringify(value), row),
                        )
                        .with_recommendation("Use the absolute value or review the source record"),
                    );
                }
                Some(_) => {}
            }
        }

        // Any number counts here, not just four-digit years
        if profile.year {
            if let Some(year) = as_number(value) {
                if year > current_year as f64 {
                    scan.accuracy -= FUTURE_YEAR_PENALTY;
                    scan.issues.push(
                        QualityIssue::new(
                            IssueCategory::Accuracy,
                            Severity::Medium,
                            column,
                            format!(
                                "future year {} in row {} (current year {})",
                                stringify(value),
                                row,
                                current_year
                            ),
                        )
                        .with_recommendation("Cap years at the current year"),
                    );
                }
            }
        }
    }

    fn check_duplicate_ids(&self, dataset: &Dataset, scan: &mut Scan) {
        let Some(id_idx) = dataset
            .columns
            .iter()
            .position(|c| self.classifier.profile(c).identifier)
        else {
            return;
        };

        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for value in dataset.column_values(id_idx) {
            if is_missing(value) {
                continue;
            }
            *counts.entry(stringify(value)).or_insert(0) += 1;
        }

        let duplicated: Vec<&str> = counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(value, _)| value.as_str())
            .collect();

        if duplicated.is_empty() {
            return;
        }

        scan.consistency -= DUPLICATE_ID_PENALTY;
        let examples: Vec<&str> = duplicated.iter().take(5).copied().collect();
        scan.issues.push(
            QualityIssue::new(
                IssueCategory::Consistency,
                Severity::High,
                &dataset.columns[id_idx],
                format!(
                    "found {} duplicate ID values: {}",
                    duplicated.len(),
                    examples.join(", ")
                ),
            )
            .with_recommendation("Make identifiers unique"),
        );
    }

    fn check_aggregate_completeness(&self, missing_pct: f64, scan: &mut Scan) {
        if missing_pct <= self.config.missing_threshold_pct || scan.fields_with_missing < 2 {
            return;
        }

        let severity = if missing_pct > self.config.high_threshold_pct {
            Severity::High
        } else if missing_pct > self.config.medium_threshold_pct {
            Severity::Medium
        } else {
            Severity::Low
        };

        scan.issues.push(
            QualityIssue::new(
                IssueCategory::Completeness,
                severity,
                "multiple",
                format!(
                    "{:.1}% of values are missing across {} fields",
                    missing_pct, scan.fields_with_missing
                ),
            )
            .with_recommendation("Fill or drop incomplete records before use"),
        );
    }
}

impl Default for QualityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Running state of one analysis pass.
struct Scan {
    issues: Vec<QualityIssue>,
    missing_count: usize,
    fields_with_missing: usize,
    accuracy: f64,
    consistency: f64,
}

impl Default for Scan {
    fn default() -> Self {
        Self {
            issues: Vec::new(),
            missing_count: 0,
            fields_with_missing: 0,
            accuracy: 100.0,
            consistency: 100.0,
        }
    }
}

fn clamp_score(score: f64) -> u8 {
    score.clamp(0.0, 100.0).round() as u8
}

fn empty_report(
    name: &str,
    dataset_type: &str,
    message: &str,
    category: IssueCategory,
) -> QualityReport {
    let issue = QualityIssue::new(category, Severity::High, "all", message)
        .with_recommendation("Provide a dataset with at least one column and one row");

    QualityReport {
        dataset_name: name.to_string(),
        dataset_type: dataset_type.to_string(),
        total_issues: 1,
        completeness: 0,
        accuracy: 0,
        consistency: 0,
        issues: vec![issue],
        summary: format!("{} ({}): {}.", name, dataset_type, message),
        ai_recommendations: None,
    }
}

/// Final rounded scores, as they appear in the summary.
struct Scores {
    completeness: u8,
    accuracy: u8,
    consistency: u8,
}

/// Build the templated summary, naming the dominant issue category.
fn summarize(
    name: &str,
    dataset_type: &str,
    dataset: &Dataset,
    issues: &[QualityIssue],
    scores: &Scores,
) -> String {
    if issues.is_empty() {
        return format!(
            "{} ({}): no quality issues found across {} rows and {} columns.",
            name,
            dataset_type,
            dataset.row_count(),
            dataset.column_count()
        );
    }

    let mut dominant = (IssueCategory::Completeness, 0usize);
    for category in [
        IssueCategory::Completeness,
        IssueCategory::Accuracy,
        IssueCategory::Consistency,
    ] {
        let count = issues.iter().filter(|i| i.category == category).count();
        if count > dominant.1 {
            dominant = (category, count);
        }
    }

    format!(
        "{} ({}): {} issue(s) found, mostly {} ({}). \
         Completeness {}%, accuracy {}%, consistency {}%.",
        name,
        dataset_type,
        issues.len(),
        dominant.0.label(),
        dominant.1,
        scores.completeness,
        scores.accuracy,
        scores.consistency
    )
}
