//! Rule engine that applies an ordered rule list to a dataset.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::QualityConfig;
use crate::dataset::Dataset;
use crate::error::{AssayerError, Result};
use crate::quality::ColumnClassifier;
use crate::rule::{
    DeduplicateConfig, QualityScoreConfig, Transformation, TransformationRule, WILDCARD,
};

use super::operations::{self, CellOperation, OperationCounts};

/// Outcome of one rule in an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Skipped,
    Error,
}

/// One line of the execution log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionLogEntry {
    /// Rule name.
    pub rule: String,
    pub status: ExecutionStatus,
    pub message: String,
    /// Cells transformed (successful rules only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformed_count: Option<usize>,
}

impl ExecutionLogEntry {
    fn success(rule: &str, message: String, count: usize) -> Self {
        Self {
            rule: rule.to_string(),
            status: ExecutionStatus::Success,
            message,
            transformed_count: Some(count),
        }
    }

    fn skipped(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            status: ExecutionStatus::Skipped,
            message: message.into(),
            transformed_count: None,
        }
    }

    fn error(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            status: ExecutionStatus::Error,
            message: message.into(),
            transformed_count: None,
        }
    }
}

/// Per-rule statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleStats {
    pub cells_transformed: usize,
    /// Target fields with at least one transformed cell.
    pub fields_affected: IndexSet<String>,
}

/// Aggregate statistics for an execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationStats {
    pub total_transformations: usize,
    /// Keyed by rule name, in first-execution order.
    pub by_rule: IndexMap<String, RuleStats>,
}

impl TransformationStats {
    fn record(&mut self, rule: &TransformationRule, count: usize) {
        let stats = self.by_rule.entry(rule.name.clone()).or_default();
        stats.cells_transformed += count;
        if count > 0 {
            stats.fields_affected.insert(rule.target_field.clone());
        }
        self.total_transformations += count;
    }
}

/// Result of running a rule list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub transformed_data: Dataset,
    pub execution_log: Vec<ExecutionLogEntry>,
    pub transformation_stats: TransformationStats,
    /// Rows padded or truncated to the column count before the first rule.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub reshaped_rows: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl ExecutionResult {
    /// Number of rules that ended with the given status.
    pub fn count_status(&self, status: ExecutionStatus) -> usize {
        self.execution_log
            .iter()
            .filter(|e| e.status == status)
            .count()
    }

    /// Log entry for a rule, by name.
    pub fn entry(&self, rule: &str) -> Option<&ExecutionLogEntry> {
        self.execution_log.iter().find(|e| e.rule == rule)
    }
}

/// Where a rule reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    /// One source column.
    Cell(usize),
    /// The whole row.
    Row,
}

/// A rule resolved into something runnable.
pub(crate) enum Plan<'r> {
    Cells(CellOperation),
    Deduplicate(&'r DeduplicateConfig),
    Score(&'r QualityScoreConfig),
}

/// Applies transformation rules in order to a copy of a dataset.
pub struct RuleEngine {
    clock: Arc<dyn Clock>,
    classifier: ColumnClassifier,
}

impl RuleEngine {
    /// Create an engine with default column heuristics and the system clock.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            classifier: ColumnClassifier::default(),
        }
    }

    /// Use a specific clock for `CURRENT_DATE` and year checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use custom column heuristics for quality scoring.
    pub fn with_config(mut self, config: &QualityConfig) -> Self {
        self.classifier = ColumnClassifier::new(config);
        self
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn classifier(&self) -> &ColumnClassifier {
        &self.classifier
    }

    /// Run every rule in order.
    ///
    /// The input dataset is never modified. Each rule gets exactly one log
    /// entry; a failing rule leaves the working data as it was and the
    /// remaining rules still run.
    pub fn execute(&self, dataset: &Dataset, rules: &[TransformationRule]) -> ExecutionResult {
        let mut working = dataset.clone();
        let reshaped_rows = normalize_rows(&mut working);

        let mut execution_log = Vec::with_capacity(rules.len());
        let mut transformation_stats = TransformationStats::default();

        for rule in rules {
            let entry = self.run_rule(rule, &mut working, &mut transformation_stats);
            execution_log.push(entry);
        }

        debug!(
            rules = rules.len(),
            transformations = transformation_stats.total_transformations,
            "execution finished"
        );

        ExecutionResult {
            transformed_data: working,
            execution_log,
            transformation_stats,
            reshaped_rows,
        }
    }

    fn run_rule(
        &self,
        rule: &TransformationRule,
        data: &mut Dataset,
        stats: &mut TransformationStats,
    ) -> ExecutionLogEntry {
        if !rule.is_enabled {
            debug!(rule = %rule.name, "rule is disabled");
            return ExecutionLogEntry::skipped(&rule.name, "rule is disabled");
        }

        match self.apply(rule, data) {
            Ok(Applied::Skipped(message)) => {
                debug!(rule = %rule.name, "{}", message);
                ExecutionLogEntry::skipped(&rule.name, message)
            }
            Ok(Applied::Done(counts)) => {
                stats.record(rule, counts.transformed);
                let mut message = format!(
                    "transformed {} cell(s) in '{}'",
                    counts.transformed, rule.target_field
                );
                if counts.failed > 0 {
                    message.push_str(&format!(
                        "; left {} cell(s) that could not be converted",
                        counts.failed
                    ));
                }
                debug!(rule = %rule.name, count = counts.transformed, "rule applied");
                ExecutionLogEntry::success(&rule.name, message, counts.transformed)
            }
            Err(e) => {
                warn!(rule = %rule.name, error = %e, "rule failed");
                ExecutionLogEntry::error(&rule.name, e.to_string())
            }
        }
    }

    /// Apply one rule to the working data.
    ///
    /// Everything that can fail is checked before the target column is
    /// created, so an error never leaves a partial change behind.
    fn apply(&self, rule: &TransformationRule, data: &mut Dataset) -> Result<Applied> {
        match &rule.transformation {
            Transformation::Unsupported { kind, .. } => {
                return Ok(Applied::Skipped(format!(
                    "unsupported transformation type '{}'",
                    kind
                )));
            }
            Transformation::Malformed { message, .. } => {
                return Err(AssayerError::rule(&rule.name, message.clone()));
            }
            _ => {}
        }

        let scope = self.resolve_scope(rule, data)?;
        let plan = self.plan(rule)?;
        let target = data.add_column(&rule.target_field);

        let counts = match (plan, scope) {
            (Plan::Cells(op), Scope::Cell(source)) => {
                operations::apply_cells(&mut data.rows, source, target, &op)
            }
            (Plan::Deduplicate(config), Scope::Cell(source)) => {
                operations::deduplicate(&mut data.rows, source, target, config)
            }
            (Plan::Score(config), Scope::Row) => operations::quality_score(
                data,
                target,
                config,
                &self.classifier,
                self.clock.current_year(),
            ),
            _ => {
                return Err(AssayerError::UnsupportedOperation(
                    rule.transformation.kind().to_string(),
                ));
            }
        };

        Ok(Applied::Done(counts))
    }

    pub(crate) fn resolve_scope(&self, rule: &TransformationRule, data: &Dataset) -> Result<Scope> {
        if rule.transformation.is_row_level() {
            if rule.target_field == WILDCARD {
                return Err(AssayerError::rule(
                    &rule.name,
                    format!("'{}' needs a named target field", rule.transformation.kind()),
                ));
            }
            if !rule.is_wildcard() && data.column_index(&rule.source_field).is_none() {
                return Err(AssayerError::MissingColumn(rule.source_field.clone()));
            }
            return Ok(Scope::Row);
        }

        if rule.is_wildcard() {
            return Err(AssayerError::rule(
                &rule.name,
                format!(
                    "'{}' works on a single column, not '{}'",
                    rule.transformation.kind(),
                    WILDCARD
                ),
            ));
        }

        data.column_index(&rule.source_field)
            .map(Scope::Cell)
            .ok_or_else(|| AssayerError::MissingColumn(rule.source_field.clone()))
    }

    pub(crate) fn plan<'r>(&self, rule: &'r TransformationRule) -> Result<Plan<'r>> {
        let plan = match &rule.transformation {
            Transformation::Deduplicate(config) => Plan::Deduplicate(config),
            Transformation::QualityScore(config) => Plan::Score(config),
            Transformation::Malformed { message, .. } => {
                return Err(AssayerError::rule(&rule.name, message.clone()));
            }
            other => CellOperation::prepare(other, self.clock.as_ref())
                .map_err(|e| match e {
                    AssayerError::Validation(message) => AssayerError::rule(&rule.name, message),
                    other => other,
                })?
                .map(Plan::Cells)
                .ok_or_else(|| AssayerError::UnsupportedOperation(other.kind().to_string()))?,
        };
        Ok(plan)
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

enum Applied {
    Done(OperationCounts),
    Skipped(String),
}

/// Pad short rows with nulls and drop cells past the last column.
///
/// Returns the number of rows that were reshaped.
fn normalize_rows(data: &mut Dataset) -> usize {
    let width = data.column_count();
    let mut reshaped = 0usize;
    for row in data.rows.iter_mut() {
        if row.len() != width {
            row.resize(width, Value::Null);
            reshaped += 1;
        }
    }
    if reshaped > 0 {
        warn!(rows = reshaped, width, "reshaped rows to match the column count");
    }
    reshaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::rule::{
        FillConfig, NumberOperation, NumberTransformConfig, ValidationConfig, ValidationType,
    };
    use serde_json::json;

    fn engine() -> RuleEngine {
        RuleEngine::new().with_clock(Arc::new(FixedClock::parse("2025-03-15").unwrap()))
    }

    fn rule(name: &str, source: &str, target: &str, t: Transformation) -> TransformationRule {
        TransformationRule::new(name, source, target, t)
    }

    fn abs() -> Transformation {
        Transformation::NumberTransform(NumberTransformConfig {
            operation: NumberOperation::Abs,
        })
    }

    // ==================== Scenarios ====================

    #[test]
    fn test_abs_rule() {
        let data = Dataset::new(
            vec!["id".into(), "value".into()],
            vec![vec![json!(1), json!(-50)], vec![json!(2), json!(75)]],
        );
        let rules = vec![rule("Abs value", "value", "value", abs())];

        let result = engine().execute(&data, &rules);

        assert_eq!(result.transformed_data.rows[0][1], json!(50));
        assert_eq!(result.transformed_data.rows[1][1], json!(75));
        assert_eq!(result.execution_log.len(), 1);
        assert_eq!(result.execution_log[0].status, ExecutionStatus::Success);
        assert_eq!(result.execution_log[0].transformed_count, Some(1));
        assert_eq!(result.transformation_stats.total_transformations, 1);
        let stats = &result.transformation_stats.by_rule["Abs value"];
        assert_eq!(stats.cells_transformed, 1);
        assert!(stats.fields_affected.contains("value"));

        // Input untouched
        assert_eq!(data.rows[0][1], json!(-50));
    }

    #[test]
    fn test_deduplicate_and_missing_column() {
        let data = Dataset::new(
            vec!["id".into()],
            vec![vec![json!(1)], vec![json!(2)], vec![json!(1)], vec![json!(1)]],
        );
        let rules = vec![
            rule(
                "Dedup",
                "id",
                "id",
                Transformation::Deduplicate(DeduplicateConfig::default()),
            ),
            rule("Abs price", "price", "price", abs()),
        ];

        let result = engine().execute(&data, &rules);

        let ids: Vec<Value> = result
            .transformed_data
            .rows
            .iter()
            .map(|r| r[0].clone())
            .collect();
        assert_eq!(ids, vec![json!(1), json!(2), json!("1_2"), json!("1_3")]);

        assert_eq!(result.execution_log[0].status, ExecutionStatus::Success);
        assert_eq!(result.execution_log[1].status, ExecutionStatus::Error);
        assert!(result.execution_log[1].message.contains("price"));
        assert_eq!(result.transformed_data.columns, vec!["id".to_string()]);
        assert!(!result.transformation_stats.by_rule.contains_key("Abs price"));
    }

    // ==================== Lifecycle ====================

    #[test]
    fn test_new_target_column() {
        let data = Dataset::new(
            vec!["value".into()],
            vec![vec![json!(-1)], vec![json!(2)]],
        );
        let rules = vec![rule("Abs copy", "value", "value_abs", abs())];

        let result = engine().execute(&data, &rules);

        let out = &result.transformed_data;
        assert_eq!(out.columns, vec!["value".to_string(), "value_abs".to_string()]);
        assert_eq!(out.rows[0], vec![json!(-1), json!(1)]);
        assert_eq!(out.rows[1], vec![json!(2), json!(2)]);
    }

    #[test]
    fn test_disabled_and_unsupported() {
        let data = Dataset::new(vec!["a".into()], vec![vec![json!(null)]]);
        let rules = vec![
            rule(
                "Fill",
                "a",
                "a",
                Transformation::FillMissingValues(FillConfig::new("x")),
            )
            .with_enabled(false),
            rule(
                "Geo",
                "a",
                "geo",
                Transformation::from_parts("geocode", json!({})),
            ),
        ];

        let result = engine().execute(&data, &rules);

        assert_eq!(result.execution_log[0].status, ExecutionStatus::Skipped);
        assert_eq!(result.execution_log[0].message, "rule is disabled");
        assert_eq!(result.execution_log[1].status, ExecutionStatus::Skipped);
        assert!(result.execution_log[1].message.contains("geocode"));
        assert_eq!(result.transformed_data, data);
        assert_eq!(result.transformation_stats, TransformationStats::default());
    }

    #[test]
    fn test_malformed_rule_does_not_mutate() {
        let data = Dataset::new(vec!["a".into()], vec![vec![json!(1)]]);
        let rules = vec![rule(
            "Bad",
            "a",
            "b",
            Transformation::from_parts("numberTransform", json!({"operation": "sqrt"})),
        )];

        let result = engine().execute(&data, &rules);

        assert_eq!(result.execution_log[0].status, ExecutionStatus::Error);
        assert_eq!(result.transformed_data.columns, vec!["a".to_string()]);
    }

    #[test]
    fn test_wildcard_cell_rule_errors() {
        let data = Dataset::new(vec!["a".into()], vec![vec![json!(1)]]);
        let rules = vec![rule("Abs all", WILDCARD, "a", abs())];

        let result = engine().execute(&data, &rules);
        assert_eq!(result.execution_log[0].status, ExecutionStatus::Error);
    }

    #[test]
    fn test_rules_see_earlier_results() {
        let data = Dataset::new(
            vec!["value".into()],
            vec![vec![json!("abc")], vec![json!(-4)]],
        );
        let rules = vec![
            rule(
                "Validate",
                "value",
                "value",
                Transformation::Validation(ValidationConfig::default()),
            ),
            rule("Abs", "value", "value", abs()),
        ];

        let result = engine().execute(&data, &rules);
        assert_eq!(result.transformed_data.rows[0][0], json!(0));
        assert_eq!(result.transformed_data.rows[1][0], json!(4));
        assert_eq!(result.transformation_stats.total_transformations, 2);
    }

    #[test]
    fn test_quality_score_rule() {
        let data = Dataset::new(
            vec!["id".into(), "value".into()],
            vec![vec![json!(1), json!(null)], vec![json!(2), json!(10)]],
        );
        let rules = vec![rule(
            "Score",
            WILDCARD,
            "qualityScore",
            Transformation::QualityScore(QualityScoreConfig::default()),
        )];

        let result = engine().execute(&data, &rules);
        let out = &result.transformed_data;

        assert_eq!(out.columns.last().map(String::as_str), Some("qualityScore"));
        assert_eq!(out.rows[0][2], json!(50));
        assert_eq!(out.rows[1][2], json!(100));
        assert_eq!(result.execution_log[0].transformed_count, Some(2));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let data = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![vec![json!(1)], vec![json!(1), json!(2), json!(3)]],
        );
        let result = engine().execute(&data, &[]);
        for row in &result.transformed_data.rows {
            assert_eq!(row.len(), 2);
        }
        assert_eq!(result.reshaped_rows, 2);
    }

    #[test]
    fn test_long_rows_are_truncated() {
        let data = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![
                vec![json!(1), json!(2)],
                vec![json!(3), json!(4), json!("extra")],
            ],
        );
        let result = engine().execute(&data, &[]);

        assert_eq!(result.transformed_data.rows[1], vec![json!(3), json!(4)]);
        assert_eq!(result.reshaped_rows, 1);
        assert_eq!(data.rows[1].len(), 3);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["reshapedRows"], 1);
    }

    #[test]
    fn test_failed_cells_reported() {
        let data = Dataset::new(vec!["value".into()], vec![vec![json!("x")], vec![json!(-1)]]);
        let result = engine().execute(&data, &[rule("Abs", "value", "value", abs())]);

        let entry = &result.execution_log[0];
        assert_eq!(entry.status, ExecutionStatus::Success);
        assert_eq!(entry.transformed_count, Some(1));
        assert!(entry.message.contains("could not be converted"));
    }

    #[test]
    fn test_integer_validation_counts_truncation() {
        let data = Dataset::new(
            vec!["bedrooms".into()],
            vec![vec![json!(12.9)], vec![json!(3.5)], vec![json!(4)]],
        );
        let integer = Transformation::Validation(ValidationConfig {
            validation_type: ValidationType::Integer,
            ..ValidationConfig::default()
        });
        let result = engine().execute(&data, &[rule("Whole", "bedrooms", "bedrooms", integer)]);

        assert_eq!(
            result.transformed_data.rows,
            vec![vec![json!(12)], vec![json!(3)], vec![json!(4)]]
        );
        assert_eq!(result.execution_log[0].transformed_count, Some(2));
        assert_eq!(result.transformation_stats.total_transformations, 2);
        let stats = &result.transformation_stats.by_rule["Whole"];
        assert!(stats.fields_affected.contains("bedrooms"));
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let data = Dataset::new(vec!["value".into()], vec![vec![json!(-1)]]);
        let result = engine().execute(&data, &[rule("Abs", "value", "value", abs())]);
        let json = serde_json::to_value(&result).unwrap();

        assert!(json.get("transformedData").is_some());
        assert!(json.get("reshapedRows").is_none());
        assert_eq!(json["executionLog"][0]["status"], "success");
        assert_eq!(json["executionLog"][0]["transformedCount"], 1);
        assert_eq!(json["transformationStats"]["totalTransformations"], 1);
        assert_eq!(
            json["transformationStats"]["byRule"]["Abs"]["fieldsAffected"],
            json!(["value"])
        );
    }
}
