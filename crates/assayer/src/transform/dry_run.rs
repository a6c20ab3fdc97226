//! Dry runs of a single rule against sample values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rule::{Transformation, TransformationRule};

use super::engine::{Plan, RuleEngine};
use super::operations;

/// Output of a dry run: one result per sample plus any errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleTestResult {
    pub results: Vec<Value>,
    pub errors: Vec<String>,
}

impl RuleTestResult {
    fn failed(len: usize, message: String) -> Self {
        Self {
            results: vec![Value::Null; len],
            errors: vec![message],
        }
    }

    /// Whether every sample was transformed without error.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl RuleEngine {
    /// Apply a rule to sample values without a dataset.
    ///
    /// Cell operations treat each sample as one cell. Deduplication treats
    /// the samples as one column. Quality scoring treats each sample as a
    /// row (arrays are rows of cells, anything else a one-cell row). The
    /// enabled flag is ignored.
    pub fn test_rule(&self, rule: &TransformationRule, samples: &[Value]) -> RuleTestResult {
        if let Transformation::Unsupported { kind, .. } = &rule.transformation {
            return RuleTestResult::failed(
                samples.len(),
                format!("unsupported transformation type '{}'", kind),
            );
        }

        let plan = match self.plan(rule) {
            Ok(plan) => plan,
            Err(e) => return RuleTestResult::failed(samples.len(), e.to_string()),
        };

        match plan {
            Plan::Cells(op) => {
                let mut result = RuleTestResult::default();
                for (i, sample) in samples.iter().enumerate() {
                    match op.apply(sample) {
                        Ok(outcome) => result.results.push(outcome.value),
                        Err(e) => {
                            result.results.push(Value::Null);
                            result.errors.push(format!("sample {}: {}", i, error_text(&e)));
                        }
                    }
                }
                result
            }
            Plan::Deduplicate(config) => {
                let mut rows: Vec<Vec<Value>> = samples.iter().map(|s| vec![s.clone()]).collect();
                operations::deduplicate(&mut rows, 0, 0, config);
                RuleTestResult {
                    results: rows.into_iter().map(|mut r| r.remove(0)).collect(),
                    errors: Vec::new(),
                }
            }
            Plan::Score(config) => {
                let current_year = self.clock().current_year();
                let results = samples
                    .iter()
                    .map(|sample| {
                        let (columns, row) = sample_row(&rule.source_field, sample);
                        let profiles = self.classifier().profiles(&columns);
                        Value::from(operations::row_score(
                            &profiles,
                            &row,
                            None,
                            config,
                            current_year,
                        ))
                    })
                    .collect();
                RuleTestResult {
                    results,
                    errors: Vec::new(),
                }
            }
        }
    }
}

fn error_text(error: &crate::error::AssayerError) -> String {
    match error {
        crate::error::AssayerError::Validation(message) => message.clone(),
        other => other.to_string(),
    }
}

/// Build column names and cells for a quality-score sample.
fn sample_row(source_field: &str, sample: &Value) -> (Vec<String>, Vec<Value>) {
    match sample {
        Value::Array(cells) => {
            let columns = (1..=cells.len()).map(|i| format!("column_{}", i)).collect();
            (columns, cells.clone())
        }
        other => (vec![source_field.to_string()], vec![other.clone()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::rule::{
        DeduplicateConfig, FillConfig, NumberOperation, NumberTransformConfig, QualityScoreConfig,
        CURRENT_DATE, WILDCARD,
    };
    use serde_json::json;
    use std::sync::Arc;

    fn engine() -> RuleEngine {
        RuleEngine::new().with_clock(Arc::new(FixedClock::parse("2025-03-15").unwrap()))
    }

    #[test]
    fn test_fill_samples() {
        let rule = TransformationRule::new(
            "Fill date",
            "saleDate",
            "saleDate",
            Transformation::FillMissingValues(FillConfig::new(CURRENT_DATE)),
        );
        let result = engine().test_rule(&rule, &[json!(null), json!("2020-01-01"), json!("")]);

        assert!(result.is_ok());
        assert_eq!(
            result.results,
            vec![json!("2025-03-15"), json!("2020-01-01"), json!("2025-03-15")]
        );
    }

    #[test]
    fn test_per_sample_errors() {
        let rule = TransformationRule::new(
            "Abs",
            "value",
            "value",
            Transformation::NumberTransform(NumberTransformConfig {
                operation: NumberOperation::Abs,
            }),
        );
        let result = engine().test_rule(&rule, &[json!(-3), json!("abc"), json!(4)]);

        assert_eq!(result.results, vec![json!(3), json!(null), json!(4)]);
        assert_eq!(result.errors, vec!["sample 1: 'abc' is not a number".to_string()]);
    }

    #[test]
    fn test_dedupe_samples() {
        let rule = TransformationRule::new(
            "Dedup",
            "id",
            "id",
            Transformation::Deduplicate(DeduplicateConfig::default()),
        );
        let result = engine().test_rule(&rule, &[json!("a"), json!("a"), json!("b")]);
        assert_eq!(result.results, vec![json!("a"), json!("a_2"), json!("b")]);
    }

    #[test]
    fn test_score_samples() {
        let rule = TransformationRule::new(
            "Score",
            WILDCARD,
            "qualityScore",
            Transformation::QualityScore(QualityScoreConfig::default()),
        );
        let result = engine().test_rule(&rule, &[json!([1, null]), json!(null), json!("x")]);
        assert_eq!(result.results, vec![json!(50), json!(0), json!(100)]);
    }

    #[test]
    fn test_unsupported_rule() {
        let rule = TransformationRule::new(
            "Geo",
            "address",
            "geo",
            Transformation::from_parts("geocode", json!({})),
        );
        let result = engine().test_rule(&rule, &[json!("a"), json!("b")]);

        assert_eq!(result.results, vec![json!(null), json!(null)]);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("geocode"));
    }
}
