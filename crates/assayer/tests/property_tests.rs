//! Property-based tests for the analyzer and the rule engine.
//!
//! These tests use proptest to generate random datasets and rule lists and
//! verify that the engine keeps its invariants under all of them.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p assayer --test property_tests
//!
//! # More cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p assayer --test property_tests
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{json, Value};

use assayer::rule::{
    DeduplicateConfig, FillConfig, NumberOperation, NumberTransformConfig, QualityScoreConfig,
    ValidationConfig, WILDCARD,
};
use assayer::{
    Dataset, ExecutionStatus, FixedClock, QualityAnalyzer, RuleEngine, Transformation,
    TransformationRule,
};

// =============================================================================
// Test Strategies
// =============================================================================

const COLUMNS: &[&str] = &["id", "address", "value", "yearBuilt", "owner"];

/// Generate a single cell value, including missing and malformed ones.
fn cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(json!("")),
        (-1000i64..1000).prop_map(Value::from),
        (1900i64..2100).prop_map(Value::from),
        "[a-zA-Z ]{1,12}".prop_map(Value::from),
    ]
}

/// Generate a well-formed dataset over the fixed columns.
fn dataset() -> impl Strategy<Value = Dataset> {
    prop::collection::vec(prop::collection::vec(cell(), COLUMNS.len()), 1..20).prop_map(|rows| {
        Dataset::new(COLUMNS.iter().map(|c| c.to_string()).collect(), rows)
    })
}

/// Generate a rule that may target existing, new, or missing columns.
fn rule() -> impl Strategy<Value = TransformationRule> {
    let field = prop_oneof![
        Just("id".to_string()),
        Just("value".to_string()),
        Just("address".to_string()),
        Just("missing".to_string()),
        Just(WILDCARD.to_string()),
    ];
    let target = prop_oneof![
        Just(None),
        Just(Some("derived".to_string())),
        Just(Some("qualityScore".to_string())),
    ];
    let transformation = prop_oneof![
        Just(Transformation::FillMissingValues(FillConfig::new("N/A"))),
        Just(Transformation::Validation(ValidationConfig::default())),
        Just(Transformation::NumberTransform(NumberTransformConfig {
            operation: NumberOperation::Abs
        })),
        Just(Transformation::Deduplicate(DeduplicateConfig::default())),
        Just(Transformation::QualityScore(QualityScoreConfig::default())),
        Just(Transformation::from_parts("geocode", json!({}))),
    ];

    (field, target, transformation, any::<bool>()).prop_map(|(source, target, t, enabled)| {
        let target = target.unwrap_or_else(|| source.clone());
        TransformationRule::new(format!("{}:{}", t.kind(), source), source, target, t)
            .with_enabled(enabled)
    })
}

fn engine() -> RuleEngine {
    RuleEngine::new().with_clock(Arc::new(FixedClock::year(2025)))
}

fn analyzer() -> QualityAnalyzer {
    QualityAnalyzer::new().with_clock(Arc::new(FixedClock::year(2025)))
}

// =============================================================================
// Execution Properties
// =============================================================================

mod execution_tests {
    use super::*;

    proptest! {
        /// Every row matches the column list after execution.
        #[test]
        fn rows_match_columns(data in dataset(), rules in prop::collection::vec(rule(), 0..8)) {
            let result = engine().execute(&data, &rules);
            let width = result.transformed_data.columns.len();
            for row in &result.transformed_data.rows {
                prop_assert_eq!(row.len(), width);
            }
        }

        /// One log entry per rule, in input order, whatever fails.
        #[test]
        fn one_log_entry_per_rule(data in dataset(), rules in prop::collection::vec(rule(), 0..8)) {
            let result = engine().execute(&data, &rules);
            prop_assert_eq!(result.execution_log.len(), rules.len());
            for (entry, rule) in result.execution_log.iter().zip(&rules) {
                prop_assert_eq!(&entry.rule, &rule.name);
                if !rule.is_enabled {
                    prop_assert_eq!(entry.status, ExecutionStatus::Skipped);
                }
            }
        }

        /// The input dataset is never modified and columns only grow.
        #[test]
        fn input_untouched(data in dataset(), rules in prop::collection::vec(rule(), 0..8)) {
            let before = data.clone();
            let result = engine().execute(&data, &rules);
            prop_assert_eq!(&data, &before);
            prop_assert!(result.transformed_data.columns.starts_with(&before.columns));
            prop_assert_eq!(result.transformed_data.rows.len(), before.rows.len());
        }

        /// Stats agree with the per-rule counts in the log.
        #[test]
        fn stats_match_log(data in dataset(), rules in prop::collection::vec(rule(), 0..8)) {
            let result = engine().execute(&data, &rules);
            let logged: usize = result
                .execution_log
                .iter()
                .filter_map(|e| e.transformed_count)
                .sum();
            prop_assert_eq!(result.transformation_stats.total_transformations, logged);
        }

        /// A second fill finds nothing left to fill.
        #[test]
        fn fill_is_idempotent(data in dataset()) {
            let rules = vec![TransformationRule::new(
                "Fill owner",
                "owner",
                "owner",
                Transformation::FillMissingValues(FillConfig::new("N/A")),
            )];
            let first = engine().execute(&data, &rules);
            let second = engine().execute(&first.transformed_data, &rules);
            prop_assert_eq!(second.execution_log[0].transformed_count, Some(0));
        }

        /// First occurrences survive and each extra occurrence gets a suffix.
        #[test]
        fn dedupe_suffixes_repeats(ids in prop::collection::vec(0i64..5, 1..30)) {
            let data = Dataset::new(
                vec!["id".to_string()],
                ids.iter().map(|i| vec![Value::from(*i)]).collect(),
            );
            let rules = vec![TransformationRule::new(
                "Dedup",
                "id",
                "id",
                Transformation::Deduplicate(DeduplicateConfig::default()),
            )];
            let result = engine().execute(&data, &rules);

            let mut counts: HashMap<i64, usize> = HashMap::new();
            for id in &ids {
                *counts.entry(*id).or_insert(0) += 1;
            }
            let expected: usize = counts.values().map(|c| c - 1).sum();
            prop_assert_eq!(result.execution_log[0].transformed_count, Some(expected));

            let mut seen: HashMap<i64, usize> = HashMap::new();
            for (id, row) in ids.iter().zip(&result.transformed_data.rows) {
                let n = seen.entry(*id).or_insert(0);
                *n += 1;
                if *n == 1 {
                    prop_assert_eq!(&row[0], &Value::from(*id));
                } else {
                    prop_assert_eq!(&row[0], &Value::from(format!("{}_{}", id, n)));
                }
            }
        }

        /// Quality scores stay within [0, 100].
        #[test]
        fn quality_score_in_range(data in dataset()) {
            let rules = vec![TransformationRule::new(
                "Score",
                WILDCARD,
                "qualityScore",
                Transformation::QualityScore(QualityScoreConfig::default()),
            )];
            let result = engine().execute(&data, &rules);
            let idx = result.transformed_data.column_index("qualityScore").unwrap();
            for row in &result.transformed_data.rows {
                let score = row[idx].as_i64().unwrap();
                prop_assert!((0..=100).contains(&score));
            }
        }
    }
}

// =============================================================================
// Analyzer Properties
// =============================================================================

mod analyzer_tests {
    use super::*;

    proptest! {
        /// Scores are bounded and the issue count matches the list.
        #[test]
        fn report_is_consistent(data in dataset()) {
            let report = analyzer().analyze("prop", "test", &data);
            prop_assert_eq!(report.total_issues, report.issues.len());
            prop_assert!(report.completeness <= 100);
            prop_assert!(report.accuracy <= 100);
            prop_assert!(report.consistency <= 100);
        }

        /// Blanking a cell never raises completeness.
        #[test]
        fn blanking_lowers_completeness(
            data in dataset(),
            row in any::<prop::sample::Index>(),
            col in 0..COLUMNS.len(),
        ) {
            let before = analyzer().analyze("prop", "test", &data).completeness;

            let mut blanked = data.clone();
            let r = row.index(blanked.rows.len());
            blanked.rows[r][col] = Value::Null;
            let after = analyzer().analyze("prop", "test", &blanked).completeness;

            prop_assert!(after <= before);
        }

        /// Same input, same report.
        #[test]
        fn analysis_is_deterministic(data in dataset()) {
            let a = analyzer().analyze("prop", "test", &data);
            let b = analyzer().analyze("prop", "test", &data);
            prop_assert_eq!(a, b);
        }
    }
}
