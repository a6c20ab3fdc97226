//! Assayer: data-quality analysis and rule-driven transformation for
//! tabular datasets.
//!
//! Assayer inspects a `{columns, rows}` dataset imported from an external
//! source, scores its completeness, accuracy and consistency, suggests
//! remediation rules, and executes an ordered list of field-level
//! transformation rules while keeping a per-rule log and statistics.
//!
//! # Core Principles
//!
//! - **Non-destructive**: the input dataset is never modified
//! - **Fault-isolated**: a failing rule is logged and the rest still run
//! - **Deterministic**: the current date comes from an injectable [`Clock`]
//!
//! # Example
//!
//! ```no_run
//! use assayer::Assayer;
//!
//! let assayer = Assayer::new();
//! let (dataset, _source) = assayer.load("listings.csv").unwrap();
//! let report = assayer.analyze("listings", "mls", &dataset);
//! let rules = assayer.suggest(&report);
//! let result = assayer.execute(&dataset, &rules);
//!
//! println!("Issues: {}", report.total_issues);
//! println!("Cells changed: {}", result.transformation_stats.total_transformations);
//! ```

pub mod clock;
pub mod config;
pub mod dataset;
pub mod error;
pub mod input;
pub mod quality;
pub mod rule;
pub mod suggestion;
pub mod transform;

mod assayer;

pub use crate::assayer::{
    analyze_quality, execute_rules, suggest_rules, test_rule, AnalysisResult, Assayer,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AssayerConfig, QualityConfig, SuggestionConfig};
pub use dataset::Dataset;
pub use error::{AssayerError, Result};
pub use input::{load_dataset_json, load_rules, rules_from_value, Parser, SourceMetadata};
pub use quality::{
    EnhancedSummary, IssueCategory, QualityAnalyzer, QualityIssue, QualityReport, Severity,
    SummaryEnhancer,
};
pub use rule::{Transformation, TransformationRule};
pub use suggestion::SuggestionEngine;
pub use transform::{
    ExecutionLogEntry, ExecutionResult, ExecutionStatus, RuleEngine, RuleStats, RuleTestResult,
    TransformationStats,
};
