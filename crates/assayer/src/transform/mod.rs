//! Rule execution: applies transformation rules to datasets.

mod dry_run;
mod engine;
mod operations;

pub use dry_run::RuleTestResult;
pub use engine::{
    ExecutionLogEntry, ExecutionResult, ExecutionStatus, RuleEngine, RuleStats,
    TransformationStats,
};
pub use operations::{CellOperation, CellOutcome, OperationCounts, TextStandardizer};
