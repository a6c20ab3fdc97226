//! Quality analysis for tabular datasets.
//!
//! The analyzer makes one pass over every cell and produces a
//! [`QualityReport`] with three scores and a list of [`QualityIssue`]s:
//!
//! - **completeness**: share of non-missing cells
//! - **accuracy**: starts at 100, reduced by implausible values in numeric
//!   and year columns
//! - **consistency**: starts at 100, reduced by malformed rows and
//!   duplicate identifiers

mod analyzer;
mod column;
mod enhancer;
mod issue;

pub use analyzer::QualityAnalyzer;
pub use column::{year_of, ColumnClassifier, ColumnProfile};
pub use enhancer::{EnhancedSummary, SummaryEnhancer};
pub use issue::{IssueCategory, QualityIssue, QualityReport, Severity};
