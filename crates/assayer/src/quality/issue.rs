//! Quality issue and report types.

use serde::{Deserialize, Serialize};

/// Severity level of a quality issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Minor issue, worth a look.
    Low,
    /// Issue that should be reviewed.
    Medium,
    /// Definite issue that should be addressed.
    High,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

/// Which score an issue counts against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Completeness,
    Accuracy,
    Consistency,
}

impl IssueCategory {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            IssueCategory::Completeness => "completeness",
            IssueCategory::Accuracy => "accuracy",
            IssueCategory::Consistency => "consistency",
        }
    }
}

/// A single detected problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityIssue {
    /// Affected field, or `all` / `multiple` for dataset-wide issues.
    pub field: String,
    /// Human-readable description.
    pub issue: String,
    /// Severity level.
    pub severity: Severity,
    /// Suggested remedy.
    pub recommendation: String,
    /// Score the issue counts against.
    pub category: IssueCategory,
}

impl QualityIssue {
    /// Create a new issue with an empty recommendation.
    pub fn new(
        category: IssueCategory,
        severity: Severity,
        field: impl Into<String>,
        issue: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            issue: issue.into(),
            severity,
            recommendation: String::new(),
            category,
        }
    }

    /// Set the recommendation.
    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = recommendation.into();
        self
    }

    /// Whether the issue names a real field rather than the whole dataset.
    pub fn is_field_specific(&self) -> bool {
        !matches!(self.field.as_str(), "all" | "multiple")
    }
}

/// Scored assessment of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    /// Name the caller gave the dataset.
    pub dataset_name: String,
    /// Kind of dataset (e.g. "listings", "assessor").
    pub dataset_type: String,
    /// Number of issues.
    pub total_issues: usize,
    /// Share of non-missing cells (0-100).
    pub completeness: u8,
    /// Share of plausible values (0-100).
    pub accuracy: u8,
    /// Structural consistency (0-100).
    pub consistency: u8,
    /// Detected issues.
    pub issues: Vec<QualityIssue>,
    /// Short summary sentence.
    pub summary: String,
    /// Recommendations from a summary enhancer, when one ran.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ai_recommendations: Option<Vec<String>>,
}

impl QualityReport {
    /// Count issues with the given severity.
    pub fn count_severity(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// Issues reported for a field.
    pub fn issues_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a QualityIssue> {
        self.issues.iter().filter(move |i| i.field == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn test_issue_serializes_camel_case() {
        let issue = QualityIssue::new(
            IssueCategory::Accuracy,
            Severity::High,
            "price",
            "non-numeric value 'abc' in row 3",
        )
        .with_recommendation("Convert to a number");

        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["severity"], "high");
        assert_eq!(json["category"], "accuracy");
        assert_eq!(json["recommendation"], "Convert to a number");
    }

    #[test]
    fn test_field_specific() {
        let issue = QualityIssue::new(IssueCategory::Consistency, Severity::High, "all", "x");
        assert!(!issue.is_field_specific());
        let issue = QualityIssue::new(IssueCategory::Consistency, Severity::High, "id", "x");
        assert!(issue.is_field_specific());
    }
}
