//! Optional summary enhancement.
//!
//! A deployment may plug in a summarization service that rewrites the
//! templated summary and adds recommendations. Scores are never touched.

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::Result;

use super::issue::QualityReport;

/// Summary produced by an enhancer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnhancedSummary {
    /// Replacement summary (ignored when empty).
    pub summary: String,
    /// Additional recommendations.
    pub recommendations: Vec<String>,
}

/// A collaborator that can improve a report's summary.
pub trait SummaryEnhancer: Send + Sync {
    /// Produce a better summary for a finished report.
    fn enhance(&self, report: &QualityReport, dataset: &Dataset) -> Result<EnhancedSummary>;
}
