//! Main Assayer struct and public API.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::{Clock, SystemClock};
use crate::config::AssayerConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::input::{Parser, SourceMetadata};
use crate::quality::{QualityAnalyzer, QualityReport, SummaryEnhancer};
use crate::rule::TransformationRule;
use crate::suggestion::SuggestionEngine;
use crate::transform::{ExecutionResult, RuleEngine, RuleTestResult};

/// Result of analyzing a data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Metadata about the source file.
    pub source: SourceMetadata,
    /// Quality assessment.
    pub report: QualityReport,
    /// Rules suggested for the report's issues.
    pub suggested_rules: Vec<TransformationRule>,
}

/// Analysis, suggestion and execution behind one configuration and clock.
pub struct Assayer {
    config: AssayerConfig,
    clock: Arc<dyn Clock>,
    enhancer: Option<Arc<dyn SummaryEnhancer>>,
    parser: Parser,
}

impl Assayer {
    /// Create an Assayer with default configuration and the system clock.
    pub fn new() -> Self {
        Self::with_config(AssayerConfig::default())
    }

    /// Create an Assayer with custom configuration.
    pub fn with_config(config: AssayerConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            enhancer: None,
            parser: Parser::new(),
        }
    }

    /// Use a specific clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Add a summary enhancer for quality reports.
    pub fn with_enhancer(mut self, enhancer: impl SummaryEnhancer + 'static) -> Self {
        self.enhancer = Some(Arc::new(enhancer));
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &AssayerConfig {
        &self.config
    }

    /// Build the configured quality analyzer.
    pub fn analyzer(&self) -> QualityAnalyzer {
        let analyzer = QualityAnalyzer::with_config(self.config.quality.clone())
            .with_clock(Arc::clone(&self.clock));
        match &self.enhancer {
            Some(enhancer) => analyzer.with_enhancer(Arc::clone(enhancer)),
            None => analyzer,
        }
    }

    /// Build the configured suggestion engine.
    pub fn suggestion_engine(&self) -> SuggestionEngine {
        SuggestionEngine::new()
            .with_config(self.config.suggestion.clone())
            .with_quality_config(&self.config.quality)
            .with_clock(Arc::clone(&self.clock))
    }

    /// Build the configured rule engine.
    pub fn rule_engine(&self) -> RuleEngine {
        RuleEngine::new()
            .with_config(&self.config.quality)
            .with_clock(Arc::clone(&self.clock))
    }

    /// Read a dataset from a delimited or JSON file.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        self.parser.parse_file(path)
    }

    /// Analyze an in-memory dataset.
    pub fn analyze(&self, name: &str, dataset_type: &str, dataset: &Dataset) -> QualityReport {
        self.analyzer().analyze(name, dataset_type, dataset)
    }

    /// Analyze a dataset given as raw JSON.
    pub fn analyze_value(&self, name: &str, dataset_type: &str, value: &Value) -> QualityReport {
        self.analyzer().analyze_value(name, dataset_type, value)
    }

    /// Read, analyze and suggest rules for a file.
    ///
    /// The dataset name defaults to the file stem.
    pub fn analyze_file(
        &self,
        path: impl AsRef<Path>,
        name: Option<&str>,
        dataset_type: &str,
    ) -> Result<AnalysisResult> {
        let (dataset, source) = self.load(path)?;
        let stem = source.stem();
        let report = self.analyze(name.unwrap_or(&stem), dataset_type, &dataset);
        let suggested_rules = self.suggest(&report);

        Ok(AnalysisResult {
            source,
            report,
            suggested_rules,
        })
    }

    /// Suggest rules for a report's issues.
    pub fn suggest(&self, report: &QualityReport) -> Vec<TransformationRule> {
        self.suggestion_engine().suggest(&report.issues)
    }

    /// Run rules against a dataset.
    pub fn execute(&self, dataset: &Dataset, rules: &[TransformationRule]) -> ExecutionResult {
        self.rule_engine().execute(dataset, rules)
    }

    /// Dry-run one rule on sample values.
    pub fn test_rule(&self, rule: &TransformationRule, samples: &[Value]) -> RuleTestResult {
        self.rule_engine().test_rule(rule, samples)
    }
}

impl Default for Assayer {
    fn default() -> Self {
        Self::new()
    }
}

/// Analyze a dataset with default heuristics and the system clock.
pub fn analyze_quality(name: &str, dataset_type: &str, dataset: &Dataset) -> QualityReport {
    QualityAnalyzer::new().analyze(name, dataset_type, dataset)
}

/// Suggest rules for a list of issues with default settings.
pub fn suggest_rules(issues: &[crate::quality::QualityIssue]) -> Vec<TransformationRule> {
    SuggestionEngine::new().suggest(issues)
}

/// Run rules against a dataset with default settings.
pub fn execute_rules(dataset: &Dataset, rules: &[TransformationRule]) -> ExecutionResult {
    RuleEngine::new().execute(dataset, rules)
}

/// Dry-run one rule on sample values with default settings.
pub fn test_rule(rule: &TransformationRule, samples: &[Value]) -> RuleTestResult {
    RuleEngine::new().test_rule(rule, samples)
}
