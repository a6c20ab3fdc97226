//! Engine configuration.
//!
//! Every setting defaults to the built-in heuristics, so an empty JSON
//! object (or no config file at all) reproduces the standard behavior.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AssayerError, Result};

/// Top-level configuration for analysis and suggestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssayerConfig {
    /// Quality analyzer heuristics.
    pub quality: QualityConfig,
    /// Suggestion engine settings.
    pub suggestion: SuggestionConfig,
}

/// Column-name heuristics and completeness thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QualityConfig {
    /// Substrings marking a column as numeric (case-insensitive).
    pub numeric_keywords: Vec<String>,
    /// Substring marking a column as holding years.
    pub year_keyword: String,
    /// Substring marking a column as holding dates.
    pub date_keyword: String,
    /// Column name (case-insensitive) checked for duplicate identifiers.
    pub id_column: String,
    /// Missing percentage above which an aggregate issue is raised.
    pub missing_threshold_pct: f64,
    /// Missing percentage above which the aggregate issue is medium.
    pub medium_threshold_pct: f64,
    /// Missing percentage above which the aggregate issue is high.
    pub high_threshold_pct: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            numeric_keywords: ["value", "price", "area", "feet", "cost", "fee"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            year_keyword: "year".to_string(),
            date_keyword: "date".to_string(),
            id_column: "id".to_string(),
            missing_threshold_pct: 5.0,
            medium_threshold_pct: 10.0,
            high_threshold_pct: 20.0,
        }
    }
}

/// Settings for generated rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuggestionConfig {
    /// Target column for the suggested quality score rule.
    pub quality_score_field: String,
    /// Field that triggers the address standardization template.
    pub address_field: String,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            quality_score_field: "qualityScore".to_string(),
            address_field: "address".to_string(),
        }
    }
}

impl AssayerConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            AssayerError::Config(format!("Failed to open '{}': {}", path.display(), e))
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            AssayerError::Config(format!("Failed to parse '{}': {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config: AssayerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AssayerConfig::default());
        assert_eq!(config.quality.numeric_keywords.len(), 6);
    }

    #[test]
    fn test_partial_override() {
        let config: AssayerConfig =
            serde_json::from_str(r#"{"quality": {"idColumn": "parcel"}}"#).unwrap();
        assert_eq!(config.quality.id_column, "parcel");
        assert_eq!(config.quality.year_keyword, "year");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"suggestion": {"qualityScoreField": "score"}}"#)
            .unwrap();

        let config = AssayerConfig::load(file.path()).unwrap();
        assert_eq!(config.suggestion.quality_score_field, "score");
    }

    #[test]
    fn test_load_missing_file() {
        let err = AssayerConfig::load("/nonexistent/assayer.json").unwrap_err();
        assert!(matches!(err, AssayerError::Config(_)));
    }
}
