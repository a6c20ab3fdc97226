//! Transformation rules.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::config::{
    DateValidationConfig, DeduplicateConfig, FillConfig, NumberTransformConfig,
    QualityScoreConfig, StandardizeConfig, ValidationConfig,
};

/// Source field meaning "the whole row".
pub const WILDCARD: &str = "*";

/// The operation a rule runs, with its settings.
///
/// On the wire this is two sibling fields, `transformationType` and
/// `transformationConfig`. Unknown types and undecodable settings are kept
/// so the engine can report them per rule instead of rejecting the list.
#[derive(Debug, Clone, PartialEq)]
pub enum Transformation {
    FillMissingValues(FillConfig),
    Validation(ValidationConfig),
    NumberTransform(NumberTransformConfig),
    Deduplicate(DeduplicateConfig),
    DateValidation(DateValidationConfig),
    QualityScore(QualityScoreConfig),
    StandardizeText(StandardizeConfig),
    /// A type the engine does not implement.
    Unsupported { kind: String, config: Value },
    /// A known type whose settings failed to decode.
    Malformed {
        kind: String,
        config: Value,
        message: String,
    },
}

impl Transformation {
    /// Wire name of the transformation type.
    pub fn kind(&self) -> &str {
        match self {
            Transformation::FillMissingValues(_) => "fillMissingValues",
            Transformation::Validation(_) => "validation",
            Transformation::NumberTransform(_) => "numberTransform",
            Transformation::Deduplicate(_) => "deduplicate",
            Transformation::DateValidation(_) => "dateValidation",
            Transformation::QualityScore(_) => "qualityScore",
            Transformation::StandardizeText(_) => "standardizeText",
            Transformation::Unsupported { kind, .. } => kind,
            Transformation::Malformed { kind, .. } => kind,
        }
    }

    /// Decode a type name and its settings.
    pub fn from_parts(kind: &str, config: Value) -> Self {
        // An absent config means "all defaults"
        let settings = if config.is_null() { json!({}) } else { config.clone() };

        let decoded = match kind {
            "fillMissingValues" => {
                serde_json::from_value(settings).map(Transformation::FillMissingValues)
            }
            "validation" => serde_json::from_value(settings).map(Transformation::Validation),
            "numberTransform" => {
                serde_json::from_value(settings).map(Transformation::NumberTransform)
            }
            "deduplicate" => serde_json::from_value(settings).map(Transformation::Deduplicate),
            "dateValidation" => {
                serde_json::from_value(settings).map(Transformation::DateValidation)
            }
            "qualityScore" => serde_json::from_value(settings).map(Transformation::QualityScore),
            "standardizeText" => {
                serde_json::from_value(settings).map(Transformation::StandardizeText)
            }
            _ => {
                return Transformation::Unsupported {
                    kind: kind.to_string(),
                    config,
                };
            }
        };

        decoded.unwrap_or_else(|e| Transformation::Malformed {
            kind: kind.to_string(),
            config,
            message: format!("invalid {} config: {}", kind, e),
        })
    }

    /// Encode the settings back to JSON.
    pub fn config_value(&self) -> Value {
        let encoded = match self {
            Transformation::FillMissingValues(c) => serde_json::to_value(c),
            Transformation::Validation(c) => serde_json::to_value(c),
            Transformation::NumberTransform(c) => serde_json::to_value(c),
            Transformation::Deduplicate(c) => serde_json::to_value(c),
            Transformation::DateValidation(c) => serde_json::to_value(c),
            Transformation::QualityScore(c) => serde_json::to_value(c),
            Transformation::StandardizeText(c) => serde_json::to_value(c),
            Transformation::Unsupported { config, .. } => return config.clone(),
            Transformation::Malformed { config, .. } => return config.clone(),
        };
        encoded.unwrap_or_default()
    }

    /// Whether the transformation works on whole rows rather than one cell.
    pub fn is_row_level(&self) -> bool {
        matches!(self, Transformation::QualityScore(_))
    }
}

/// A named, configurable unit of change applied to one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRule", into = "RawRule")]
pub struct TransformationRule {
    /// Rule name (keys the execution statistics).
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Column read by the rule, or `*` for the whole row.
    pub source_field: String,
    /// Column written by the rule; created if absent.
    pub target_field: String,
    /// Operation and settings.
    pub transformation: Transformation,
    /// Disabled rules are skipped.
    pub is_enabled: bool,
}

impl TransformationRule {
    /// Create an enabled rule.
    pub fn new(
        name: impl Into<String>,
        source_field: impl Into<String>,
        target_field: impl Into<String>,
        transformation: Transformation,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            source_field: source_field.into(),
            target_field: target_field.into(),
            transformation,
            is_enabled: true,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set whether the rule is enabled.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.is_enabled = enabled;
        self
    }

    /// Whether the rule reads the whole row.
    pub fn is_wildcard(&self) -> bool {
        self.source_field == WILDCARD
    }
}

/// Wire form of a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRule {
    name: String,
    #[serde(default)]
    description: String,
    source_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_field: Option<String>,
    transformation_type: String,
    #[serde(default)]
    transformation_config: Value,
    #[serde(default = "default_enabled")]
    is_enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl From<RawRule> for TransformationRule {
    fn from(raw: RawRule) -> Self {
        let transformation =
            Transformation::from_parts(&raw.transformation_type, raw.transformation_config);
        let target_field = raw.target_field.unwrap_or_else(|| raw.source_field.clone());

        Self {
            name: raw.name,
            description: raw.description,
            source_field: raw.source_field,
            target_field,
            transformation,
            is_enabled: raw.is_enabled,
        }
    }
}

impl From<TransformationRule> for RawRule {
    fn from(rule: TransformationRule) -> Self {
        Self {
            transformation_type: rule.transformation.kind().to_string(),
            transformation_config: rule.transformation.config_value(),
            name: rule.name,
            description: rule.description,
            source_field: rule.source_field,
            target_field: Some(rule.target_field),
            is_enabled: rule.is_enabled,
        }
    }
}
