//! Transformation rules and their per-type settings.

mod config;
mod rule;

pub use config::{
    DateValidationConfig, DedupStrategy, DeduplicateConfig, FillConfig, InvalidDateAction,
    NumberOperation, NumberTransformConfig, QualityFactor, QualityScoreConfig, QualityWeights,
    StandardizeConfig, TextCase, ValidationAction, ValidationConfig, ValidationType,
    CURRENT_DATE, INDEX_PLACEHOLDER,
};
pub use rule::{Transformation, TransformationRule, WILDCARD};
