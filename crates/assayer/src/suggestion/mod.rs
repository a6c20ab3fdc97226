//! Suggestion engine for turning quality issues into transformation rules.

mod generator;

pub use generator::{IssuePattern, SuggestionEngine};
