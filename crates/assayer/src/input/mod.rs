//! Dataset and rule sources.

mod loader;
mod parser;
mod source;

pub use loader::{load_dataset_json, load_rules, rules_from_value};
pub use parser::{parse_cell, Parser, ParserConfig};
pub use source::SourceMetadata;
