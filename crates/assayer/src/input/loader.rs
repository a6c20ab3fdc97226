//! JSON loaders for datasets and rule lists.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::Value;

use crate::dataset::Dataset;
use crate::error::{AssayerError, Result};
use crate::rule::TransformationRule;

fn read_json(path: &Path) -> Result<Value> {
    let file = File::open(path).map_err(|e| AssayerError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Load a `{columns, rows}` dataset from a JSON file.
pub fn load_dataset_json(path: impl AsRef<Path>) -> Result<Dataset> {
    let value = read_json(path.as_ref())?;
    Dataset::from_value(&value)
}

/// Decode a rule list from a JSON array.
pub fn rules_from_value(value: &Value) -> Result<Vec<TransformationRule>> {
    let items = value
        .as_array()
        .ok_or_else(|| AssayerError::Validation("rules must be a JSON array".to_string()))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item.clone())
                .map_err(|e| AssayerError::Validation(format!("rule {}: {}", i, e)))
        })
        .collect()
}

/// Load a rule list from a JSON file.
pub fn load_rules(path: impl AsRef<Path>) -> Result<Vec<TransformationRule>> {
    let value = read_json(path.as_ref())?;
    rules_from_value(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_rules_must_be_array() {
        let result = rules_from_value(&json!({"name": "x"}));
        assert!(matches!(result, Err(AssayerError::Validation(_))));
    }

    #[test]
    fn test_rule_missing_fields() {
        let result = rules_from_value(&json!([{"name": "x"}]));
        match result {
            Err(AssayerError::Validation(msg)) => assert!(msg.starts_with("rule 0")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_load_rules_file() {
        let file = create_test_file(
            r#"[{"name":"Abs","sourceField":"value","transformationType":"numberTransform",
                 "transformationConfig":{"operation":"abs"}}]"#,
        );
        let rules = load_rules(file.path()).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].target_field, "value");
    }

    #[test]
    fn test_load_dataset_file() {
        let file = create_test_file(r#"{"columns":["id"],"rows":[[1],[2]]}"#);
        let dataset = load_dataset_json(file.path()).unwrap();
        assert_eq!(dataset.row_count(), 2);
    }

    #[test]
    fn test_missing_file() {
        let result = load_rules("/nonexistent/rules.json");
        assert!(matches!(result, Err(AssayerError::Io { .. })));
    }
}
