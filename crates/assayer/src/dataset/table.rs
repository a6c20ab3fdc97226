//! The `{columns, rows}` dataset shared by every engine component.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AssayerError, Result};

/// Tabular data with untyped cells.
///
/// Rows are positionally aligned with `columns`. A row whose length differs
/// from the column count is reported by [`Dataset::check_shape`] rather than
/// rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Ordered, unique field names.
    pub columns: Vec<String>,
    /// Row data (row-major order).
    pub rows: Vec<Vec<Value>>,
}

/// A row whose length does not match the column count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeIssue {
    /// Row index (0-based).
    pub row: usize,
    /// Number of columns.
    pub expected: usize,
    /// Number of cells in the row.
    pub actual: usize,
}

impl Dataset {
    /// Create a new dataset.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Build a dataset from raw JSON, rejecting malformed input.
    ///
    /// The value must be an object with a `columns` array of unique strings
    /// and a `rows` array of arrays.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| AssayerError::Validation("dataset must be an object".to_string()))?;

        let columns = obj
            .get("columns")
            .ok_or_else(|| AssayerError::Validation("dataset is missing 'columns'".to_string()))?
            .as_array()
            .ok_or_else(|| AssayerError::Validation("'columns' must be an array".to_string()))?;

        let mut names = Vec::with_capacity(columns.len());
        for (idx, col) in columns.iter().enumerate() {
            let name = col.as_str().ok_or_else(|| {
                AssayerError::Validation(format!("column {} is not a string", idx))
            })?;
            names.push(name.to_string());
        }
        ensure_unique_columns(&names)?;

        let rows = obj
            .get("rows")
            .ok_or_else(|| AssayerError::Validation("dataset is missing 'rows'".to_string()))?
            .as_array()
            .ok_or_else(|| AssayerError::Validation("'rows' must be an array".to_string()))?;

        let mut parsed = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            let cells = row.as_array().ok_or_else(|| {
                AssayerError::Validation(format!("row {} is not an array", idx))
            })?;
            parsed.push(cells.clone());
        }

        Ok(Self::new(names, parsed))
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Find a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a column, filling every existing row with `null`.
    ///
    /// Returns the index of the column, which already exists if the name is
    /// present.
    pub fn add_column(&mut self, name: impl Into<String>) -> usize {
        let name = name.into();
        if let Some(idx) = self.column_index(&name) {
            return idx;
        }
        self.columns.push(name);
        for row in &mut self.rows {
            row.push(Value::Null);
        }
        self.columns.len() - 1
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Get all values for a column by index (absent cells yield `null`).
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        static NULL: Value = Value::Null;
        self.rows.iter().map(move |row| row.get(index).unwrap_or(&NULL))
    }

    /// List rows whose length differs from the column count.
    pub fn check_shape(&self) -> Vec<ShapeIssue> {
        let expected = self.columns.len();
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.len() != expected)
            .map(|(row, cells)| ShapeIssue {
                row,
                expected,
                actual: cells.len(),
            })
            .collect()
    }
}

/// Check a dataset's row shapes.
pub fn check_shape(dataset: &Dataset) -> Vec<ShapeIssue> {
    dataset.check_shape()
}

/// Reject a column list that names the same field twice.
pub fn ensure_unique_columns(columns: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for name in columns {
        if !seen.insert(name.as_str()) {
            return Err(AssayerError::Validation(format!(
                "duplicate column name '{}'",
                name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Dataset {
        Dataset::new(
            vec!["id".into(), "value".into()],
            vec![vec![json!(1), json!(10)], vec![json!(2)]],
        )
    }

    #[test]
    fn test_check_shape() {
        let issues = sample().check_shape();
        assert_eq!(
            issues,
            vec![ShapeIssue {
                row: 1,
                expected: 2,
                actual: 1
            }]
        );
    }

    #[test]
    fn test_add_column_pads_rows() {
        let mut data = Dataset::new(
            vec!["id".into()],
            vec![vec![json!(1)], vec![json!(2)]],
        );
        let idx = data.add_column("score");
        assert_eq!(idx, 1);
        assert!(data.check_shape().is_empty());
        assert_eq!(data.get(1, 1), Some(&Value::Null));

        // Adding again is a no-op
        assert_eq!(data.add_column("score"), 1);
        assert_eq!(data.column_count(), 2);
    }

    #[test]
    fn test_column_values_fill_absent() {
        let data = sample();
        let values: Vec<&Value> = data.column_values(1).collect();
        assert_eq!(values, vec![&json!(10), &Value::Null]);
    }

    #[test]
    fn test_from_value() {
        let data = Dataset::from_value(&json!({
            "columns": ["id", "address"],
            "rows": [[1, "123 Main St"]]
        }))
        .unwrap();
        assert_eq!(data.column_count(), 2);
        assert_eq!(data.row_count(), 1);
    }

    #[test]
    fn test_from_value_rejects_malformed() {
        assert!(Dataset::from_value(&json!({"rows": []})).is_err());
        assert!(Dataset::from_value(&json!({"columns": ["a"], "rows": {}})).is_err());
        assert!(Dataset::from_value(&json!({"columns": ["a", "a"], "rows": []})).is_err());
        assert!(Dataset::from_value(&json!({"columns": ["a"], "rows": [1]})).is_err());
        assert!(Dataset::from_value(&json!([1, 2])).is_err());
    }
}
