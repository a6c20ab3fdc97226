//! Helpers for untyped cell values.

use serde_json::{Number, Value};

/// Check if a cell counts as missing (null or empty string).
pub fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Check if a cell counts as missing, treating an absent cell as missing.
pub fn is_missing_opt(value: Option<&Value>) -> bool {
    value.map(is_missing).unwrap_or(true)
}

/// Render a cell as a string for counting and comparison.
///
/// Strings are returned verbatim; numbers and booleans use their display
/// form; arrays and objects become compact JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Interpret a cell as a number.
///
/// Numbers are taken as-is; strings are trimmed and parsed. Anything else,
/// or a string that does not parse to a finite float, yields `None`.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

/// Build a JSON number from a float, keeping integral values as integers.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Interpret a cell as a calendar year in `[1000, 9999]`.
pub fn as_year(value: &Value) -> Option<i32> {
    let n = as_number(value)?;
    if (1000.0..=9999.0).contains(&n) {
        Some(n as i32)
    } else {
        None
    }
}
