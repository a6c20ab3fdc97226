//! CSV/TSV parser with delimiter detection.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::source::SourceMetadata;
use crate::dataset::{ensure_unique_columns, Dataset};
use crate::error::{AssayerError, Result};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Parses delimited text files into datasets.
///
/// The first line is the header. Rows are kept as read, so short or long
/// rows surface as consistency issues in analysis.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the dataset and metadata.
    ///
    /// Files with a `.json` extension are read as a `{columns, rows}` object;
    /// anything else as delimited text.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let path = path.as_ref();
        let io_err = |e| AssayerError::Io {
            path: path.to_path_buf(),
            source: e,
        };

        let mut file = File::open(path).map_err(io_err)?;
        let size_bytes = file.metadata().map_err(io_err)?.len();

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(io_err)?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let (dataset, format) = if is_json {
            let value: Value = serde_json::from_slice(&contents)?;
            (Dataset::from_value(&value)?, "json")
        } else {
            let delimiter = match self.config.delimiter {
                Some(d) => d,
                None => detect_delimiter(&contents)?,
            };
            let format = match delimiter {
                b'\t' => "tsv",
                b',' => "csv",
                b';' => "csv-semicolon",
                b'|' => "psv",
                _ => "delimited",
            };
            (self.parse_bytes(&contents, delimiter)?, format)
        };

        debug!(
            path = %path.display(),
            format,
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "parsed data file"
        );

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format,
            dataset.row_count(),
            dataset.column_count(),
        );

        Ok((dataset, metadata))
    }

    /// Parse bytes with a known delimiter.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|s| s.trim().to_string())
            .collect();

        if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
            return Err(AssayerError::EmptyData("No columns found".to_string()));
        }
        ensure_unique_columns(&columns)?;

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;
            rows.push(record.iter().map(parse_cell).collect());
        }

        if rows.is_empty() {
            return Err(AssayerError::EmptyData("No data rows found".to_string()));
        }

        Ok(Dataset::new(columns, rows))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Type a raw field: empty → null, then integer, then finite float, else string.
pub fn parse_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return Value::from(f);
        }
    }
    Value::String(raw.to_string())
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(AssayerError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Consistent counts dominate; tabs win ties
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_detect_delimiter_quoted() {
        let data = b"id|address\n1|\"12 Main St, Apt 4\"\n2|\"9 Oak Ave, Unit 1\"";
        assert_eq!(detect_delimiter(data).unwrap(), b'|');
    }

    #[test]
    fn test_parse_typed_cells() {
        let parser = Parser::new();
        let data = b"id,address,value,yearBuilt\n1,123 Main St,450000,2008\n2,,-50.5,2060";
        let dataset = parser.parse_bytes(data, b',').unwrap();

        assert_eq!(dataset.columns, vec!["id", "address", "value", "yearBuilt"]);
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(
            dataset.rows[0],
            vec![json!(1), json!("123 Main St"), json!(450000), json!(2008)]
        );
        assert_eq!(dataset.rows[1][1], json!(null));
        assert_eq!(dataset.rows[1][2], json!(-50.5));
    }

    #[test]
    fn test_duplicate_headers_rejected() {
        let parser = Parser::new();

        let err = parser.parse_bytes(b"id,id\n1,2\n", b',').unwrap_err();
        assert!(matches!(err, AssayerError::Validation(ref m) if m.contains("'id'")));

        // Headers are compared after trimming
        let err = parser.parse_bytes(b"id,value, id\n1,2,3\n", b',').unwrap_err();
        assert!(matches!(err, AssayerError::Validation(_)));
    }

    #[test]
    fn test_ragged_rows_kept() {
        let parser = Parser::new();
        let data = b"a,b,c\n1,2\n1,2,3,4";
        let dataset = parser.parse_bytes(data, b',').unwrap();

        assert_eq!(dataset.rows[0].len(), 2);
        assert_eq!(dataset.rows[1].len(), 4);
        assert_eq!(dataset.check_shape().len(), 2);
    }

    #[test]
    fn test_header_only_is_empty() {
        let parser = Parser::new();
        let result = parser.parse_bytes(b"a,b,c\n", b',');
        assert!(matches!(result, Err(AssayerError::EmptyData(_))));
    }

    #[test]
    fn test_parse_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        std::io::Write::write_all(&mut file, br#"{"columns":["id","value"],"rows":[[1,-5]]}"#)
            .unwrap();

        let (dataset, meta) = Parser::new().parse_file(file.path()).unwrap();
        assert_eq!(dataset.rows[0], vec![json!(1), json!(-5)]);
        assert_eq!(meta.format, "json");
        assert!(meta.hash.starts_with("sha256:"));
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell(""), json!(null));
        assert_eq!(parse_cell("  "), json!(null));
        assert_eq!(parse_cell("42"), json!(42));
        assert_eq!(parse_cell("4.5"), json!(4.5));
        assert_eq!(parse_cell("NaN"), json!("NaN"));
        assert_eq!(parse_cell("inf"), json!("inf"));
        assert_eq!(parse_cell("N/A"), json!("N/A"));
    }
}
