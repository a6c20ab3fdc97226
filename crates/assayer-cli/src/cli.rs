//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Assayer: data-quality analysis and rule-driven transformation
#[derive(Parser)]
#[command(name = "assayer")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true, value_name = "DATE")]
    pub today: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a data file and report quality issues
    Analyze {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Dataset name (default: file name without extension)
        #[arg(short, long)]
        name: Option<String>,

        /// Dataset type (e.g., "listings", "assessor")
        #[arg(short = 't', long = "type", default_value = "tabular")]
        dataset_type: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Save the report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Suggest transformation rules for a data file
    Suggest {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path for rules (default: <file>.rules.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply transformation rules and export the result
    Apply {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Rules file (JSON array)
        #[arg(short, long, value_name = "RULES")]
        rules: PathBuf,

        /// Output path for transformed data
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "tsv")]
        format: OutputFormat,

        /// Save the execution log and statistics to this path
        #[arg(long, value_name = "LOG")]
        log: Option<PathBuf>,
    },

    /// Dry-run a single rule on sample values
    TestRule {
        /// Rule file (a single JSON rule object)
        #[arg(short, long, value_name = "RULE")]
        rule: PathBuf,

        /// Sample values (parsed as JSON, otherwise taken as text)
        #[arg(value_name = "VALUES", required = true)]
        values: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Tsv,
    Csv,
    Json,
}

impl OutputFormat {
    /// File extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Tsv => "tsv",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" => Ok(OutputFormat::Tsv),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use tsv, csv, or json.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}
