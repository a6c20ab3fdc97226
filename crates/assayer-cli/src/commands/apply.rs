//! Apply command - run rules against a data file and export the result.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use assayer::dataset::stringify;
use assayer::{
    load_rules, Assayer, Dataset, ExecutionLogEntry, ExecutionStatus, TransformationStats,
};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

use super::{require_file, sibling_path, CommandResult};
use crate::cli::OutputFormat;

/// Execution log written next to the transformed data.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunLog<'a> {
    source_file: &'a str,
    source_hash: &'a str,
    applied_at: DateTime<Utc>,
    execution_log: &'a [ExecutionLogEntry],
    transformation_stats: &'a TransformationStats,
    reshaped_rows: usize,
}

pub fn run(
    assayer: &Assayer,
    file: PathBuf,
    rules: PathBuf,
    output: Option<PathBuf>,
    format: OutputFormat,
    log: Option<PathBuf>,
    verbose: bool,
) -> CommandResult {
    require_file(&file)?;
    require_file(&rules)?;

    let (dataset, source) = assayer.load(&file)?;
    let rules = load_rules(&rules)?;

    if rules.is_empty() {
        println!("{} No rules to apply.", "Warning:".yellow().bold());
        return Ok(());
    }

    println!(
        "{} {} rules to {} rows",
        "Applying".cyan().bold(),
        rules.len().to_string().white().bold(),
        source.row_count
    );

    let result = assayer.execute(&dataset, &rules);

    if result.reshaped_rows > 0 {
        println!(
            "{} {} row(s) did not match the header and were padded or truncated",
            "Warning:".yellow().bold(),
            result.reshaped_rows
        );
    }

    for entry in &result.execution_log {
        let status = match entry.status {
            ExecutionStatus::Success => "ok".green(),
            ExecutionStatus::Skipped => "skip".yellow(),
            ExecutionStatus::Error => "error".red(),
        };
        if verbose || entry.status != ExecutionStatus::Success {
            println!("  [{:5}] {}: {}", status, entry.rule, entry.message);
        } else {
            println!("  [{:5}] {}", status, entry.rule);
        }
    }

    let output_path =
        output.unwrap_or_else(|| sibling_path(&file, &format!("_transformed.{}", format)));
    write_dataset(&result.transformed_data, &output_path, format)?;

    if let Some(ref log_path) = log {
        let run_log = RunLog {
            source_file: &source.file,
            source_hash: &source.hash,
            applied_at: Utc::now(),
            execution_log: &result.execution_log,
            transformation_stats: &result.transformation_stats,
            reshaped_rows: result.reshaped_rows,
        };
        fs::write(log_path, serde_json::to_string_pretty(&run_log)?)?;
    }

    println!();
    println!(
        "{} cells transformed ({} ok, {} skipped, {} failed)",
        result
            .transformation_stats
            .total_transformations
            .to_string()
            .white()
            .bold(),
        result.count_status(ExecutionStatus::Success).to_string().green(),
        result.count_status(ExecutionStatus::Skipped).to_string().yellow(),
        result.count_status(ExecutionStatus::Error).to_string().red()
    );
    println!(
        "{} {}",
        "Saved to".green().bold(),
        output_path.display().to_string().white()
    );
    if let Some(log_path) = log {
        println!(
            "{} {}",
            "Log saved to".green().bold(),
            log_path.display().to_string().white()
        );
    }

    Ok(())
}

/// Write a dataset as delimited text or JSON.
fn write_dataset(data: &Dataset, path: &Path, format: OutputFormat) -> CommandResult {
    let delimiter = match format {
        OutputFormat::Json => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, data)?;
            return Ok(());
        }
        OutputFormat::Tsv => b'\t',
        OutputFormat::Csv => b',',
    };

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)?;
    writer.write_record(&data.columns)?;
    for row in &data.rows {
        writer.write_record(row.iter().map(cell_text))?;
    }
    writer.flush()?;
    Ok(())
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => stringify(other),
    }
}
