//! Test-rule command - dry-run one rule on sample values.

use std::fs;
use std::path::PathBuf;

use assayer::dataset::stringify;
use assayer::{Assayer, TransformationRule};
use colored::Colorize;
use serde_json::Value;

use super::{require_file, CommandResult};

pub fn run(assayer: &Assayer, rule: PathBuf, values: Vec<String>, verbose: bool) -> CommandResult {
    require_file(&rule)?;

    let rule: TransformationRule = serde_json::from_str(&fs::read_to_string(&rule)?)?;
    let samples: Vec<Value> = values.iter().map(|v| parse_sample(v)).collect();

    println!(
        "{} {} ({})",
        "Testing".cyan().bold(),
        rule.name.white().bold(),
        rule.transformation.kind()
    );
    if verbose {
        println!(
            "  {} {}",
            "config:".dimmed(),
            rule.transformation.config_value().to_string().dimmed()
        );
    }

    let result = assayer.test_rule(&rule, &samples);

    for (sample, output) in samples.iter().zip(&result.results) {
        let marker = if sample == output {
            "=".dimmed()
        } else {
            "→".green()
        };
        println!("  {:24} {} {}", display(sample), marker, display(output));
    }

    if !result.errors.is_empty() {
        println!();
        for error in &result.errors {
            println!("{} {}", "Error:".red().bold(), error);
        }
    }

    Ok(())
}

/// Parse a sample as JSON, falling back to a plain string.
fn parse_sample(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{:?}", s),
        other => stringify(other),
    }
}
