//! Analyze command - score a data file and list its quality issues.

use std::fs;
use std::path::PathBuf;

use assayer::{Assayer, QualityReport, Severity};
use colored::Colorize;

use super::{require_file, CommandResult};

pub fn run(
    assayer: &Assayer,
    file: PathBuf,
    name: Option<String>,
    dataset_type: String,
    json: bool,
    output: Option<PathBuf>,
    verbose: bool,
) -> CommandResult {
    require_file(&file)?;

    let result = assayer.analyze_file(&file, name.as_deref(), &dataset_type)?;
    let report = &result.report;

    if let Some(ref path) = output {
        fs::write(path, serde_json::to_string_pretty(report)?)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!(
        "{} {} ({} rows, {} columns)",
        "Analyzed".cyan().bold(),
        file.display().to_string().white(),
        result.source.row_count,
        result.source.column_count
    );
    if verbose {
        println!("  {} {}", "hash:".dimmed(), result.source.hash.dimmed());
    }
    println!();

    print_scores(report);
    println!();

    println!(
        "Found {} issues ({} high, {} medium, {} low)",
        report.total_issues.to_string().white().bold(),
        report.count_severity(Severity::High).to_string().red(),
        report.count_severity(Severity::Medium).to_string().yellow(),
        report.count_severity(Severity::Low).to_string().blue()
    );

    for issue in &report.issues {
        let severity = match issue.severity {
            Severity::High => issue.severity.label().red(),
            Severity::Medium => issue.severity.label().yellow(),
            Severity::Low => issue.severity.label().blue(),
        };
        println!("  [{:6}] {:16} {}", severity, issue.field, issue.issue);
        if verbose && !issue.recommendation.is_empty() {
            println!("           {}", issue.recommendation.dimmed());
        }
    }

    println!();
    println!("{}", report.summary);

    if let Some(ref recommendations) = report.ai_recommendations {
        for rec in recommendations {
            println!("  - {}", rec);
        }
    }

    if let Some(path) = output {
        println!();
        println!(
            "{} {}",
            "Saved to".green().bold(),
            path.display().to_string().white()
        );
    }

    if !result.suggested_rules.is_empty() {
        println!(
            "Run {} to generate {} fix rule(s)",
            format!("assayer suggest {}", file.display()).cyan().bold(),
            result.suggested_rules.len()
        );
    }

    Ok(())
}

fn print_scores(report: &QualityReport) {
    for (label, score) in [
        ("Completeness", report.completeness),
        ("Accuracy", report.accuracy),
        ("Consistency", report.consistency),
    ] {
        let value = format!("{:>3}%", score);
        let value = if score >= 90 {
            value.green()
        } else if score >= 70 {
            value.yellow()
        } else {
            value.red()
        };
        println!("  {:14} {}", label, value);
    }
}
