//! Suggest command - write fix rules for a data file's issues.

use std::fs;
use std::path::PathBuf;

use assayer::Assayer;
use colored::Colorize;

use super::{require_file, sibling_path, CommandResult};

pub fn run(
    assayer: &Assayer,
    file: PathBuf,
    output: Option<PathBuf>,
    verbose: bool,
) -> CommandResult {
    require_file(&file)?;

    let result = assayer.analyze_file(&file, None, "tabular")?;

    println!(
        "{} {} ({} issues)",
        "Analyzed".cyan().bold(),
        file.display().to_string().white(),
        result.report.total_issues
    );

    if result.suggested_rules.is_empty() {
        println!("{}", "No issues found - nothing to suggest.".green());
        return Ok(());
    }

    let output_path = output.unwrap_or_else(|| sibling_path(&file, ".rules.json"));
    fs::write(
        &output_path,
        serde_json::to_string_pretty(&result.suggested_rules)?,
    )?;

    println!(
        "Generated {} rules",
        result.suggested_rules.len().to_string().white().bold()
    );
    for rule in &result.suggested_rules {
        if verbose {
            println!(
                "  {:28} {:18} {} -> {}",
                rule.name,
                rule.transformation.kind().cyan(),
                rule.source_field,
                rule.target_field
            );
        } else {
            println!("  {}", rule.name);
        }
    }

    println!();
    println!(
        "{} {}",
        "Saved to".green().bold(),
        output_path.display().to_string().white()
    );
    println!(
        "Run {} to apply them",
        format!(
            "assayer apply {} --rules {}",
            file.display(),
            output_path.display()
        )
        .cyan()
        .bold()
    );

    Ok(())
}
