//! CLI command implementations.

pub mod analyze;
pub mod apply;
pub mod suggest;
pub mod test_rule;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use assayer::{Assayer, AssayerConfig, FixedClock};

/// Result type shared by all commands.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Build an Assayer from the global `--config` and `--today` flags.
pub fn build_assayer(
    config: Option<&Path>,
    today: Option<&str>,
) -> Result<Assayer, Box<dyn std::error::Error>> {
    let config = match config {
        Some(path) => AssayerConfig::load(path)?,
        None => AssayerConfig::default(),
    };

    let mut assayer = Assayer::with_config(config);

    if let Some(date) = today {
        let clock = FixedClock::parse(date)
            .ok_or_else(|| format!("Invalid --today date '{}', expected YYYY-MM-DD", date))?;
        assayer = assayer.with_clock(Arc::new(clock));
    }

    Ok(assayer)
}

/// Fail early with a readable message when an input file is missing.
pub fn require_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }
    Ok(())
}

/// `<dir>/<stem><suffix>` next to the input file.
pub fn sibling_path(file: &Path, suffix: &str) -> PathBuf {
    let stem = file.file_stem().unwrap_or_default().to_string_lossy();
    file.with_file_name(format!("{}{}", stem, suffix))
}
