//! Assayer CLI - data-quality analysis and transformation.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr subscriber; `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default = if verbose { "assayer=debug" } else { "assayer=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = commands::build_assayer(cli.config.as_deref(), cli.today.as_deref()).and_then(
        |assayer| match cli.command {
            Commands::Analyze {
                file,
                name,
                dataset_type,
                json,
                output,
            } => commands::analyze::run(
                &assayer,
                file,
                name,
                dataset_type,
                json,
                output,
                cli.verbose,
            ),

            Commands::Suggest { file, output } => {
                commands::suggest::run(&assayer, file, output, cli.verbose)
            }

            Commands::Apply {
                file,
                rules,
                output,
                format,
                log,
            } => commands::apply::run(&assayer, file, rules, output, format, log, cli.verbose),

            Commands::TestRule { rule, values } => {
                commands::test_rule::run(&assayer, rule, values, cli.verbose)
            }
        },
    );

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
