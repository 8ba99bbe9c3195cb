//! `licensehub` binary entry point.

use clap::Parser;

use licensehub_cli::cli::{Cli, Commands};
use licensehub_cli::commands;
use licensehub_cli::error::CliError;
use licensehub_cli::logging::init_tracing;
use licensehub_cli::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // Config errors are reported by the command itself.
    let mut general = commands::load_config(&cli.config)
        .await
        .map(|config| config.general)
        .unwrap_or_default();
    if let Some(level) = cli.log_level {
        general.log_level = level;
    }
    init_tracing(&general).map_err(|e| CliError::Config(e.to_string()))?;

    tracing::debug!(config = %cli.config.display(), "licensehub starting");

    let writer = OutputWriter::new(cli.output);
    match cli.command {
        Commands::Scan(args) => commands::scan::execute(args, &cli.config, &writer).await,
        Commands::Policy(args) => commands::policy::execute(args, &cli.config, &writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    }
}
