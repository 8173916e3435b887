//! shouldibuy CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;

use shouldibuy::cli::{commands, handle_error, Cli, Commands};
use shouldibuy::infrastructure::config::ConfigLoader;
use shouldibuy::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(&err, json_mode);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ConfigLoader::load(cli.config.as_deref())?;

    let mut log_config =
        LogConfig::try_from(&config.logging).context("Invalid logging configuration")?;
    if cli.command.logs_to_stderr() {
        log_config = log_config.to_stderr();
    }
    let _logger = LoggerImpl::init(&log_config)?;

    match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, config).await,
        Commands::Analyze(args) => commands::analyze::execute(args, config, cli.json).await,
    }
}
