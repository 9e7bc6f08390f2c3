// ATLES - Truth-seeking guard for a locally hosted LLM
// Main entry point

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use atles::cli::{handle_command, verbosity_filter, Cli};
use atles::config::load_config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = load_config(cli.config.as_deref())?;

    // Initialize tracing (RUST_LOG wins over -v and config)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(verbosity_filter(cli.verbose, config.logging.debug_logging))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let output = handle_command(&cli.command, &config, cli.json).await?;
    println!("{}", output);

    Ok(())
}
