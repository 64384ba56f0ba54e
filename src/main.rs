//! docquery - Chat with your PDF documents
//!
#![doc = "Main entry point for the docquery terminal client."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use docquery::cli::{Cli, Commands};
use docquery::commands;
use docquery::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { documents } => {
            tracing::info!("Starting interactive chat mode");
            for path in &documents {
                tracing::debug!("Queued upload: {}", path.display());
            }
            commands::chat::run_chat(config, documents).await?;
            Ok(())
        }
        Commands::Ask { query, json } => {
            tracing::info!("Starting one-shot query");
            tracing::debug!("Query: {}", query);
            commands::ask::run_ask(config, query, json).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never mix with answers printed to stdout.
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "docquery=debug"
    } else {
        "docquery=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
