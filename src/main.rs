//! QueryGPT - terminal chat client
//!
#![doc = "QueryGPT - terminal chat client"]
#![doc = "Main entry point for the querygpt application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use querygpt::auth::{resolve_token, KeyringTokenStore};
use querygpt::cli::{Cli, Commands};
use querygpt::commands;
use querygpt::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.log_json);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { no_history } => {
            tracing::info!("Starting interactive chat mode");
            let (token, origin) = resolve_token(cli.token, &KeyringTokenStore);
            tracing::debug!("Using token from {}", origin);
            commands::chat::run_chat(config, token, no_history).await?;
            Ok(())
        }
        Commands::Ask { question } => {
            let (token, origin) = resolve_token(cli.token, &KeyringTokenStore);
            tracing::debug!("Using token from {}", origin);
            commands::ask::run_ask(config, token, question).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            let (token, _) = resolve_token(cli.token, &KeyringTokenStore);
            commands::history::handle_history(&config, token.as_deref(), command).await?;
            Ok(())
        }
        Commands::Health => {
            commands::health::run_health(&config).await?;
            Ok(())
        }
        Commands::Auth { command } => {
            commands::auth::handle_auth(command, cli.token)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never mix with answers printed on stdout.
/// With `json` each line is a JSON object.
fn init_tracing(verbose: bool, json: bool) {
    let default_directive = if verbose {
        "querygpt=debug"
    } else {
        "querygpt=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
