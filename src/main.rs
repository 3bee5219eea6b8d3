//! TurboPech - terminal client for a local LLM tutoring server
//!
#![doc = "TurboPech - terminal client for a local LLM tutoring server"]
#![doc = "Main entry point for the TurboPech application."]

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use turbopech::backend::{Backend, HttpBackend};
use turbopech::cli::{Cli, Commands};
use turbopech::commands;
use turbopech::config::Config;
use turbopech::conversation::ConversationStore;
use turbopech::model_config::ModelStore;
use turbopech::notifications::{Notifier, TerminalNotifier};
use turbopech::storage::open_storage;

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

    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(config.backend.clone())?);
    let notifier: Arc<dyn Notifier> = Arc::new(TerminalNotifier);

    // Execute command
    match cli.command {
        Commands::Chat { resume } => {
            if let Some(r) = &resume {
                tracing::debug!("Resuming conversation: {}", r);
            }
            let mut conversations = open_conversations(&config)?;
            let mut models = ModelStore::new(backend, notifier, config.generation.clone());
            commands::chat::run_chat(&mut conversations, &mut models, resume).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            let mut conversations = open_conversations(&config)?;
            commands::history::handle_history(command, &mut conversations, &config.history)?;
            Ok(())
        }
        Commands::Models { command } => {
            tracing::info!("Starting model management command");
            let mut models = ModelStore::new(backend, notifier, config.generation.clone());
            commands::models::handle_models(command, &mut models).await?;
            Ok(())
        }
        Commands::Settings => {
            commands::settings::show_settings(&config, &config.generation);
            Ok(())
        }
        Commands::Stats { watch } => {
            let interval = Duration::from_secs(config.stats.poll_interval_seconds);
            commands::stats::run_stats(backend.as_ref(), watch, interval).await?;
            Ok(())
        }
        Commands::Status => {
            commands::status::show_status(backend.as_ref()).await?;
            Ok(())
        }
        Commands::Resources { tab } => {
            commands::resources::show_resources(tab);
            Ok(())
        }
    }
}

/// Open the conversation store on the configured database
fn open_conversations(config: &Config) -> Result<ConversationStore> {
    let storage = open_storage(&config.storage)?;
    Ok(ConversationStore::open(storage))
}

/// Initialize tracing subscriber
///
/// `RUST_LOG` takes precedence; otherwise `turbopech=info`, or
/// `turbopech=debug` with `--verbose`. Logs go to stderr.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "turbopech=debug"
    } else {
        "turbopech=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
