//! Model management commands for TurboPech
//!
//! Listing the model files the backend can load, showing the active model,
//! and switching models with default or explicit load options.

use crate::backend::LoadOptions;
use crate::cli::ModelCommand;
use crate::error::Result;
use crate::model_config::{ModelInfoError, ModelStore};
use crate::notifications::Notification;
use colored::Colorize;
use prettytable::{format, row, Table};

/// Handle `models` subcommands
pub async fn handle_models(command: ModelCommand, store: &mut ModelStore) -> Result<()> {
    match command {
        ModelCommand::List => {
            store.fetch_model_info().await;
            print_model_summary(store);
        }
        ModelCommand::Current => {
            store.fetch_model_info().await;
            print_current_model(store);
        }
        ModelCommand::Switch {
            file,
            n_ctx,
            n_batch,
            n_gpu_layers,
        } => {
            switch_model(store, &file, load_options(n_ctx, n_batch, n_gpu_layers)).await;
        }
    }
    Ok(())
}

/// Explicit load options when any advanced value is given
///
/// Missing values take the advanced-settings defaults.
///
/// # Examples
///
/// ```
/// use turbopech::commands::models::load_options;
///
/// assert!(load_options(None, None, None).is_none());
/// let options = load_options(Some(8192), None, None).unwrap();
/// assert_eq!((options.n_ctx, options.n_batch, options.n_gpu_layers), (8192, 512, 0));
/// ```
pub fn load_options(
    n_ctx: Option<u32>,
    n_batch: Option<u32>,
    n_gpu_layers: Option<u32>,
) -> Option<LoadOptions> {
    if n_ctx.is_none() && n_batch.is_none() && n_gpu_layers.is_none() {
        return None;
    }

    let defaults = LoadOptions::default();
    Some(LoadOptions {
        n_ctx: n_ctx.unwrap_or(defaults.n_ctx),
        n_batch: n_batch.unwrap_or(defaults.n_batch),
        n_gpu_layers: n_gpu_layers.unwrap_or(defaults.n_gpu_layers),
    })
}

/// Switch models, reporting failure through the store's notifier
///
/// Returns whether the backend accepted the change.
pub async fn switch_model(store: &mut ModelStore, file: &str, options: Option<LoadOptions>) -> bool {
    let file = file.trim();
    tracing::info!("Switching model to {}", file);

    let changed = match options {
        Some(options) => store.change_model_with_options(file, options).await,
        None => store.change_model(file).await,
    };

    if !changed {
        store
            .notifier()
            .notify(Notification::error("Error", "Could not change the model"));
    }
    changed
}

/// Report the store's model information error, if any
///
/// A missing model list is informational and goes through the notifier;
/// a connection problem is printed as a red status line.
pub fn report_model_error(store: &ModelStore) {
    match store.error() {
        Some(error @ ModelInfoError::NoModels) => store
            .notifier()
            .notify(Notification::info("No models", error.to_string())),
        Some(error @ ModelInfoError::Connection(_)) => eprintln!("{}", error.to_string().red()),
        None => {}
    }
}

/// Print the active model and the table of available models
pub fn print_model_summary(store: &ModelStore) {
    report_model_error(store);

    if store.models().is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row![b->"Model File", b->"Size", b->"Active"]);

    for model in store.models() {
        let active = model.is_active || store.current_model() == Some(model.filename.as_str());
        table.add_row(row![
            model.filename,
            format!("{:.2} GB", model.size_gb),
            if active { "yes" } else { "" }
        ]);
    }

    println!("\nAvailable models:");
    table.printstd();
    println!(
        "Current model: {}\n",
        store
            .current_model()
            .map(|m| m.green().to_string())
            .unwrap_or_else(|| "none".dimmed().to_string())
    );
}

fn print_current_model(store: &ModelStore) {
    match store.current_model() {
        Some(model) => {
            println!("Current model: {}", model.green());
            if let serde_json::Value::Object(details) = store.model_details() {
                for (key, value) in details {
                    if key == "status" {
                        continue;
                    }
                    let rendered = match value {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    println!("  {:<14} {}", key, rendered);
                }
            }
        }
        None => {
            if store.error().is_some() {
                report_model_error(store);
            } else {
                println!("{}", "No model loaded".yellow());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_config::GenerationParameters;
    use crate::notifications::{MemoryNotifier, NotificationLevel};
    use crate::test_utils::FakeBackend;
    use std::sync::Arc;

    fn store(backend: FakeBackend) -> (ModelStore, Arc<FakeBackend>, Arc<MemoryNotifier>) {
        let backend = Arc::new(backend);
        let notifier = Arc::new(MemoryNotifier::default());
        let store = ModelStore::new(
            backend.clone(),
            notifier.clone(),
            GenerationParameters::default(),
        );
        (store, backend, notifier)
    }

    #[test]
    fn test_load_options_fills_defaults() {
        let options = load_options(None, Some(256), Some(20)).unwrap();
        assert_eq!(options.n_ctx, 4096);
        assert_eq!(options.n_batch, 256);
        assert_eq!(options.n_gpu_layers, 20);
    }

    #[tokio::test]
    async fn test_switch_model_plain_uses_query_request() {
        let (mut store, backend, _) = store(FakeBackend::default().with_models(&["a.gguf"]));

        assert!(switch_model(&mut store, "a.gguf", None).await);
        let requests = backend.change_requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].options.is_none());
        assert_eq!(store.current_model(), Some("a.gguf"));
    }

    #[tokio::test]
    async fn test_switch_model_with_options() {
        let (mut store, backend, _) = store(FakeBackend::default().with_models(&["b.gguf"]));
        let options = load_options(Some(2048), None, None);

        assert!(switch_model(&mut store, "b.gguf", options).await);
        assert_eq!(backend.change_requests()[0].options, options);
        assert_eq!(store.current_model(), Some("b.gguf"));
    }

    #[tokio::test]
    async fn test_switch_model_failure_notifies() {
        let (mut store, _, notifier) = store(FakeBackend::unreachable());

        assert!(!switch_model(&mut store, "c.gguf", None).await);
        let notes = notifier.take();
        assert!(!notes.is_empty());
        assert!(notes.iter().all(|n| n.level == NotificationLevel::Error));
        assert_eq!(notes.last().unwrap().message, "Could not change the model");
    }

    #[tokio::test]
    async fn test_no_models_is_reported_as_info() {
        let (mut store, _, notifier) = store(FakeBackend::default());
        store.fetch_model_info().await;
        assert_eq!(store.error(), Some(&ModelInfoError::NoModels));

        report_model_error(&store);
        let notes = notifier.take();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Info);
        assert!(notes[0].message.starts_with("No models found"));
    }

    #[tokio::test]
    async fn test_connection_error_is_not_a_notification() {
        let (mut store, _, notifier) = store(FakeBackend::unreachable());
        store.fetch_model_info().await;

        report_model_error(&store);
        assert!(notifier.take().is_empty());
    }

    #[tokio::test]
    async fn test_switch_model_empty_file_does_not_call_backend() {
        let (mut store, backend, _) = store(FakeBackend::default());
        assert!(!switch_model(&mut store, "  ", None).await);
        assert!(backend.change_requests().is_empty());
    }
}
