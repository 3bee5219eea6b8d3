//! Model configuration store
//!
//! Mirrors the backend's model state (available models, active model, its
//! details) and owns the in-memory generation parameters.

use crate::backend::{Backend, ChangeModelRequest, LoadOptions, ModelDescriptor};
use crate::model_config::parameters::{GenerationParameters, ParameterUpdate};
use crate::notifications::{Notification, Notifier};
use std::sync::Arc;
use thiserror::Error;

/// Persistent problem observed while refreshing model information
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelInfoError {
    /// The backend answered but reported no model files
    #[error("No models found. Add model files to the backend's models directory.")]
    NoModels,

    /// The backend could not be reached or answered with an error
    #[error("Cannot reach the server. Check that the backend is running. ({0})")]
    Connection(String),
}

/// Reflects backend model state and local generation preferences
///
/// Constructed once at startup and handed to the views that need it.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use turbopech::backend::HttpBackend;
/// use turbopech::config::Config;
/// use turbopech::model_config::ModelStore;
/// use turbopech::notifications::TerminalNotifier;
///
/// # async fn example() -> turbopech::error::Result<()> {
/// let config = Config::default();
/// let backend = Arc::new(HttpBackend::new(config.backend.clone())?);
/// let mut store = ModelStore::new(backend, Arc::new(TerminalNotifier), config.generation);
/// store.fetch_model_info().await;
/// if let Some(error) = store.error() {
///     eprintln!("{}", error);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ModelStore {
    backend: Arc<dyn Backend>,
    notifier: Arc<dyn Notifier>,
    models: Vec<ModelDescriptor>,
    current_model: Option<String>,
    model_details: serde_json::Value,
    loading: bool,
    error: Option<ModelInfoError>,
    parameters: GenerationParameters,
}

impl ModelStore {
    /// Create a store with the given startup parameters
    pub fn new(
        backend: Arc<dyn Backend>,
        notifier: Arc<dyn Notifier>,
        parameters: GenerationParameters,
    ) -> Self {
        Self {
            backend,
            notifier,
            models: Vec::new(),
            current_model: None,
            model_details: serde_json::Value::Object(serde_json::Map::new()),
            loading: false,
            error: None,
            parameters,
        }
    }

    /// Refresh status and model list from the backend
    ///
    /// Never fails; problems are recorded in [`ModelStore::error`].
    pub async fn fetch_model_info(&mut self) {
        self.loading = true;

        if let Err(e) = self.refresh().await {
            tracing::error!("Failed to load model information: {:#}", e);
            self.error = Some(ModelInfoError::Connection(e.to_string()));
        }

        self.loading = false;
    }

    async fn refresh(&mut self) -> crate::error::Result<()> {
        let status = self.backend.status().await?;
        if status.is_model_loaded() {
            self.current_model = status.model_name();
            self.model_details = serde_json::to_value(&status)?;
        }

        let models = self.backend.list_models().await?;
        if models.is_empty() {
            tracing::warn!("Backend reported no models");
            self.error = Some(ModelInfoError::NoModels);
        } else {
            self.models = models;
            self.error = None;
        }

        Ok(())
    }

    /// Switch the backend to `file` with default load options
    ///
    /// Returns `false` without contacting the backend when `file` is empty.
    pub async fn change_model(&mut self, file: &str) -> bool {
        if file.is_empty() {
            return false;
        }

        self.loading = true;
        let result = self.backend.change_model(&ChangeModelRequest::new(file)).await;
        self.loading = false;

        match result {
            Ok(response) if response.is_success() => {
                self.current_model = Some(file.to_string());
                self.model_details = response.to_details();
                self.notifier.notify(Notification::success(
                    "Model loaded",
                    format!("The model was changed to {}", file),
                ));
                true
            }
            Ok(response) => {
                tracing::warn!("Model change answered with status: {}", response.status);
                false
            }
            Err(e) => {
                tracing::error!("Model change failed: {:#}", e);
                self.notifier.notify(Notification::error(
                    "Error",
                    format!("Could not change the model: {}", e),
                ));
                false
            }
        }
    }

    /// Switch the backend to `file` with explicit load options
    ///
    /// On success the model information is refreshed from the backend.
    pub async fn change_model_with_options(&mut self, file: &str, options: LoadOptions) -> bool {
        if file.is_empty() {
            return false;
        }

        self.loading = true;
        let result = self
            .backend
            .change_model(&ChangeModelRequest::with_options(file, options))
            .await;
        self.loading = false;

        match result {
            Ok(response) if response.is_success() => {
                self.notifier.notify(Notification::success(
                    "Success",
                    format!(
                        "The model was changed to {} (n_ctx={}, n_batch={}, n_gpu_layers={})",
                        file, options.n_ctx, options.n_batch, options.n_gpu_layers
                    ),
                ));
                self.fetch_model_info().await;
                true
            }
            Ok(response) => {
                tracing::warn!("Model change answered with status: {}", response.status);
                false
            }
            Err(e) => {
                tracing::error!("Model change with options failed: {:#}", e);
                self.notifier.notify(Notification::error(
                    "Error",
                    format!("Could not change the model: {}", e),
                ));
                false
            }
        }
    }

    /// Merge `update` into the generation parameters without validation
    pub fn update_parameters(&mut self, update: ParameterUpdate) {
        self.parameters.merge(update);
        tracing::debug!("Generation parameters now {:?}", self.parameters);
    }

    /// Prefix for the current tone, empty for the default tone
    pub fn tone_prompt(&self) -> &'static str {
        self.parameters.tone.prompt()
    }

    /// Models reported by the last successful refresh
    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    /// File name of the active model, if known
    pub fn current_model(&self) -> Option<&str> {
        self.current_model.as_deref()
    }

    /// Details from the last status or model-change response
    pub fn model_details(&self) -> &serde_json::Value {
        &self.model_details
    }

    /// Whether a backend request is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Current error state, if any
    pub fn error(&self) -> Option<&ModelInfoError> {
        self.error.as_ref()
    }

    /// Current generation parameters
    pub fn parameters(&self) -> &GenerationParameters {
        &self.parameters
    }

    /// Backend handle shared with the views
    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    /// Notifier shared with the views
    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.notifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_config::Tone;
    use crate::notifications::{MemoryNotifier, NotificationLevel};
    use crate::test_utils::FakeBackend;

    fn store_with(backend: FakeBackend) -> (ModelStore, Arc<FakeBackend>, Arc<MemoryNotifier>) {
        let backend = Arc::new(backend);
        let notifier = Arc::new(MemoryNotifier::default());
        let store = ModelStore::new(
            backend.clone(),
            notifier.clone(),
            GenerationParameters::default(),
        );
        (store, backend, notifier)
    }

    #[tokio::test]
    async fn test_fetch_model_info_populates_state() {
        let (mut store, _, _) = store_with(
            FakeBackend::default()
                .with_loaded_model("models/phi-2.gguf")
                .with_models(&["phi-2.gguf", "mistral.gguf"]),
        );

        store.fetch_model_info().await;

        assert!(!store.is_loading());
        assert!(store.error().is_none());
        assert_eq!(store.current_model(), Some("phi-2.gguf"));
        assert_eq!(store.models().len(), 2);
        assert_eq!(store.model_details()["status"], "Model loaded");
    }

    #[tokio::test]
    async fn test_fetch_model_info_empty_list_sets_no_models() {
        let (mut store, _, _) = store_with(FakeBackend::default());
        store.fetch_model_info().await;
        assert_eq!(store.error(), Some(&ModelInfoError::NoModels));
        assert!(store.current_model().is_none());
    }

    #[tokio::test]
    async fn test_fetch_model_info_unreachable_sets_connection_error() {
        let (mut store, _, _) = store_with(FakeBackend::unreachable());
        store.fetch_model_info().await;
        assert!(matches!(store.error(), Some(ModelInfoError::Connection(_))));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_fetch_model_info_clears_previous_error() {
        let (mut store, backend, _) = store_with(FakeBackend::default());
        store.fetch_model_info().await;
        assert_eq!(store.error(), Some(&ModelInfoError::NoModels));

        backend.set_models(&["tiny.gguf"]);
        store.fetch_model_info().await;
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn test_change_model_empty_file_is_noop() {
        let (mut store, backend, notifier) = store_with(FakeBackend::default());
        assert!(!store.change_model("").await);
        assert!(backend.change_requests().is_empty());
        assert!(notifier.take().is_empty());
    }

    #[tokio::test]
    async fn test_change_model_success_updates_and_notifies() {
        let (mut store, backend, notifier) =
            store_with(FakeBackend::default().with_models(&["phi-2.gguf"]));

        assert!(store.change_model("phi-2.gguf").await);
        assert_eq!(store.current_model(), Some("phi-2.gguf"));
        assert_eq!(
            store.model_details()["status"],
            "Model changed successfully"
        );

        let requests = backend.change_requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].options.is_none());

        let notes = notifier.take();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Success);
    }

    #[tokio::test]
    async fn test_change_model_failure_notifies_error() {
        let (mut store, _, notifier) = store_with(FakeBackend::unreachable());
        assert!(!store.change_model("phi-2.gguf").await);
        assert!(store.current_model().is_none());

        let notes = notifier.take();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Error);
    }

    #[tokio::test]
    async fn test_change_model_with_options_refreshes() {
        let (mut store, backend, notifier) = store_with(
            FakeBackend::default()
                .with_loaded_model("models/big.gguf")
                .with_models(&["big.gguf"]),
        );

        let options = LoadOptions {
            n_ctx: 2048,
            n_batch: 256,
            n_gpu_layers: 10,
        };
        assert!(store.change_model_with_options("big.gguf", options).await);
        assert_eq!(backend.change_requests()[0].options, Some(options));
        assert_eq!(store.models().len(), 1);
        assert_eq!(store.current_model(), Some("big.gguf"));
        assert_eq!(notifier.take()[0].level, NotificationLevel::Success);
    }

    #[test]
    fn test_update_parameters_and_tone_prompt() {
        let (mut store, _, _) = store_with(FakeBackend::default());
        assert_eq!(store.tone_prompt(), "");

        store.update_parameters(ParameterUpdate::default().with_tone(Tone::Teacher));
        assert_eq!(store.tone_prompt(), Tone::Teacher.prompt());

        store.update_parameters(ParameterUpdate::default().with_max_tokens(123_456));
        assert_eq!(store.parameters().max_tokens, 123_456);
        assert_eq!(store.parameters().tone, Tone::Teacher);
    }
}
