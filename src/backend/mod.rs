//! Inference backend client for TurboPech
//!
//! This module defines the [`Backend`] trait covering the five REST endpoints
//! the client consumes, and [`HttpBackend`], its reqwest implementation.
//! Stores and views only ever see the trait, so tests can swap in a fake.

pub mod types;

pub use types::{
    ChangeModelRequest, ChangeModelResponse, ChatChoice, ChatRequest, ChatResponse,
    ChoiceMessage, LoadOptions, MemoryStats, ModelDescriptor, ResponseStats, StatusResponse,
    SystemStats, WireMessage, STATUS_MODEL_CHANGED, STATUS_MODEL_LOADED,
};

use crate::config::BackendConfig;
use crate::error::{Result, TurboPechError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use types::{ChangeModelBody, ModelsResponse};

/// Operations offered by the inference server
///
/// Every method is a single request/response exchange; nothing is retried.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Query whether a model is loaded (`GET /status`)
    async fn status(&self) -> Result<StatusResponse>;

    /// List model files available to the server (`GET /models`)
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>>;

    /// Ask the server to load another model (`POST /change-model`)
    async fn change_model(&self, request: &ChangeModelRequest) -> Result<ChangeModelResponse>;

    /// Run a non-streaming chat completion (`POST /chat`)
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Host CPU and memory statistics (`GET /system-stats`)
    async fn system_stats(&self) -> Result<SystemStats>;
}

/// HTTP implementation of [`Backend`]
///
/// # Examples
///
/// ```no_run
/// use turbopech::backend::{Backend, HttpBackend};
/// use turbopech::config::BackendConfig;
///
/// # async fn example() -> turbopech::error::Result<()> {
/// let backend = HttpBackend::new(BackendConfig::default())?;
/// let status = backend.status().await?;
/// println!("{}", status.status);
/// # Ok(())
/// # }
/// ```
pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpBackend {
    /// Create a new backend client
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("turbopech/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TurboPechError::Backend(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized backend client: base_url={}, prefix={}",
            config.base_url,
            config.api_prefix
        );

        Ok(Self { client, config })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.config.endpoint(endpoint);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!("Request to {} failed: {}", url, e);
            TurboPechError::Backend(format!("Failed to connect to backend: {}", e))
        })?;

        Self::parse_response(endpoint, response).await
    }

    async fn parse_response<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Backend returned error {} on {}: {}", status, endpoint, body);
            return Err(TurboPechError::BackendStatus {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        response.json::<T>().await.map_err(|e| {
            tracing::error!("Failed to parse {} response: {}", endpoint, e);
            TurboPechError::Backend(format!("Failed to parse {} response: {}", endpoint, e)).into()
        })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn status(&self) -> Result<StatusResponse> {
        self.get_json("status").await
    }

    async fn list_models(&self) -> Result<Vec<ModelDescriptor>> {
        let response: ModelsResponse = self.get_json("models").await?;
        tracing::debug!("Fetched {} models from backend", response.models.len());
        Ok(response.models)
    }

    async fn change_model(&self, request: &ChangeModelRequest) -> Result<ChangeModelResponse> {
        let url = self.config.endpoint("change-model");
        tracing::info!("Requesting model change to {}", request.model_file);

        let builder = match request.options {
            None => self
                .client
                .post(&url)
                .query(&[("model_file", request.model_file.as_str())]),
            Some(options) => self.client.post(&url).json(&ChangeModelBody {
                model_file: &request.model_file,
                n_ctx: options.n_ctx,
                n_batch: options.n_batch,
                n_gpu_layers: options.n_gpu_layers,
            }),
        };

        let response = builder.send().await.map_err(|e| {
            tracing::warn!("Model change request failed: {}", e);
            TurboPechError::Backend(format!("Failed to connect to backend: {}", e))
        })?;

        Self::parse_response("change-model", response).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.config.endpoint("chat");
        tracing::debug!(
            "Sending chat request: {} messages, temperature={}, max_tokens={}",
            request.messages.len(),
            request.temperature,
            request.max_tokens
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Chat request failed: {}", e);
                TurboPechError::Backend(format!("Failed to connect to backend: {}", e))
            })?;

        Self::parse_response("chat", response).await
    }

    async fn system_stats(&self) -> Result<SystemStats> {
        self.get_json("system-stats").await
    }
}

/// Format a byte count for display
///
/// # Examples
///
/// ```
/// use turbopech::backend::format_size;
///
/// assert_eq!(format_size(1536), "1.5KB");
/// assert_eq!(format_size(8 * 1024 * 1024 * 1024), "8.0GB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.1}{}", size, UNITS[unit_idx])
}
