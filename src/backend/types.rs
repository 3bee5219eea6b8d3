//! Wire types for the inference backend's REST API

use serde::{Deserialize, Serialize};

/// Status string the backend reports when a model is in memory
pub const STATUS_MODEL_LOADED: &str = "Model loaded";

/// Status string the backend reports after a successful model switch
pub const STATUS_MODEL_CHANGED: &str = "Model changed successfully";

/// Response from `GET /status`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    /// `"Model loaded"` or another free-form status
    pub status: String,
    /// Path of the loaded model file, when one is loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
    /// Everything else the backend reports (load time, context size, stats)
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl StatusResponse {
    /// Whether the backend reports a loaded model
    pub fn is_model_loaded(&self) -> bool {
        self.status == STATUS_MODEL_LOADED
    }

    /// File name of the loaded model (last path segment of `model_path`)
    ///
    /// # Examples
    ///
    /// ```
    /// use turbopech::backend::StatusResponse;
    ///
    /// let status: StatusResponse = serde_json::from_str(
    ///     r#"{"status": "Model loaded", "model_path": "models/mistral-7b.gguf"}"#,
    /// ).unwrap();
    /// assert_eq!(status.model_name().as_deref(), Some("mistral-7b.gguf"));
    /// ```
    pub fn model_name(&self) -> Option<String> {
        self.model_path
            .as_deref()
            .and_then(|path| path.rsplit('/').next())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

/// Backend-reported metadata about an available model file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelDescriptor {
    /// Model file name, used as the identifier when switching
    pub filename: String,
    /// File size in gigabytes
    #[serde(default)]
    pub size_gb: f64,
    /// Whether this is the model currently loaded
    #[serde(default)]
    pub is_active: bool,
    /// Full path on the backend host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Response from `GET /models`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ModelsResponse {
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

/// Load options for the JSON form of `POST /change-model`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadOptions {
    /// Context window size
    pub n_ctx: u32,
    /// Prompt batch size
    pub n_batch: u32,
    /// Number of layers offloaded to the GPU
    pub n_gpu_layers: u32,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            n_ctx: 4096,
            n_batch: 512,
            n_gpu_layers: 0,
        }
    }
}

/// A model switch request
///
/// Without options the file name travels as the `model_file` query
/// parameter; with options the request carries a JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeModelRequest {
    /// Model file name to load
    pub model_file: String,
    /// Optional advanced load options
    pub options: Option<LoadOptions>,
}

impl ChangeModelRequest {
    /// Switch with the backend's default load options
    pub fn new(model_file: impl Into<String>) -> Self {
        Self {
            model_file: model_file.into(),
            options: None,
        }
    }

    /// Switch with explicit load options
    pub fn with_options(model_file: impl Into<String>, options: LoadOptions) -> Self {
        Self {
            model_file: model_file.into(),
            options: Some(options),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChangeModelBody<'a> {
    pub model_file: &'a str,
    pub n_ctx: u32,
    pub n_batch: u32,
    pub n_gpu_layers: u32,
}

/// Response from `POST /change-model`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeModelResponse {
    /// `"Model changed successfully"` on success
    pub status: String,
    /// Remaining details (model path, load time, n_ctx, ...)
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl ChangeModelResponse {
    /// Whether the backend confirmed the switch
    pub fn is_success(&self) -> bool {
        self.status == STATUS_MODEL_CHANGED
    }

    /// The whole response as a JSON object, status included
    pub fn to_details(&self) -> serde_json::Value {
        let mut map = self.details.clone();
        map.insert(
            "status".to_string(),
            serde_json::Value::String(self.status.clone()),
        );
        serde_json::Value::Object(map)
    }
}

/// A `{role, content}` pair as sent to `/chat`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireMessage {
    /// `user` or `assistant`
    pub role: String,
    /// Message text
    pub content: String,
}

/// Request body for `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    /// Conversation so far, oldest first
    pub messages: Vec<WireMessage>,
    /// Sampling temperature
    pub temperature: f64,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Nucleus sampling threshold
    pub top_p: f64,
    /// Frequency penalty
    pub frequency_penalty: f64,
    /// Presence penalty
    pub presence_penalty: f64,
    /// Always `false`; streaming is not used
    pub stream: bool,
}

/// Response from `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    /// Completion choices; only the first is used
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    /// Timing information added by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ResponseStats>,
}

impl ChatResponse {
    /// Content of the first choice, if any
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|choice| choice.message.content.as_str())
    }

    /// Server-side generation time in seconds
    pub fn response_time(&self) -> Option<f64> {
        self.stats.as_ref().and_then(|s| s.response_time)
    }
}

/// A single completion choice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatChoice {
    /// Generated message
    pub message: ChoiceMessage,
}

/// Message body inside a completion choice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChoiceMessage {
    /// Generated text
    #[serde(default)]
    pub content: String,
}

/// Per-response statistics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseStats {
    /// Generation time in seconds
    #[serde(default)]
    pub response_time: Option<f64>,
    /// Length of the generated message in characters
    #[serde(default)]
    pub message_length: Option<u64>,
}

/// Response from `GET /system-stats`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemStats {
    /// CPU utilisation percentage
    pub cpu_percent: f64,
    /// Platform description string
    #[serde(default)]
    pub platform: String,
    /// Memory usage
    pub memory: MemoryStats,
    /// Interpreter version of the backend process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python_version: Option<String>,
    /// Host uptime in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<f64>,
}

/// Memory section of [`SystemStats`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryStats {
    /// Total memory in bytes
    pub total: u64,
    /// Available memory in bytes
    pub available: u64,
    /// Used percentage
    pub percent: f64,
    /// Used memory in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used: Option<u64>,
}
