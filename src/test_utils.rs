//! Test utilities for TurboPech
//!
//! Provides an in-process [`FakeBackend`] so stores and views can be
//! exercised without a server, plus small assertion helpers.

use crate::backend::{
    Backend, ChangeModelRequest, ChangeModelResponse, ChatChoice, ChatRequest, ChatResponse,
    ChoiceMessage, MemoryStats, ModelDescriptor, ResponseStats, StatusResponse, SystemStats,
    STATUS_MODEL_CHANGED, STATUS_MODEL_LOADED,
};
use crate::error::{Result, TurboPechError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted stand-in for the inference server
#[derive(Default)]
pub struct FakeBackend {
    unreachable: bool,
    loaded_model: Mutex<Option<String>>,
    models: Mutex<Vec<ModelDescriptor>>,
    replies: Mutex<VecDeque<String>>,
    chat_requests: Mutex<Vec<ChatRequest>>,
    change_requests: Mutex<Vec<ChangeModelRequest>>,
}

impl FakeBackend {
    /// A backend whose every call fails as if the server were down
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }

    /// Report `path` as the loaded model
    pub fn with_loaded_model(self, path: &str) -> Self {
        *self.loaded_model.lock().unwrap() = Some(path.to_string());
        self
    }

    /// Report the given model files
    pub fn with_models(self, files: &[&str]) -> Self {
        self.set_models(files);
        self
    }

    /// Queue an assistant reply for the next chat call
    pub fn with_reply(self, content: &str) -> Self {
        self.replies.lock().unwrap().push_back(content.to_string());
        self
    }

    /// Replace the reported model files
    pub fn set_models(&self, files: &[&str]) {
        *self.models.lock().unwrap() = files
            .iter()
            .map(|f| ModelDescriptor {
                filename: f.to_string(),
                size_gb: 4.1,
                is_active: false,
                path: Some(format!("models/{}", f)),
            })
            .collect();
    }

    /// Chat requests received so far
    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().unwrap().clone()
    }

    /// Model change requests received so far
    pub fn change_requests(&self) -> Vec<ChangeModelRequest> {
        self.change_requests.lock().unwrap().clone()
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable {
            return Err(TurboPechError::Backend("connection refused".to_string()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn status(&self) -> Result<StatusResponse> {
        self.check_reachable()?;
        let loaded = self.loaded_model.lock().unwrap().clone();
        Ok(StatusResponse {
            status: if loaded.is_some() {
                STATUS_MODEL_LOADED.to_string()
            } else {
                "Model not loaded".to_string()
            },
            model_path: loaded,
            details: serde_json::Map::new(),
        })
    }

    async fn list_models(&self) -> Result<Vec<ModelDescriptor>> {
        self.check_reachable()?;
        Ok(self.models.lock().unwrap().clone())
    }

    async fn change_model(&self, request: &ChangeModelRequest) -> Result<ChangeModelResponse> {
        self.change_requests.lock().unwrap().push(request.clone());
        self.check_reachable()?;
        *self.loaded_model.lock().unwrap() = Some(format!("models/{}", request.model_file));

        let mut details = serde_json::Map::new();
        details.insert(
            "model_name".to_string(),
            serde_json::Value::String(request.model_file.clone()),
        );
        Ok(ChangeModelResponse {
            status: STATUS_MODEL_CHANGED.to_string(),
            details,
        })
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.chat_requests.lock().unwrap().push(request.clone());
        self.check_reachable()?;
        let content = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "ok".to_string());
        Ok(ChatResponse {
            choices: vec![ChatChoice {
                message: ChoiceMessage { content },
            }],
            stats: Some(ResponseStats {
                response_time: Some(0.5),
                message_length: None,
            }),
        })
    }

    async fn system_stats(&self) -> Result<SystemStats> {
        self.check_reachable()?;
        Ok(SystemStats {
            cpu_percent: 12.5,
            platform: "Linux-test".to_string(),
            memory: MemoryStats {
                total: 16 * 1024 * 1024 * 1024,
                available: 8 * 1024 * 1024 * 1024,
                percent: 50.0,
                used: None,
            },
            python_version: None,
            uptime: None,
        })
    }
}

/// Assert that an error renders a message containing `expected`
///
/// # Panics
///
/// Panics if the result is Ok or the message does not match
pub fn assert_error_contains<T: std::fmt::Debug>(result: Result<T>, expected: &str) {
    match result {
        Ok(value) => panic!("Expected error containing '{}', got Ok({:?})", expected, value),
        Err(e) => {
            let message = format!("{:#}", e);
            assert!(
                message.contains(expected),
                "Expected error containing '{}', got '{}'",
                expected,
                message
            );
        }
    }
}
