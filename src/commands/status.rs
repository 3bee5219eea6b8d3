//! Backend connectivity status

use crate::backend::{Backend, StatusResponse};
use crate::error::Result;
use colored::Colorize;
use std::fmt;

/// What the status banner reports about the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// A model is loaded; holds its file name
    Loaded(String),
    /// The backend is up but has no model in memory
    NotLoaded,
    /// The backend could not be reached
    Unreachable,
}

impl ConnectionStatus {
    /// Classify a `/status` response
    pub fn from_response(status: &StatusResponse) -> Self {
        if status.is_model_loaded() {
            Self::Loaded(status.model_name().unwrap_or_else(|| "unknown".to_string()))
        } else {
            Self::NotLoaded
        }
    }

    /// Banner text with a colour matching the state
    pub fn colored(&self) -> colored::ColoredString {
        match self {
            Self::Loaded(_) => self.to_string().green(),
            Self::NotLoaded => self.to_string().yellow(),
            Self::Unreachable => self.to_string().red(),
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded(name) => write!(f, "Model loaded: {}", name),
            Self::NotLoaded => write!(f, "Model not loaded"),
            Self::Unreachable => write!(f, "Cannot reach the server"),
        }
    }
}

/// Query the backend and classify the answer
pub async fn check_connection(backend: &dyn Backend) -> ConnectionStatus {
    match backend.status().await {
        Ok(status) => ConnectionStatus::from_response(&status),
        Err(e) => {
            tracing::warn!("Status check failed: {:#}", e);
            ConnectionStatus::Unreachable
        }
    }
}

/// Print the status banner followed by any extra details the backend reports
pub async fn show_status(backend: &dyn Backend) -> Result<()> {
    match backend.status().await {
        Ok(status) => {
            println!("{}", ConnectionStatus::from_response(&status).colored());
            if let Some(path) = &status.model_path {
                println!("  {:<14} {}", "model_path", path);
            }
            for (key, value) in &status.details {
                let rendered = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                println!("  {:<14} {}", key, rendered);
            }
        }
        Err(e) => {
            tracing::warn!("Status check failed: {:#}", e);
            println!("{}", ConnectionStatus::Unreachable.colored());
            println!("  {}", format!("{:#}", e).dimmed());
        }
    }
    Ok(())
}
