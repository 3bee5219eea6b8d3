//! TurboPech - terminal client library for a local LLM tutoring server
//!
//! This library provides the pieces behind the `turbopech` binary: the
//! backend REST client, the conversation and model configuration stores,
//! durable conversation storage, configuration, and the CLI command handlers.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `backend`: REST client for the inference server (`/status`, `/models`,
//!   `/change-model`, `/chat`, `/system-stats`)
//! - `conversation`: Conversation records, the conversation store, search,
//!   pagination and transcript export
//! - `model_config`: Model configuration store and generation parameters
//! - `storage`: Durable key/value storage (SQLite) for the conversation collection
//! - `notifications`: Success/error notifications for operation outcomes
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: Command handlers (chat REPL, history, models, stats, ...)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use turbopech::backend::HttpBackend;
//! use turbopech::conversation::{ChatMessage, ConversationStore};
//! use turbopech::model_config::ModelStore;
//! use turbopech::notifications::TerminalNotifier;
//! use turbopech::storage::open_storage;
//! use turbopech::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let backend = Arc::new(HttpBackend::new(config.backend.clone())?);
//!     let mut models = ModelStore::new(backend, Arc::new(TerminalNotifier), config.generation.clone());
//!     models.fetch_model_info().await;
//!
//!     let mut conversations = ConversationStore::open(open_storage(&config.storage)?);
//!     conversations.add_message(ChatMessage::user("What is a derivative?"));
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod error;
pub mod model_config;
pub mod notifications;
pub mod storage;

// Re-export commonly used types
pub use backend::{Backend, HttpBackend};
pub use config::Config;
pub use conversation::{ChatMessage, Conversation, ConversationStore, Role};
pub use error::{Result, TurboPechError};
pub use model_config::{GenerationParameters, ModelStore, Tone};

#[cfg(test)]
pub mod test_utils;
