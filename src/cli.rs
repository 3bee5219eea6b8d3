//! Command-line interface definition for TurboPech
//!
//! This module defines the CLI structure using clap's derive API: the chat
//! REPL, conversation history, model management, system statistics and the
//! study resource catalog.

use crate::commands::resources::ResourceTab;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// TurboPech - terminal client for a local LLM tutoring server
///
/// Chat with the loaded model, browse saved conversations and switch models.
#[derive(Parser, Debug, Clone)]
#[command(name = "turbopech")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the backend base URL (e.g. http://localhost:3000)
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Override the conversation history database path
    #[arg(long, global = true)]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for TurboPech
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Resume a saved conversation by id (or unique id prefix)
        #[arg(short, long)]
        resume: Option<String>,
    },

    /// Browse and manage saved conversations
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Manage backend models
    Models {
        /// Model management subcommand
        #[command(subcommand)]
        command: ModelCommand,
    },

    /// Show the effective generation parameters and backend settings
    Settings,

    /// Show backend system statistics
    Stats {
        /// Keep polling at the configured interval
        #[arg(short, long)]
        watch: bool,
    },

    /// Show backend connectivity and model status
    Status,

    /// Show the study resource catalog
    Resources {
        /// Catalog section to show (all sections when omitted)
        #[arg(short, long, value_enum)]
        tab: Option<ResourceTab>,
    },
}

/// Conversation history subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List saved conversations, newest first
    List {
        /// Only show conversations whose title or messages contain this text
        #[arg(short, long)]
        search: Option<String>,

        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },

    /// Show a conversation's messages
    Show {
        /// Conversation id (or unique id prefix)
        id: String,
    },

    /// Delete a conversation
    Delete {
        /// Conversation id (or unique id prefix)
        id: String,
    },

    /// Rename a conversation
    Rename {
        /// Conversation id (or unique id prefix)
        id: String,

        /// New title
        title: String,
    },

    /// Export a conversation as a Markdown transcript
    Export {
        /// Conversation id (or unique id prefix)
        id: String,

        /// Output file (defaults to conversation-<date>.md)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Model management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ModelCommand {
    /// List model files available on the backend
    List,

    /// Show the currently loaded model
    Current,

    /// Load a different model file
    Switch {
        /// Model file name as reported by `models list`
        file: String,

        /// Context window size (enables advanced loading)
        #[arg(long)]
        n_ctx: Option<u32>,

        /// Batch size (enables advanced loading)
        #[arg(long)]
        n_batch: Option<u32>,

        /// Layers to offload to the GPU (enables advanced loading)
        #[arg(long)]
        n_gpu_layers: Option<u32>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
