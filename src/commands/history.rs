//! Conversation history commands
//!
//! Listing, searching, viewing, renaming, deleting and exporting saved
//! conversations.

use crate::cli::HistoryCommand;
use crate::config::HistoryConfig;
use crate::conversation::{
    export_file_name, filter_conversations, paginate, Conversation, ConversationStore,
};
use crate::error::{Result, TurboPechError};
use anyhow::Context;
use chrono::{Local, Utc};
use colored::Colorize;
use prettytable::{format, Table};
use std::path::{Path, PathBuf};

/// Longest title shown in the history table
const TABLE_TITLE_CHARS: usize = 40;

/// Handle history commands
pub fn handle_history(
    command: HistoryCommand,
    store: &mut ConversationStore,
    config: &HistoryConfig,
) -> Result<()> {
    match command {
        HistoryCommand::List { search, page } => {
            list_conversations(store, search.as_deref().unwrap_or(""), page, config.page_size);
        }
        HistoryCommand::Show { id } => {
            let id = store.resolve_id(&id)?;
            let conversation = store
                .get(&id)
                .ok_or_else(|| TurboPechError::NotFound(format!("Conversation not found: {}", id)))?;
            print!("{}", format_conversation(conversation));
        }
        HistoryCommand::Delete { id } => match store.resolve_id(&id) {
            Ok(id) => {
                store.delete_conversation(&id);
                println!("{}", format!("Deleted conversation {}", id).green());
            }
            Err(e) => println!("{}", format!("Nothing deleted: {}", e).yellow()),
        },
        HistoryCommand::Rename { id, title } => match store.resolve_id(&id) {
            Ok(id) => {
                store.update_conversation_title(&id, &title);
                println!("{}", format!("Renamed conversation {} to \"{}\"", id, title).green());
            }
            Err(e) => println!("{}", format!("Nothing renamed: {}", e).yellow()),
        },
        HistoryCommand::Export { id, output } => {
            let id = store.resolve_id(&id)?;
            let path = export_to_file(store, Some(&id), output)?;
            println!(
                "{}",
                format!("Exported conversation to {}", path.display()).green()
            );
        }
    }

    Ok(())
}

fn list_conversations(store: &ConversationStore, search: &str, page: usize, page_size: usize) {
    let matched = filter_conversations(store.conversations(), search);

    if matched.is_empty() {
        if search.trim().is_empty() {
            println!("{}", "No conversation history found.".yellow());
        } else {
            println!(
                "{}",
                format!("No conversations match \"{}\".", search.trim()).yellow()
            );
        }
        return;
    }

    let page = paginate(&matched, page, page_size);

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "ID".bold(),
        "Title".bold(),
        "Messages".bold(),
        "Date".bold()
    ]);

    for conversation in page.items {
        let date = conversation
            .date
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string();

        table.add_row(prettytable::row![
            conversation.id.cyan(),
            shorten(&conversation.title, TABLE_TITLE_CHARS),
            conversation.messages.len(),
            date
        ]);
    }

    println!("\nConversation History:");
    table.printstd();
    println!(
        "Page {} of {} ({} conversations)",
        page.number, page.total_pages, page.total_items
    );
    println!();
    println!(
        "Use {} to resume a conversation.",
        "turbopech chat --resume <ID>".cyan()
    );
    println!();
}

/// Render a conversation for the terminal
pub fn format_conversation(conversation: &Conversation) -> String {
    let mut out = format!(
        "{}\n{} {}\n{} {}\n\n",
        conversation.title.bold(),
        "ID:".dimmed(),
        conversation.id,
        "Date:".dimmed(),
        conversation
            .date
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
    );

    if conversation.messages.is_empty() {
        out.push_str(&format!("{}\n", "(no messages)".dimmed()));
    }

    for message in &conversation.messages {
        out.push_str(&format!(
            "{}\n{}\n\n",
            message.role.label().cyan().bold(),
            message.content
        ));
    }

    out
}

/// Write a conversation transcript to `output`, or to
/// `conversation-<today>.md` when no path is given
///
/// Returns the path written.
pub fn export_to_file(
    store: &ConversationStore,
    id: Option<&str>,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    let path = output.unwrap_or_else(default_export_path);
    write_transcript(&path, &store.export_conversation(id))?;
    tracing::info!("Exported conversation to {}", path.display());
    Ok(path)
}

/// `conversation-<YYYY-MM-DD>.md` in the working directory, dated in UTC
pub fn default_export_path() -> PathBuf {
    PathBuf::from(export_file_name(Utc::now().date_naive()))
}

fn write_transcript(path: &Path, transcript: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    std::fs::write(path, transcript)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars - 3).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
