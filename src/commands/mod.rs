/*!
Command handlers for the CLI

This module provides the handlers invoked by the CLI entrypoint:

- `chat`      - Interactive chat REPL
- `history`   - Saved conversation browsing and export
- `models`    - Model listing and switching
- `resources` - Static study resource catalog
- `settings`  - Effective configuration display
- `stats`     - Backend system statistics
- `status`    - Backend connectivity banner

Handlers receive the stores they need as explicit arguments.
*/

// Special commands parser for the chat REPL
pub mod special_commands;

pub mod history;
pub mod models;
pub mod resources;
pub mod settings;
pub mod stats;
pub mod status;

// Chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Runs a readline loop: slash commands act on the stores, anything else
    //! is recorded in the active conversation and sent to the model together
    //! with the conversation so far.

    use crate::backend::{ChatRequest, WireMessage};
    use crate::commands::history::export_to_file;
    use crate::commands::models::{print_model_summary, report_model_error, switch_model};
    use crate::commands::settings::format_parameters;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::commands::status::check_connection;
    use crate::conversation::{ChatMessage, ConversationStore};
    use crate::error::{Result, TurboPechError};
    use crate::model_config::{GenerationParameters, ModelStore};
    use crate::notifications::{Notification, Notifier};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use std::path::PathBuf;

    /// Result of one send
    #[derive(Debug, Clone, PartialEq)]
    pub enum SendOutcome {
        /// Blank input; nothing recorded or sent
        Ignored,
        /// The model answered; the reply is recorded
        Replied {
            /// Assistant reply text
            content: String,
            /// Server-reported generation time in seconds
            response_time: Option<f64>,
        },
        /// The request failed; the user message stays recorded
        Failed(String),
    }

    /// Build the chat request for the active conversation plus `outgoing`
    ///
    /// `history` is the conversation before the new message; `outgoing` is the
    /// user text with the tone prefix already applied.
    pub fn build_chat_request(
        history: &[ChatMessage],
        outgoing: &str,
        parameters: &GenerationParameters,
    ) -> ChatRequest {
        let mut messages: Vec<WireMessage> = history
            .iter()
            .map(|m| WireMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect();
        messages.push(WireMessage {
            role: "user".to_string(),
            content: outgoing.to_string(),
        });

        ChatRequest {
            messages,
            temperature: parameters.temperature,
            max_tokens: parameters.max_tokens,
            top_p: parameters.top_p,
            frequency_penalty: parameters.frequency_penalty,
            presence_penalty: parameters.presence_penalty,
            stream: false,
        }
    }

    /// Send one user message and record the reply
    ///
    /// The stored user message keeps the raw text; only the copy sent to the
    /// model carries the tone prefix. Failures are reported through the model
    /// store's notifier and never retried.
    pub async fn send_message(
        conversations: &mut ConversationStore,
        models: &ModelStore,
        input: &str,
    ) -> SendOutcome {
        let text = input.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        let history = conversations.current_messages().to_vec();
        conversations.add_message(ChatMessage::user(text));

        let outgoing = format!("{}{}", models.tone_prompt(), text);
        let request = build_chat_request(&history, &outgoing, models.parameters());
        tracing::debug!(
            "Sending {} messages (max_tokens={}, temperature={})",
            request.messages.len(),
            request.max_tokens,
            request.temperature
        );

        let result = models
            .backend()
            .chat(&request)
            .await
            .and_then(|response| {
                let content = response
                    .first_content()
                    .ok_or_else(|| TurboPechError::Backend("Response contained no choices".into()))?
                    .to_string();
                Ok((content, response.response_time()))
            });

        match result {
            Ok((content, response_time)) => {
                conversations.add_message(ChatMessage::assistant(content.clone()));
                SendOutcome::Replied {
                    content,
                    response_time,
                }
            }
            Err(e) => {
                tracing::error!("Chat request failed: {:#}", e);
                models.notifier().notify(Notification::error(
                    "Error",
                    "Could not get a response from the model",
                ));
                SendOutcome::Failed(e.to_string())
            }
        }
    }

    /// Start the interactive chat
    ///
    /// # Arguments
    ///
    /// * `conversations` - Conversation store
    /// * `models` - Model configuration store
    /// * `resume` - Optional id (or unique prefix) of a conversation to continue
    pub async fn run_chat(
        conversations: &mut ConversationStore,
        models: &mut ModelStore,
        resume: Option<String>,
    ) -> Result<()> {
        tracing::info!("Starting interactive chat");

        if let Some(id) = resume {
            let id = conversations.resolve_id(&id)?;
            conversations.load_conversation(&id);
        }

        let mut rl = DefaultEditor::new()?;

        models.fetch_model_info().await;
        print_welcome_banner(models).await;
        if let Some(conversation) = conversations.current_conversation() {
            println!("{} {}\n", "Resuming:".bold(), conversation.title);
            for message in &conversation.messages {
                print_message(message);
            }
        }

        loop {
            match rl.readline(&format!("{} ", "you>".cyan().bold())) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::None => {}
                        SpecialCommand::Exit => break,
                        other => {
                            handle_special_command(other, conversations, models).await;
                            continue;
                        }
                    }

                    println!("{}", "Sending...".dimmed());
                    match send_message(conversations, models, trimmed).await {
                        SendOutcome::Replied {
                            content,
                            response_time,
                        } => {
                            println!("\n{}\n{}\n", "Assistant".green().bold(), content);
                            if let Some(seconds) = response_time {
                                println!(
                                    "{}\n",
                                    format!("Response generated in {:.2} seconds", seconds)
                                        .dimmed()
                                );
                            }
                        }
                        SendOutcome::Failed(_) | SendOutcome::Ignored => println!(),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn handle_special_command(
        command: SpecialCommand,
        conversations: &mut ConversationStore,
        models: &mut ModelStore,
    ) {
        match command {
            SpecialCommand::NewConversation => {
                conversations.create_conversation();
                println!("{}\n", "Started a new conversation".green());
            }
            SpecialCommand::Export(path) => {
                export_active(conversations, models.notifier().as_ref(), path);
            }
            SpecialCommand::SetParameters(update) => {
                models.update_parameters(update);
                print!("{}", format_parameters(models.parameters()));
                println!();
            }
            SpecialCommand::ShowParameters => {
                print!("{}", format_parameters(models.parameters()));
                println!();
            }
            SpecialCommand::ShowModel => {
                models.fetch_model_info().await;
                print_model_summary(models);
            }
            SpecialCommand::SwitchModel(file) => {
                println!("{}", format!("Loading {}...", file).dimmed());
                switch_model(models, &file, None).await;
                println!();
            }
            SpecialCommand::ShowStatus => {
                let status = check_connection(models.backend().as_ref()).await;
                println!("{}\n", status.colored());
            }
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit | SpecialCommand::None => {}
        }
    }

    /// Export the active conversation, refusing when it has no messages
    ///
    /// Returns the path written.
    pub fn export_active(
        conversations: &ConversationStore,
        notifier: &dyn Notifier,
        path: Option<PathBuf>,
    ) -> Option<PathBuf> {
        let Some(id) = conversations
            .current_conversation()
            .filter(|c| !c.messages.is_empty())
            .map(|c| c.id.clone())
        else {
            notifier.notify(Notification::info(
                "Nothing to export",
                "The conversation has no messages yet",
            ));
            return None;
        };

        match export_to_file(conversations, Some(&id), path) {
            Ok(path) => {
                notifier.notify(Notification::success(
                    "Exported",
                    format!("Conversation saved to {}", path.display()),
                ));
                Some(path)
            }
            Err(e) => {
                notifier.notify(Notification::error(
                    "Error",
                    format!("Could not export the conversation: {:#}", e),
                ));
                None
            }
        }
    }

    async fn print_welcome_banner(models: &ModelStore) {
        println!("\n{}", "TurboPech - your study assistant".bold());
        println!(
            "{}",
            check_connection(models.backend().as_ref()).await.colored()
        );
        report_model_error(models);
        println!(
            "Tone: {}   Temperature: {}   Max tokens: {}",
            models.parameters().tone.label(),
            models.parameters().temperature,
            models.parameters().max_tokens
        );
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    fn print_message(message: &ChatMessage) {
        let label = match message.role {
            crate::conversation::Role::User => message.role.label().cyan().bold(),
            crate::conversation::Role::Assistant => message.role.label().green().bold(),
        };
        println!("{}\n{}\n", label, message.content);
    }

}
