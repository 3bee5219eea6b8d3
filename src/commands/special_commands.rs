//! Special commands parser for the interactive chat
//!
//! Slash commands let the user start a new conversation, export the current
//! one, adjust generation parameters, inspect or switch the loaded model, and
//! leave the session without sending anything to the model.
//!
//! Command names are case-insensitive; arguments keep their case.

use crate::model_config::{
    parse_max_tokens, parse_penalty, parse_temperature, parse_top_p, ParameterUpdate, Tone,
};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },

    /// Command argument could not be accepted
    #[error("Invalid value for {command}: {reason}")]
    InvalidValue { command: String, reason: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq)]
pub enum SpecialCommand {
    /// Start a fresh conversation
    NewConversation,

    /// Write the current conversation transcript to a file
    ///
    /// Defaults to `conversation-<date>.md` in the working directory.
    Export(Option<PathBuf>),

    /// Change one generation parameter
    SetParameters(ParameterUpdate),

    /// Show the current generation parameters
    ShowParameters,

    /// Show the loaded model and the available ones
    ShowModel,

    /// Load a different model file
    SwitchModel(String),

    /// Show backend connectivity status
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the session
    Exit,

    /// Not a special command; send the input to the model
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for unrecognised `/` commands,
/// `CommandError::MissingArgument` when a required value is absent and
/// `CommandError::InvalidValue` when a value is outside its allowed range.
///
/// # Examples
///
/// ```
/// use turbopech::commands::special_commands::{parse_special_command, SpecialCommand};
/// use turbopech::model_config::ParameterUpdate;
///
/// let cmd = parse_special_command("/temperature 0.5").unwrap();
/// assert_eq!(
///     cmd,
///     SpecialCommand::SetParameters(ParameterUpdate::default().with_temperature(0.5))
/// );
///
/// let cmd = parse_special_command("What is a fraction?").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if lower == "exit" || lower == "quit" {
        return Ok(SpecialCommand::Exit);
    }
    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let (name, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match name.as_str() {
        "/new" => Ok(SpecialCommand::NewConversation),
        "/export" => Ok(SpecialCommand::Export(
            (!arg.is_empty()).then(|| PathBuf::from(arg)),
        )),

        "/temperature" | "/temp" => {
            let value = required(&name, arg, "/temperature <0.0-1.0>")?;
            let temperature = parse_temperature(value).map_err(|e| invalid(&name, e))?;
            Ok(SpecialCommand::SetParameters(
                ParameterUpdate::default().with_temperature(temperature),
            ))
        }
        "/max-tokens" => {
            let value = required(&name, arg, "/max-tokens <500|1000|2000|4000>")?;
            let max_tokens = parse_max_tokens(value).map_err(|e| invalid(&name, e))?;
            Ok(SpecialCommand::SetParameters(
                ParameterUpdate::default().with_max_tokens(max_tokens),
            ))
        }
        "/top-p" => {
            let value = required(&name, arg, "/top-p <0.0-1.0>")?;
            let top_p = parse_top_p(value).map_err(|e| invalid(&name, e))?;
            Ok(SpecialCommand::SetParameters(
                ParameterUpdate::default().with_top_p(top_p),
            ))
        }
        "/frequency-penalty" => {
            let value = required(&name, arg, "/frequency-penalty <0.0-2.0>")?;
            let penalty =
                parse_penalty("frequency_penalty", value).map_err(|e| invalid(&name, e))?;
            Ok(SpecialCommand::SetParameters(
                ParameterUpdate::default().with_frequency_penalty(penalty),
            ))
        }
        "/presence-penalty" => {
            let value = required(&name, arg, "/presence-penalty <0.0-2.0>")?;
            let penalty =
                parse_penalty("presence_penalty", value).map_err(|e| invalid(&name, e))?;
            Ok(SpecialCommand::SetParameters(
                ParameterUpdate::default().with_presence_penalty(penalty),
            ))
        }
        "/tone" => {
            let value = required(&name, arg, "/tone <default|teacher|simple|detailed>")?;
            let tone = Tone::parse_str(value).map_err(|e| invalid(&name, e))?;
            Ok(SpecialCommand::SetParameters(
                ParameterUpdate::default().with_tone(tone),
            ))
        }
        "/params" | "/parameters" => Ok(SpecialCommand::ShowParameters),

        "/model" | "/models" if arg.is_empty() => Ok(SpecialCommand::ShowModel),
        "/model" | "/models" => Ok(SpecialCommand::SwitchModel(arg.to_string())),

        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        _ => Err(CommandError::UnknownCommand(name)),
    }
}

fn required<'a>(command: &str, arg: &'a str, usage: &str) -> Result<&'a str, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        });
    }
    Ok(arg)
}

fn invalid(command: &str, error: anyhow::Error) -> CommandError {
    CommandError::InvalidValue {
        command: command.to_string(),
        reason: error.to_string(),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Chat Commands
=============

CONVERSATION:
  /new                    - Start a new conversation
  /export [path]          - Save the transcript (default conversation-<date>.md)

GENERATION PARAMETERS:
  /temperature <0-1>      - Creativity (presets: 0.3 precise, 0.5 balanced,
                            0.7 creative, 0.9 very creative)
  /max-tokens <n>         - Response length: 500, 1000, 2000 or 4000
  /top-p <0-1>            - Nucleus sampling threshold
  /frequency-penalty <0-2> - Penalise repeated tokens
  /presence-penalty <0-2> - Penalise tokens already present
  /tone <name>            - default, teacher, simple or detailed
  /params                 - Show the current parameters

MODEL:
  /model                  - Show the loaded model and available models
  /model <file>           - Load a different model file
  /status                 - Show server connectivity

SESSION CONTROL:
  /help                   - Show this help message
  /exit                   - Exit (also: exit, quit)

NOTES:
  - Commands are case-insensitive
  - Any other text is sent to the model
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text_is_none() {
        assert_eq!(
            parse_special_command("Explain Pythagoras").unwrap(),
            SpecialCommand::None
        );
    }

    #[test]
    fn test_parse_exit_aliases() {
        for input in ["exit", "QUIT", "/exit", "/quit", "  exit  "] {
            assert_eq!(parse_special_command(input).unwrap(), SpecialCommand::Exit);
        }
    }

    #[test]
    fn test_parse_new_is_case_insensitive() {
        assert_eq!(
            parse_special_command("/NEW").unwrap(),
            SpecialCommand::NewConversation
        );
    }

    #[test]
    fn test_parse_export_with_and_without_path() {
        assert_eq!(
            parse_special_command("/export").unwrap(),
            SpecialCommand::Export(None)
        );
        assert_eq!(
            parse_special_command("/export Notes/Maths.md").unwrap(),
            SpecialCommand::Export(Some(PathBuf::from("Notes/Maths.md")))
        );
    }

    #[test]
    fn test_parse_temperature() {
        assert_eq!(
            parse_special_command("/temperature 0.9").unwrap(),
            SpecialCommand::SetParameters(ParameterUpdate::default().with_temperature(0.9))
        );
    }

    #[test]
    fn test_parse_temperature_out_of_range() {
        let err = parse_special_command("/temperature 1.5").unwrap_err();
        assert!(matches!(err, CommandError::InvalidValue { .. }));
    }

    #[test]
    fn test_parse_temperature_missing_value() {
        let err = parse_special_command("/temperature").unwrap_err();
        assert_eq!(
            err,
            CommandError::MissingArgument {
                command: "/temperature".to_string(),
                usage: "/temperature <0.0-1.0>".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_max_tokens_presets_only() {
        assert_eq!(
            parse_special_command("/max-tokens 4000").unwrap(),
            SpecialCommand::SetParameters(ParameterUpdate::default().with_max_tokens(4000))
        );
        assert!(parse_special_command("/max-tokens 3000").is_err());
    }

    #[test]
    fn test_parse_penalties() {
        assert_eq!(
            parse_special_command("/frequency-penalty 1.2").unwrap(),
            SpecialCommand::SetParameters(ParameterUpdate::default().with_frequency_penalty(1.2))
        );
        assert_eq!(
            parse_special_command("/presence-penalty 0").unwrap(),
            SpecialCommand::SetParameters(ParameterUpdate::default().with_presence_penalty(0.0))
        );
        assert!(parse_special_command("/presence-penalty 2.5").is_err());
    }

    #[test]
    fn test_parse_tone() {
        assert_eq!(
            parse_special_command("/tone Teacher").unwrap(),
            SpecialCommand::SetParameters(ParameterUpdate::default().with_tone(Tone::Teacher))
        );
        assert!(matches!(
            parse_special_command("/tone pirate"),
            Err(CommandError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_parse_model_show_and_switch() {
        assert_eq!(
            parse_special_command("/model").unwrap(),
            SpecialCommand::ShowModel
        );
        assert_eq!(
            parse_special_command("/models").unwrap(),
            SpecialCommand::ShowModel
        );
        assert_eq!(
            parse_special_command("/model Mistral-7B.Q4.gguf").unwrap(),
            SpecialCommand::SwitchModel("Mistral-7B.Q4.gguf".to_string())
        );
    }

    #[test]
    fn test_parse_models_alias_switches_with_argument() {
        assert_eq!(
            parse_special_command("/models phi-2.gguf").unwrap(),
            SpecialCommand::SwitchModel("phi-2.gguf".to_string())
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            parse_special_command("/foo bar").unwrap_err(),
            CommandError::UnknownCommand("/foo".to_string())
        );
    }

    #[test]
    fn test_parse_info_commands() {
        assert_eq!(
            parse_special_command("/params").unwrap(),
            SpecialCommand::ShowParameters
        );
        assert_eq!(
            parse_special_command("/status").unwrap(),
            SpecialCommand::ShowStatus
        );
        assert_eq!(parse_special_command("/?").unwrap(), SpecialCommand::Help);
    }
}
