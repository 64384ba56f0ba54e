//! Special commands parser for interactive chat mode
//!
//! This module parses the commands that can be entered during an
//! interactive session instead of a query. Special commands allow users to:
//! - Upload PDF files and list or delete documents
//! - Pick a follow-up suggestion or open a citation from the last answer
//! - Stop a running query or clear the history
//! - Display status and help, and exit the session
//!
//! Commands are prefixed with `/`. Command names are case-insensitive;
//! arguments such as file paths keep their case.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands act on the session instead of being sent to the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start uploads for the given files; non-PDF files are skipped
    Upload(Vec<PathBuf>),

    /// Show the document table and running uploads
    ListDocuments,

    /// Ask to delete a document by list position or id
    Delete(String),

    /// Confirm the pending delete
    ConfirmDelete,

    /// Drop the pending delete
    CancelDelete,

    /// Copy the n-th follow-up suggestion (1-based) into the prompt
    FollowUp(usize),

    /// Show the n-th citation (1-based) of the last answer
    Citation(usize),

    /// Stop waiting for the running query
    StopQuery,

    /// Clear the message history
    Clear,

    /// Show document and conversation totals
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent to the agent as a query.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a valid command.
/// Returns CommandError::UnsupportedArgument if a command receives an invalid argument.
/// Returns CommandError::MissingArgument if a command requires an argument but none was provided.
///
/// # Examples
///
/// ```
/// use docquery::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/followup 2").unwrap();
/// assert_eq!(cmd, SpecialCommand::FollowUp(2));
///
/// let cmd = parse_special_command("What is the refund policy?").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// // Invalid command returns error
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match name.as_str() {
        "/upload" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "/upload".to_string(),
                    usage: "/upload <file.pdf>...".to_string(),
                });
            }
            Ok(SpecialCommand::Upload(
                rest.split_whitespace().map(PathBuf::from).collect(),
            ))
        }

        "/docs" | "/documents" => no_argument("/docs", rest, SpecialCommand::ListDocuments),

        "/delete" => {
            if rest.is_empty() {
                Err(CommandError::MissingArgument {
                    command: "/delete".to_string(),
                    usage: "/delete <number|id>".to_string(),
                })
            } else {
                Ok(SpecialCommand::Delete(rest.to_string()))
            }
        }
        "/confirm" => no_argument("/confirm", rest, SpecialCommand::ConfirmDelete),
        "/cancel" => no_argument("/cancel", rest, SpecialCommand::CancelDelete),

        "/followup" | "/f" => {
            parse_position("/followup", "/followup <number>", rest).map(SpecialCommand::FollowUp)
        }
        "/citation" | "/c" => {
            parse_position("/citation", "/citation <number>", rest).map(SpecialCommand::Citation)
        }

        "/stop" => no_argument("/stop", rest, SpecialCommand::StopQuery),
        "/clear" => no_argument("/clear", rest, SpecialCommand::Clear),
        "/status" => no_argument("/status", rest, SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),

        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

fn no_argument(
    command: &str,
    rest: &str,
    parsed: SpecialCommand,
) -> Result<SpecialCommand, CommandError> {
    if rest.is_empty() {
        Ok(parsed)
    } else {
        Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: rest.to_string(),
        })
    }
}

fn parse_position(command: &str, usage: &str, rest: &str) -> Result<usize, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        });
    }
    match rest.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: rest.to_string(),
        }),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

DOCUMENTS:
  /upload <file.pdf>... - Upload PDF files (other files are skipped)
  /docs           - Show uploaded documents and running uploads
  /delete <n|id>  - Ask to delete a document by list number or id
  /confirm        - Confirm the pending delete
  /cancel         - Keep the document

ANSWERS:
  /followup <n>   - Put the n-th follow-up suggestion in the prompt
  /f <n>          - Same as /followup
  /citation <n>   - Show the n-th citation of the last answer
  /c <n>          - Same as /citation

SESSION CONTROL:
  /stop           - Stop waiting for the running query
  /clear          - Clear the conversation
  /status         - Show document and conversation totals
  /help           - Show this help message
  /?              - Same as /help
  exit            - Exit interactive mode
  quit            - Same as exit

NOTES:
  - Command names are case-insensitive
  - Regular text (not starting with /) is sent to the agent
  - Only one query runs at a time; new queries wait for the answer
"#
    );
}
