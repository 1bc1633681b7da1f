//! Special commands parser for interactive chat mode
//!
//! This module parses the commands that can be entered during an interactive
//! chat session instead of a question. Special commands allow users to:
//! - Re-check the backend and show session status
//! - Reload a page of history or clear the screen
//! - Rate answers
//! - Browse and submit the suggested questions
//! - Exit the session
//!
//! Commands are prefixed with `/` and are case-insensitive.

use crate::chat::Rating;
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
/// These commands act on the session rather than being sent to the backend
/// as a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Display help information
    Help,

    /// Probe `GET /health` again
    Health,

    /// Reload a page of history (1-based), replacing the screen
    History(u32),

    /// Clear the conversation and show the welcome screen
    Clear,

    /// Rate the n-th answer on screen (1-based)
    Rate { answer: usize, rating: Rating },

    /// Show stats of the loaded history page
    Stats,

    /// Show connection, token, and conversation status
    ShowStatus,

    /// List the suggested questions
    Suggest,

    /// Submit the n-th suggested question (1-based)
    AskSuggestion(usize),

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be submitted as a question.
    None,
}

fn parse_number(command: &str, arg: &str) -> Result<usize, CommandError> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        }),
    }
}

fn parse_rating(command: &str, rest: &str, rating: Rating) -> Result<SpecialCommand, CommandError> {
    let arg = rest.trim();
    if arg.is_empty() {
        return Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: format!("{} <answer number>", command),
        });
    }
    Ok(SpecialCommand::Rate {
        answer: parse_number(command, arg)?,
        rating,
    })
}

/// Parse a user input string into a special command
///
/// Commands are case-insensitive. Input that does not start with `/` (other
/// than `exit` and `quit`) is a question and yields [`SpecialCommand::None`].
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if input starts with "/" but is not a valid command.
/// Returns `CommandError::UnsupportedArgument` if a command receives an invalid argument.
/// Returns `CommandError::MissingArgument` if a command requires an argument but none was provided.
///
/// # Examples
///
/// ```
/// use querygpt::chat::Rating;
/// use querygpt::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/like 2").unwrap();
/// assert_eq!(cmd, SpecialCommand::Rate { answer: 2, rating: Rating::Like });
///
/// let cmd = parse_special_command("what is rust?").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/health" => Ok(SpecialCommand::Health),
        "/clear" => Ok(SpecialCommand::Clear),
        "/stats" => Ok(SpecialCommand::Stats),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/suggest" | "/suggestions" => Ok(SpecialCommand::Suggest),

        "/history" => Ok(SpecialCommand::History(1)),
        input if input.starts_with("/history ") => {
            let arg = input[9..].trim();
            let page = parse_number("/history", arg)?;
            u32::try_from(page)
                .map(SpecialCommand::History)
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: "/history".to_string(),
                    arg: arg.to_string(),
                })
        }

        "/like" => parse_rating("/like", "", Rating::Like),
        input if input.starts_with("/like ") => parse_rating("/like", &input[6..], Rating::Like),
        "/dislike" => parse_rating("/dislike", "", Rating::Dislike),
        input if input.starts_with("/dislike ") => {
            parse_rating("/dislike", &input[9..], Rating::Dislike)
        }

        "/ask" => Err(CommandError::MissingArgument {
            command: "/ask".to_string(),
            usage: "/ask <suggestion number>".to_string(),
        }),
        input if input.starts_with("/ask ") => {
            let arg = input[5..].trim();
            Ok(SpecialCommand::AskSuggestion(parse_number("/ask", arg)?))
        }

        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        input => {
            let cmd = input.split_whitespace().next().unwrap_or(input);
            Err(CommandError::UnknownCommand(cmd.to_string()))
        }
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

CONVERSATION:
  /history [page] - Reload a page of history from the server (default: 1)
  /clear          - Clear the screen and show the welcome screen
  /like <n>       - Like answer number n (again to undo)
  /dislike <n>    - Dislike answer number n (again to undo)

SUGGESTIONS:
  /suggest        - List suggested questions
  /ask <n>        - Ask suggested question number n

SESSION INFORMATION:
  /health         - Re-check the backend connection
  /stats          - Show stats of the loaded history page
  /status         - Show connection, sign-in, and conversation status
  /help           - Show this help message
  /?              - Same as /help

SESSION CONTROL:
  exit            - Exit interactive mode
  quit            - Same as exit

NOTES:
  - Commands are case-insensitive
  - Regular text (not starting with /) is sent as a question
  - Ratings are kept for this session only
"#
    );
}
