//! Command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`, plus
//! the bare farewell words, allowing users to control the terminal front end
//! without sending messages to the endpoint.

/// A parsed chat command.
///
/// These commands control the front end and are never sent to the endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Show the session identifier.
    Session,

    /// Replay the transcript so far.
    History,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for commands.
///
/// Returns `Some(ChatCommand)` if the input is a command (valid or not),
/// or `None` if it should be submitted as a regular message.
///
/// # Examples
///
/// ```
/// # use relay_chat::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("bye").is_some());
/// assert!(parse_command("Hello there!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if is_farewell(input) {
        return Some(ChatCommand::Quit);
    }

    let rest = input.strip_prefix('/')?;
    let command = rest.split_whitespace().next().unwrap_or("").to_lowercase();

    let result = match command.as_str() {
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "session" => ChatCommand::Session,
        "history" => ChatCommand::History,
        "" => ChatCommand::Invalid("Empty command; try /help".to_string()),
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

fn is_farewell(input: &str) -> bool {
    ["quit", "exit", "bye"]
        .iter()
        .any(|word| input.eq_ignore_ascii_case(word))
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /session               Show the session identifier
  /history               Replay the conversation so far
  /help                  Show this help message
  /quit                  Exit the chat (also: quit, exit, bye)"#
}
