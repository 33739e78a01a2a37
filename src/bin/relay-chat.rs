//! Interactive terminal chat client.
//!
//! This binary provides a REPL that relays each line to a `/chat` endpoint and
//! prints the reply.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a server on the default local address
//! relay-chat
//!
//! # Point at another server
//! relay-chat --endpoint http://chat.example.com/
//!
//! # Disable colors (useful for piping output)
//! relay-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/session` - Show the session identifier
//! - `/history` - Replay the conversation so far
//! - `/quit` - Exit the application (`quit`, `exit`, and `bye` also work)
//!
//! Diagnostics go to stderr; set `RUST_LOG=debug` to see each request.

use std::io::Write;
use std::ops::ControlFlow;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use relay_chat::chat::{
    ChatArgs, ChatClient, ChatCommand, ChatConfig, Key, TerminalView, UiEvent, help_text,
    parse_command,
};
use relay_chat::{ChatEndpoint, HttpEndpoint, Transcript};

/// Main entry point for the relay-chat application.
#[tokio::main]
async fn main() -> relay_chat::Result<()> {
    let (args, _) = ChatArgs::from_command_line_relaxed("relay-chat [OPTIONS]");
    let config = ChatConfig::from(args);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(config.use_color)
        .init();

    let endpoint = HttpEndpoint::with_options(config.endpoint.clone(), config.timeout)?;
    let view = TerminalView::with_color(config.use_color);
    let mut client = ChatClient::new(endpoint, view);
    let mut rl = DefaultEditor::new()?;

    println!(
        "Relay Chat (endpoint: {}, session: {})",
        client.endpoint().chat_url(),
        client.session_id()
    );
    println!("Type /help for commands, /quit to exit\n");

    loop {
        let readline = rl.readline(prompt(client.view()));

        match readline {
            Ok(line) => {
                if let Some(cmd) = parse_command(&line) {
                    if run_command(&mut client, cmd).is_break() {
                        break;
                    }
                    continue;
                }

                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.trim());
                }
                client.handle_event(UiEvent::Key(Key::Enter), &line).await;
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

/// The prompt shown while the view accepts input, or a wait marker otherwise.
fn prompt<W: Write + Send>(view: &TerminalView<W>) -> &'static str {
    if view.is_input_enabled() && view.has_focus() {
        "> "
    } else {
        "... "
    }
}

/// Runs a front-end command.  Returns `Break` when the session should end.
fn run_command<E, W>(
    client: &mut ChatClient<E, TerminalView<W>>,
    cmd: ChatCommand,
) -> ControlFlow<()>
where
    E: ChatEndpoint,
    W: Write + Send,
{
    match cmd {
        ChatCommand::Quit => {
            client.view_mut().print_info("Goodbye!");
            return ControlFlow::Break(());
        }
        ChatCommand::Help => {
            for line in help_text().lines() {
                client.view_mut().print_info(&format!("    {}", line));
            }
        }
        ChatCommand::Session => {
            let info = format!("Session: {}", client.session_id());
            client.view_mut().print_info(&info);
        }
        ChatCommand::History => {
            let history = format_history(client.transcript());
            client.view_mut().print_info(&history);
        }
        ChatCommand::Invalid(message) => {
            client.view_mut().print_info(&message);
        }
    }
    ControlFlow::Continue(())
}

fn format_history(transcript: &Transcript) -> String {
    if transcript.is_empty() {
        return "    (no messages yet)".to_string();
    }
    let mut out = String::new();
    for (idx, message) in transcript.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        let text = message.lines().collect::<Vec<_>>().join(" / ");
        out.push_str(&format!("    [{}] {}", message.origin(), text));
    }
    out
}
