//! Chat application module for relaying a conversation to a chat endpoint.
//!
//! This module provides the client core and the pieces the terminal front end
//! needs around it:
//!
//! - One request/response exchange per submitted message
//! - A fixed fallback reply when an exchange fails
//! - Commands for session control
//! - Configurable endpoint and output style
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: The chat client, its input state, and UI event dispatch
//! - [`commands`]: Command parsing and handling

mod commands;
mod config;
mod session;

pub use crate::render::{TerminalView, View};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use session::{ChatClient, FALLBACK_REPLY, Key, SubmitOutcome, UiEvent};
