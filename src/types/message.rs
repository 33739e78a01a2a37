use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a message in the transcript.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Typed by the person at the keyboard.
    User,

    /// Returned by the chat endpoint, or the local fallback on failure.
    Bot,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::User => write!(f, "user"),
            Origin::Bot => write!(f, "bot"),
        }
    }
}

/// A single entry in the transcript.
///
/// Messages are immutable once created; the transcript only ever appends them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    text: String,
    origin: Origin,
}

impl Message {
    /// Creates a message typed by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::User,
        }
    }

    /// Creates a message from the bot.
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::Bot,
        }
    }

    /// The text content of the message.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Who produced the message.
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Returns true if the user produced this message.
    pub fn is_user(&self) -> bool {
        self.origin == Origin::User
    }

    /// The text split at embedded line breaks, one entry per visual line.
    ///
    /// `\r\n` is treated the same as `\n`.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
    }
}
