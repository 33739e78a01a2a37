//! Output surface for the chat client.
//!
//! This module provides a trait-based view abstraction so the chat client can
//! be hosted by different front ends.  The default implementation writes the
//! transcript to a terminal with optional ANSI styling.

use std::io::{self, Stdout, Write};

use crate::types::{Message, Origin};

/// ANSI escape code for bold text (used for speaker labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for the waiting indicator).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for user messages).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for bot messages).
const ANSI_GREEN: &str = "\x1b[32m";

/// Trait for the surface the chat client draws on.
///
/// The client calls these in a fixed order during a submission: append the
/// user message, clear and disable input, append the reply, then re-enable
/// and focus input.
pub trait View: Send {
    /// Append one message to the visible transcript.
    ///
    /// Embedded line breaks in the text must be shown as visual line breaks.
    fn append_message(&mut self, message: &Message);

    /// Bring the newest transcript entry into view.
    fn scroll_to_latest(&mut self);

    /// Empty the input control.
    fn clear_input(&mut self);

    /// Enable or disable the input control.
    fn set_input_enabled(&mut self, enabled: bool);

    /// Move focus to the input control.
    fn focus_input(&mut self);

    /// Report a failure on the developer-facing diagnostic channel.
    ///
    /// This must never alter the transcript.
    fn log_error(&mut self, error: &str);
}

/// Renders the transcript as labelled text with optional ANSI styling.
///
/// Each message becomes a bubble: a speaker label followed by one indented
/// output line per line of message text.
pub struct TerminalView<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
    input_enabled: bool,
    has_focus: bool,
}

impl TerminalView<Stdout> {
    /// Creates a view on stdout with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a view on stdout with the specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl Default for TerminalView<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> TerminalView<W> {
    /// Creates a view over an arbitrary writer.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            input_enabled: true,
            has_focus: true,
        }
    }

    /// Whether the prompt should accept input.
    pub fn is_input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Whether the prompt holds focus.
    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// Returns the underlying writer.
    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Consumes the view, returning the underlying writer.
    pub fn into_writer(self) -> W {
        self.out
    }

    /// Print an informational line outside the transcript.
    pub fn print_info(&mut self, info: &str) {
        let _ = writeln!(self.out, "{info}");
        self.flush();
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
    }

    fn label(origin: Origin) -> &'static str {
        match origin {
            Origin::User => "You:",
            Origin::Bot => "Bot:",
        }
    }

    fn color(origin: Origin) -> &'static str {
        match origin {
            Origin::User => ANSI_CYAN,
            Origin::Bot => ANSI_GREEN,
        }
    }
}

impl<W: Write + Send> View for TerminalView<W> {
    fn append_message(&mut self, message: &Message) {
        let label = Self::label(message.origin());
        let result = if self.use_color {
            let color = Self::color(message.origin());
            writeln!(self.out, "{ANSI_BOLD}{color}{label}{ANSI_RESET}")
        } else {
            writeln!(self.out, "{label}")
        };
        if result.is_err() {
            return;
        }
        for line in message.lines() {
            if writeln!(self.out, "    {line}").is_err() {
                return;
            }
        }
    }

    fn scroll_to_latest(&mut self) {
        // A terminal scrolls on its own; flushing is what makes the entry visible.
        self.flush();
    }

    fn clear_input(&mut self) {
        // The line editor has already consumed the submitted line.
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
        if !enabled {
            self.has_focus = false;
            if self.use_color {
                let _ = writeln!(self.out, "{ANSI_DIM}...{ANSI_RESET}");
            } else {
                let _ = writeln!(self.out, "...");
            }
            self.flush();
        }
    }

    fn focus_input(&mut self) {
        self.has_focus = self.input_enabled;
    }

    fn log_error(&mut self, error: &str) {
        tracing::error!("{error}");
    }
}
