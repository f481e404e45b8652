use std::io::{self, Write};

use crossterm::event::{DisableFocusChange, EnableFocusChange};
use crossterm::execute;
use elevator_core::elevator::FocusSignal;

/// Focus reporting through the terminal.
///
/// Subscribing asks the terminal to send focus events; crossterm then
/// delivers `FocusLost` to the event loop.
pub struct TerminalFocus<W: Write = io::Stdout> {
    out: W,
    subscribed: bool,
}

impl TerminalFocus<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalFocus<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            subscribed: false,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn writer(&self) -> &W {
        &self.out
    }
}

impl<W: Write> FocusSignal for TerminalFocus<W> {
    fn subscribe(&mut self) {
        if self.subscribed {
            return;
        }
        match execute!(self.out, EnableFocusChange) {
            Ok(()) => self.subscribed = true,
            Err(e) => tracing::warn!("Terminal focus reporting unavailable: {}", e),
        }
    }

    fn unsubscribe(&mut self) {
        if !self.subscribed {
            return;
        }
        if let Err(e) = execute!(self.out, DisableFocusChange) {
            tracing::warn!("Failed to disable focus reporting: {}", e);
        }
        self.subscribed = false;
    }
}
