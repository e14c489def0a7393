//! User-facing status lines.
//!
//! Separate from the run log: these are the banners and verdicts a person
//! watching the terminal reads. Colour is only used on a terminal.

use std::fmt::Display;
use std::io::{self, IsTerminal};

use crossterm::style::{Color, Stylize};

#[derive(Debug, Clone, Copy)]
pub struct Console {
    enabled: bool,
    color: bool,
}

impl Console {
    /// Print to stdout, coloured when stdout is a terminal and `NO_COLOR` is unset.
    pub fn detect() -> Self {
        Self {
            enabled: true,
            color: use_color(io::stdout().is_terminal(), std::env::var_os("NO_COLOR").is_some()),
        }
    }

    /// Discard all output.
    pub fn silent() -> Self {
        Self {
            enabled: false,
            color: false,
        }
    }

    /// Whether output carries colour codes. The stdout log echo follows this too.
    pub fn colored(&self) -> bool {
        self.enabled && self.color
    }

    pub fn info(&self, message: impl Display) {
        self.print(message, Color::Cyan);
    }

    pub fn success(&self, message: impl Display) {
        self.print(message, Color::Green);
    }

    pub fn warn(&self, message: impl Display) {
        self.print(message, Color::Yellow);
    }

    pub fn error(&self, message: impl Display) {
        self.print(message, Color::Red);
    }

    fn print(&self, message: impl Display, color: Color) {
        if !self.enabled {
            return;
        }
        if self.color {
            println!("{}", message.to_string().with(color));
        } else {
            println!("{}", message);
        }
    }
}

fn use_color(is_terminal: bool, no_color: bool) -> bool {
    is_terminal && !no_color
}
