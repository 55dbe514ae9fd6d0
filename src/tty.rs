//! Terminal I/O utilities for CLI.
//!
//! Provides TTY detection and the input loop choice for keyword prompts.

use std::io::{self, IsTerminal};

use shoc_header::prompt::{InputLoop, NonInteractive, TerminalInputLoop};

pub fn is_stdin_tty() -> bool {
    io::stdin().is_terminal()
}

/// Operator prompts go to stderr, so only stdin has to be a terminal.
pub fn input_loop() -> Box<dyn InputLoop> {
    if is_stdin_tty() {
        Box::new(TerminalInputLoop::stdio())
    } else {
        Box::new(NonInteractive)
    }
}

/// Print status message to stderr if running in a terminal.
pub fn status(message: &str) {
    if io::stderr().is_terminal() {
        eprintln!("{}", message);
    }
}

// log_status! macro is defined in lib.rs (#[macro_export]) and available crate-wide.
