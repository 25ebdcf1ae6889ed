//! Operator command sources
//!
//! The control loop asks for at most one input per iteration and never
//! blocks waiting for it.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::collections::VecDeque;
use std::io::{self, IsTerminal};
use std::time::Duration;

/// One polled input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// A key was pressed.
    Key(char),
    /// Nothing this iteration.
    Idle,
    /// The source has no more input; the loop should shut down.
    Exhausted,
}

pub trait CommandSource {
    /// Poll for the next input without blocking.
    fn next_input(&mut self) -> io::Result<Input>;
}

/// Non-blocking keyboard input.
///
/// Raw mode is only held for the duration of each poll so that log output
/// between polls renders normally. Without a terminal on stdin there is
/// nothing to poll and the source reports itself exhausted.
#[derive(Debug)]
pub struct KeyboardCommands {
    raw: bool,
    interactive: bool,
}

impl KeyboardCommands {
    pub fn new() -> Self {
        Self {
            raw: false,
            interactive: io::stdin().is_terminal(),
        }
    }

    /// Whether stdin is a terminal.
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn poll_key() -> io::Result<Input> {
        if !event::poll(Duration::ZERO)? {
            return Ok(Input::Idle);
        }
        match event::read()? {
            Event::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) if modifiers.contains(KeyModifiers::CONTROL) => Ok(Input::Key('q')),
            Event::Key(KeyEvent {
                code: KeyCode::Char(c),
                kind: KeyEventKind::Press,
                ..
            }) => Ok(Input::Key(c)),
            _ => Ok(Input::Idle),
        }
    }
}

impl CommandSource for KeyboardCommands {
    fn next_input(&mut self) -> io::Result<Input> {
        if !self.interactive {
            return Ok(Input::Exhausted);
        }
        terminal::enable_raw_mode()?;
        self.raw = true;
        let polled = Self::poll_key();
        terminal::disable_raw_mode()?;
        self.raw = false;
        polled
    }
}

impl Default for KeyboardCommands {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for KeyboardCommands {
    fn drop(&mut self) {
        if self.raw {
            if let Err(e) = terminal::disable_raw_mode() {
                tracing::warn!(error = %e, "failed to restore terminal mode");
            }
        }
    }
}

/// Commands replayed from a fixed key sequence.
///
/// `.` is an idle iteration; whitespace is ignored.
#[derive(Debug, Clone)]
pub struct ScriptedCommands {
    keys: VecDeque<char>,
}

impl ScriptedCommands {
    pub fn new(script: &str) -> Self {
        Self {
            keys: script.chars().filter(|c| !c.is_whitespace()).collect(),
        }
    }
}

impl CommandSource for ScriptedCommands {
    fn next_input(&mut self) -> io::Result<Input> {
        Ok(match self.keys.pop_front() {
            Some('.') => Input::Idle,
            Some(c) => Input::Key(c),
            None => Input::Exhausted,
        })
    }
}
