//! Mapping from keys and input symbols to game commands.

use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};

use crate::grid::Vector2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Turn the snake; the vector is one of the four unit directions.
    Steer(Vector2),
    /// Start a new game when none is running.
    Start,
    /// Start when idle, pause or resume while playing.
    Menu,
    /// Pause or resume.
    Pause,
}

impl Command {
    /// Parses a logical input symbol, accepting both the arrow-key name and
    /// the keypad digit for each direction. Unknown symbols give `None`.
    pub fn from_symbol(symbol: &str) -> Option<Command> {
        match symbol {
            "ArrowUp" | "2" => Some(Command::Steer(Vector2::UP)),
            "ArrowDown" | "8" => Some(Command::Steer(Vector2::DOWN)),
            "ArrowLeft" | "4" => Some(Command::Steer(Vector2::LEFT)),
            "ArrowRight" | "6" => Some(Command::Steer(Vector2::RIGHT)),
            "Enter" => Some(Command::Start),
            " " => Some(Command::Menu),
            "Space" | "#" => Some(Command::Pause),
            _ => None,
        }
    }

    pub fn from_key(key: &KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Char('2') => {
                Some(Command::Steer(Vector2::UP))
            }
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char('8') => {
                Some(Command::Steer(Vector2::DOWN))
            }
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('4') => {
                Some(Command::Steer(Vector2::LEFT))
            }
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Char('6') => {
                Some(Command::Steer(Vector2::RIGHT))
            }
            KeyCode::Enter => Some(Command::Start),
            KeyCode::Char(' ') => Some(Command::Menu),
            KeyCode::Esc | KeyCode::Char('#') | KeyCode::Char('p') | KeyCode::Char('P') => {
                Some(Command::Pause)
            }
            _ => None,
        }
    }
}

pub fn is_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Waits up to `timeout` for a key press.
pub fn poll_key(timeout: Duration) -> Result<Option<KeyEvent>> {
    if !poll(timeout).context("polling terminal events")? {
        return Ok(None);
    }

    match read().context("reading terminal event")? {
        Event::Key(ev) => Ok(Some(ev)),
        _ => Ok(None),
    }
}
