use std::io;

use crossterm::event::KeyCode;

use crate::snake::Direction;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Release,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key { code: KeyCode, action: KeyAction },
    /// The player asked to close the game (Ctrl+C in a terminal).
    Close,
}

impl InputEvent {
    pub fn press(code: KeyCode) -> Self {
        InputEvent::Key { code, action: KeyAction::Press }
    }

    pub fn release(code: KeyCode) -> Self {
        InputEvent::Key { code, action: KeyAction::Release }
    }

    pub fn pressed(&self) -> Option<KeyCode> {
        match *self {
            InputEvent::Key { code, action: KeyAction::Press } => Some(code),
            _ => None,
        }
    }

    pub fn released(&self) -> Option<KeyCode> {
        match *self {
            InputEvent::Key { code, action: KeyAction::Release } => Some(code),
            _ => None,
        }
    }
}

/// Where the session gets its key events from.
pub trait InputSource {
    /// Every event received since the previous call, oldest first.
    fn snapshot(&mut self) -> io::Result<Vec<InputEvent>>;
}

pub fn direction_for(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Direction::Right),
        _ => None,
    }
}

pub fn is_escape(code: KeyCode) -> bool {
    code == KeyCode::Esc
}

pub fn is_replay(code: KeyCode) -> bool {
    matches!(code, KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Char(' ') | KeyCode::Enter)
}

pub fn is_quit(code: KeyCode) -> bool {
    matches!(code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
}
