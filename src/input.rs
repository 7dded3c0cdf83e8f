//! Key bindings: arrows/space and vim-style letters mapped to engine commands.

use crate::game::Command;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Game(Command),
    Quit,
    None,
}

/// Map key event to action. Keys without a binding become `Action::None` and are ignored.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Left | KeyCode::Char('h') => Action::Game(Command::MoveLeft),
        KeyCode::Right | KeyCode::Char('l') => Action::Game(Command::MoveRight),
        KeyCode::Down | KeyCode::Char('j') => Action::Game(Command::SoftDrop),
        KeyCode::Up | KeyCode::Char('k') => Action::Game(Command::Rotate),
        KeyCode::Char(' ') => Action::Game(Command::HardDrop),
        KeyCode::Char('r' | 'R') => Action::Game(Command::Restart),
        _ => Action::None,
    }
}
