use std::collections::HashMap;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::entity::direction::Direction;
use crate::input::commands::{GameCommand, Intent};

pub mod commands;

#[derive(Debug, Clone)]
pub struct Bindings {
    key_bindings: HashMap<KeyCode, GameCommand>,
}

impl Default for Bindings {
    fn default() -> Self {
        let mut key_bindings = HashMap::new();

        // Player movement
        for (keys, direction) in [
            ([KeyCode::Up, KeyCode::Char('w')], Direction::Up),
            ([KeyCode::Down, KeyCode::Char('s')], Direction::Down),
            ([KeyCode::Left, KeyCode::Char('a')], Direction::Left),
            ([KeyCode::Right, KeyCode::Char('d')], Direction::Right),
        ] {
            for key in keys {
                key_bindings.insert(key, Intent::Move(direction).into());
            }
        }
        key_bindings.insert(KeyCode::Char(' '), Intent::Attack.into());
        key_bindings.insert(KeyCode::Enter, Intent::Attack.into());

        // Game actions
        key_bindings.insert(KeyCode::Char('p'), GameCommand::TogglePause);
        key_bindings.insert(KeyCode::Char('m'), GameCommand::ToggleSoundMute);
        key_bindings.insert(KeyCode::Char('n'), GameCommand::ToggleMusicMute);
        key_bindings.insert(KeyCode::Char('r'), GameCommand::Restart);
        key_bindings.insert(KeyCode::Backspace, GameCommand::BackToMenu);
        key_bindings.insert(KeyCode::Esc, GameCommand::Exit);
        key_bindings.insert(KeyCode::Char('q'), GameCommand::Exit);

        Self { key_bindings }
    }
}

impl Bindings {
    /// Maps a terminal event to a command. Only key presses count; repeats and releases do not.
    pub fn command_for(&self, event: &Event) -> Option<GameCommand> {
        let Event::Key(KeyEvent {
            code, modifiers, kind, ..
        }) = event
        else {
            return None;
        };
        if *kind != KeyEventKind::Press {
            return None;
        }
        if modifiers.contains(KeyModifiers::CONTROL) && *code == KeyCode::Char('c') {
            return Some(GameCommand::Exit);
        }
        let code = match code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => *other,
        };
        self.key_bindings.get(&code).copied()
    }
}
