use crate::entity::direction::Direction;

/// In-game actions. Buffered and consumed at most one per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Move(Direction),
    Attack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCommand {
    Intent(Intent),
    TogglePause,
    ToggleSoundMute,
    ToggleMusicMute,
    Restart,
    BackToMenu,
    Exit,
}

impl From<Intent> for GameCommand {
    fn from(intent: Intent) -> Self {
        GameCommand::Intent(intent)
    }
}
