use std::fmt;

use serde::{Deserialize, Serialize};

/// Player input accepted by [`crate::GameRunner::perform_action`].
///
/// `Action6` carries a frame coordinate; the other actions are bare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameAction {
    Reset,
    Action1,
    Action2,
    Action3,
    Action4,
    Action5,
    Action6 { x: u8, y: u8 },
}

impl GameAction {
    pub const fn id(self) -> u8 {
        match self {
            GameAction::Reset => 0,
            GameAction::Action1 => 1,
            GameAction::Action2 => 2,
            GameAction::Action3 => 3,
            GameAction::Action4 => 4,
            GameAction::Action5 => 5,
            GameAction::Action6 { .. } => 6,
        }
    }

    /// `Action6` comes back with its coordinate at the origin.
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(GameAction::Reset),
            1 => Some(GameAction::Action1),
            2 => Some(GameAction::Action2),
            3 => Some(GameAction::Action3),
            4 => Some(GameAction::Action4),
            5 => Some(GameAction::Action5),
            6 => Some(GameAction::Action6 { x: 0, y: 0 }),
            _ => None,
        }
    }

    pub const fn is_simple(self) -> bool {
        !self.is_complex()
    }

    pub const fn is_complex(self) -> bool {
        matches!(self, GameAction::Action6 { .. })
    }

    pub const fn is_reset(self) -> bool {
        matches!(self, GameAction::Reset)
    }
}

impl fmt::Display for GameAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameAction::Reset => write!(f, "RESET"),
            GameAction::Action6 { x, y } => write!(f, "ACTION6({x}, {y})"),
            other => write!(f, "ACTION{}", other.id()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    #[default]
    NotPlayed,
    NotFinished,
    Win,
    GameOver,
}

impl GameState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, GameState::Win | GameState::GameOver)
    }
}
