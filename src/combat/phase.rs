//! Combat phases and outcomes.

use serde::{Deserialize, Serialize};

/// Where the combat state machine currently is.
///
/// ```text
/// PlayerChooseAction <-> PlayerSelectTarget
/// PlayerChooseAction -> EnemyTurnStart -> EnemyActing -> PlayerChooseAction
/// (any non-terminal) -> Dilemma -> PlayerChooseAction
/// (any) -> GameOver
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatPhase {
    /// `start_combat` has not been called.
    #[default]
    NotStarted,
    PlayerChooseAction,
    /// A card was selected and waits for an enemy target.
    PlayerSelectTarget { hand_index: usize },
    /// Enemy start-of-turn statuses resolve and the action queue is built.
    EnemyTurnStart,
    /// Queued enemy actions resolve, one per tick.
    EnemyActing,
    Dilemma,
    GameOver,
}

impl CombatPhase {
    /// Short name used in errors and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::PlayerChooseAction => "PlayerChooseAction",
            Self::PlayerSelectTarget { .. } => "PlayerSelectTarget",
            Self::EnemyTurnStart => "EnemyTurnStart",
            Self::EnemyActing => "EnemyActing",
            Self::Dilemma => "Dilemma",
            Self::GameOver => "GameOver",
        }
    }

    #[must_use]
    pub const fn is_player_turn(self) -> bool {
        matches!(self, Self::PlayerChooseAction | Self::PlayerSelectTarget { .. })
    }

    #[must_use]
    pub const fn is_enemy_turn(self) -> bool {
        matches!(self, Self::EnemyTurnStart | Self::EnemyActing)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver)
    }
}

impl std::fmt::Display for CombatPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a finished combat ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatOutcome {
    Victory,
    Defeat,
}
