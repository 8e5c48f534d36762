//! Inputs accepted from the presentation layer.

use serde::{Deserialize, Serialize};

/// One player input. Anything impossible in the current phase is rejected with
/// an `ActionError` and leaves the combat untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerInput {
    /// Pick a card from hand. Cards that need no enemy target are played
    /// immediately; the rest enter target selection.
    SelectCard { hand_index: usize },
    /// Aim the selected card at an enemy and play it.
    ChooseTarget { enemy: usize },
    /// Back out of target selection. Nothing is spent.
    CancelTarget,
    /// Select and play in one step.
    PlayCard { hand_index: usize, target: Option<usize> },
    EndTurn,
    ResolveDilemma { choice: usize },
}
