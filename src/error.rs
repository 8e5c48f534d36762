//! Error types.
//!
//! - `ActionError`: an input that is impossible in the current state. Returned
//!   synchronously; the combat state is untouched.
//! - `ContentError`: a referenced content id is missing from the catalog.
//! - `ArtifactFault`: an artifact condition or effect failed. Caught by the
//!   dispatcher and treated as a non-trigger.
//! - `CombatError`: setup failures that prevent a combat from starting.

use thiserror::Error;

use crate::core::{ArtifactId, CardId, EnemyId, InstanceId};

/// Reason an input was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("input not accepted in phase {phase}")]
    WrongPhase { phase: &'static str },

    #[error("no card at hand index {index}")]
    CardNotInHand { index: usize },

    #[error("{instance} cannot be played")]
    Unplayable { instance: InstanceId },

    #[error("card costs {needed} but only {available} resource is available")]
    InsufficientResource { needed: u32, available: u32 },

    #[error("play limit of {cap} cards this turn reached")]
    PlayCapReached { cap: u32 },

    #[error("card requires a living enemy target")]
    TargetRequired,

    #[error("enemy {index} is not a valid target")]
    InvalidTarget { index: usize },

    #[error("no card is awaiting a target")]
    NoPendingCard,

    #[error("dilemma has no choice {choice}")]
    InvalidDilemmaChoice { choice: usize },

    #[error("combat is over")]
    CombatOver,
}

/// A content lookup failed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("card definition {0} not found")]
    MissingCard(CardId),

    #[error("artifact template {0} not found")]
    MissingArtifact(ArtifactId),

    #[error("enemy definition {0} not found")]
    MissingEnemy(EnemyId),

    #[error("encounter roster resolved to no enemies")]
    EmptyRoster,
}

/// An artifact condition or effect failed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("artifact fault: {message}")]
pub struct ArtifactFault {
    pub message: String,
}

impl ArtifactFault {
    /// Create a fault with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A combat could not be set up.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("combat already in progress")]
    AlreadyStarted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ActionError::InsufficientResource {
            needed: 2,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "card costs 2 but only 1 resource is available"
        );

        let err = CombatError::from(ContentError::MissingEnemy(EnemyId::new(4)));
        assert_eq!(err.to_string(), "enemy definition Enemy(4) not found");
    }
}
