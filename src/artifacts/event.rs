//! Combat events.
//!
//! Every fact an artifact can react to is one `CombatEvent` variant, with a
//! payload fixed per variant. `EventKind` is the payload-free discriminant an
//! artifact subscribes to.

use serde::{Deserialize, Serialize};

use crate::cards::{ActionClass, Element};
use crate::combatant::StatusKind;
use crate::core::{CardId, DilemmaId, EnemyId, InstanceId};

/// Event discriminant. Each artifact listens for exactly one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    CombatStart,
    TurnStart,
    TurnEnd,
    CardPlayed,
    CardDiscarded,
    CardExhausted,
    CardDrawn,
    DeckShuffled,
    DamageDealt,
    DamageTaken,
    BlockGained,
    Healed,
    StatusApplied,
    EnemyDefeated,
    ResonanceGained,
    PenaltyCardsAdded,
    DilemmaResolved,
    Victory,
}

/// Something that happened in combat.
///
/// Enemy payloads carry the enemy's index in the combat's roster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    CombatStart,
    TurnStart { turn: u32 },
    TurnEnd { turn: u32 },
    CardPlayed {
        instance: InstanceId,
        card: CardId,
        cost: u8,
        class: ActionClass,
    },
    CardDiscarded { instance: InstanceId, card: CardId },
    CardExhausted { instance: InstanceId, card: CardId },
    CardDrawn { instance: InstanceId, card: CardId },
    DeckShuffled,
    /// HP an enemy lost to the player.
    DamageDealt { enemy: usize, amount: i32 },
    /// HP the player lost.
    DamageTaken { amount: i32 },
    BlockGained { amount: i32 },
    Healed { amount: i32 },
    StatusApplied { kind: StatusKind, on_player: bool },
    EnemyDefeated { enemy: usize, definition: EnemyId },
    ResonanceGained { element: Element, stacks: u32 },
    PenaltyCardsAdded { count: u32 },
    DilemmaResolved { dilemma: DilemmaId, choice: usize },
    Victory,
}

impl CombatEvent {
    /// The discriminant artifacts subscribe to.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::CombatStart => EventKind::CombatStart,
            Self::TurnStart { .. } => EventKind::TurnStart,
            Self::TurnEnd { .. } => EventKind::TurnEnd,
            Self::CardPlayed { .. } => EventKind::CardPlayed,
            Self::CardDiscarded { .. } => EventKind::CardDiscarded,
            Self::CardExhausted { .. } => EventKind::CardExhausted,
            Self::CardDrawn { .. } => EventKind::CardDrawn,
            Self::DeckShuffled => EventKind::DeckShuffled,
            Self::DamageDealt { .. } => EventKind::DamageDealt,
            Self::DamageTaken { .. } => EventKind::DamageTaken,
            Self::BlockGained { .. } => EventKind::BlockGained,
            Self::Healed { .. } => EventKind::Healed,
            Self::StatusApplied { .. } => EventKind::StatusApplied,
            Self::EnemyDefeated { .. } => EventKind::EnemyDefeated,
            Self::ResonanceGained { .. } => EventKind::ResonanceGained,
            Self::PenaltyCardsAdded { .. } => EventKind::PenaltyCardsAdded,
            Self::DilemmaResolved { .. } => EventKind::DilemmaResolved,
            Self::Victory => EventKind::Victory,
        }
    }

    /// Amount carried by damage, block and heal events.
    #[must_use]
    pub fn amount(&self) -> Option<i32> {
        match self {
            Self::DamageDealt { amount, .. }
            | Self::DamageTaken { amount }
            | Self::BlockGained { amount }
            | Self::Healed { amount } => Some(*amount),
            _ => None,
        }
    }

    /// Card definition named by the event, if any.
    #[must_use]
    pub fn card(&self) -> Option<CardId> {
        match self {
            Self::CardPlayed { card, .. }
            | Self::CardDiscarded { card, .. }
            | Self::CardExhausted { card, .. }
            | Self::CardDrawn { card, .. } => Some(*card),
            _ => None,
        }
    }
}
