//! Read-only views of a combat for the presentation layer.
//!
//! A `CombatSnapshot` is plain serde data, detached from the live combat.

use serde::{Deserialize, Serialize};

use super::dilemma::Dilemma;
use super::phase::{CombatOutcome, CombatPhase};
use crate::cards::{CardInstance, EffectSet, Element, TargetRequirement};
use crate::combatant::{Combatant, Enemy, Intent, Momentum, Player, StatusEntry, StatusKind};
use crate::core::{ArtifactId, CardId, EnemyId, InstanceId};

/// A card in hand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub instance: InstanceId,
    pub card: CardId,
    pub name: String,
    /// `None` when unplayable.
    pub cost: Option<u8>,
    pub upgraded: bool,
    pub effects: EffectSet,
    pub target: TargetRequirement,
}

impl CardView {
    #[must_use]
    pub fn of(card: &CardInstance) -> Self {
        Self {
            instance: card.id(),
            card: card.card_id(),
            name: card.name().to_string(),
            cost: card.cost(),
            upgraded: card.is_upgraded(),
            effects: card.effects().clone(),
            target: card.effects().target_requirement(),
        }
    }
}

fn statuses(combatant: &impl Combatant) -> Vec<(StatusKind, StatusEntry)> {
    combatant.statuses().iter().map(|(k, e)| (k, *e)).collect()
}

/// The player's visible state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub hp: i32,
    pub max_hp: i32,
    pub block: i32,
    pub resource: u32,
    pub max_resource: u32,
    pub statuses: Vec<(StatusKind, StatusEntry)>,
    pub resonance: Vec<(Element, u32)>,
    pub momentum: Momentum,
    pub plays_this_turn: u32,
    pub draw_pile: usize,
    pub discard_pile: usize,
    pub exhaust_pile: usize,
    pub artifacts: Vec<ArtifactId>,
}

impl PlayerView {
    #[must_use]
    pub fn of(player: &Player) -> Self {
        let deck = player.deck();
        Self {
            hp: player.hp(),
            max_hp: player.max_hp(),
            block: player.block(),
            resource: player.resource(),
            max_resource: player.max_resource(),
            statuses: statuses(player),
            resonance: player.resonance_stacks().iter().map(|(e, n)| (*e, *n)).collect(),
            momentum: player.momentum(),
            plays_this_turn: player.plays_this_turn(),
            draw_pile: deck.draw_pile().len(),
            discard_pile: deck.discard_pile().len(),
            exhaust_pile: deck.exhaust_pile().len(),
            artifacts: player.artifacts().iter().map(|a| a.id()).collect(),
        }
    }
}

/// One enemy's visible state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyView {
    pub index: usize,
    pub id: EnemyId,
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub block: i32,
    pub alive: bool,
    pub statuses: Vec<(StatusKind, StatusEntry)>,
    pub intent: Option<Intent>,
}

impl EnemyView {
    #[must_use]
    pub fn of(index: usize, enemy: &Enemy) -> Self {
        Self {
            index,
            id: enemy.id(),
            name: enemy.name().to_string(),
            hp: enemy.hp(),
            max_hp: enemy.max_hp(),
            block: enemy.block(),
            alive: enemy.is_alive(),
            statuses: statuses(enemy),
            intent: enemy.intent().cloned(),
        }
    }
}

/// Everything the presentation layer may show.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatSnapshot {
    pub phase: CombatPhase,
    pub turn: u32,
    pub player: PlayerView,
    pub hand: Vec<CardView>,
    pub enemies: Vec<EnemyView>,
    pub dilemma: Option<Dilemma>,
    pub outcome: Option<CombatOutcome>,
}
