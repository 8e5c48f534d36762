//! Data-driven artifact templates.
//!
//! Content authors describe most artifacts as a trigger, a condition and an
//! effect picked from fixed vocabularies. `ArtifactTemplate::instantiate` turns
//! that description into a live `Artifact`. Anything the vocabulary cannot
//! express is written directly against `Artifact::new`.

use serde::{Deserialize, Serialize};

use super::artifact::{Artifact, ArtifactScope};
use super::event::{CombatEvent, EventKind};
use crate::cards::{CardTag, Element, Rarity};
use crate::combatant::{Combatant, DamageInput, StatusDuration, StatusKind, StatusSource};
use crate::core::ArtifactId;
use crate::error::ArtifactFault;

/// When a template artifact's effect is allowed to run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactCondition {
    #[default]
    Always,
    /// Only during the first player turn.
    FirstTurnOnly,
    /// Every n-th player turn (turn 1 counts as the first).
    EveryNthTurn(u32),
    /// The played card cost at least this much.
    CardCostAtLeast(u8),
    /// The event's card definition carries this tag.
    CardHasTag(CardTag),
    /// Player HP is strictly below this percentage of max HP.
    PlayerHpBelowPercent(u32),
    /// The event's amount is at least this much.
    DamageAtLeast(i32),
}

impl ArtifactCondition {
    /// Evaluate against a scope.
    pub fn evaluate(&self, scope: &ArtifactScope<'_>) -> Result<bool, ArtifactFault> {
        match self {
            Self::Always => Ok(true),
            Self::FirstTurnOnly => Ok(scope.turn <= 1),
            Self::EveryNthTurn(0) => Err(ArtifactFault::new("turn period must be positive")),
            Self::EveryNthTurn(n) => Ok(scope.turn > 0 && (scope.turn - 1) % n == 0),
            Self::CardCostAtLeast(min) => Ok(matches!(
                scope.event,
                CombatEvent::CardPlayed { cost, .. } if cost >= min
            )),
            Self::CardHasTag(tag) => {
                let Some(id) = scope.event.card() else {
                    return Ok(false);
                };
                let card = scope
                    .catalog
                    .card(id)
                    .ok_or_else(|| ArtifactFault::new(format!("{id} is not in the catalog")))?;
                Ok(card.has_tag(*tag))
            }
            Self::PlayerHpBelowPercent(pct) => {
                let hp = i64::from(scope.player.hp()) * 100;
                Ok(hp < i64::from(scope.player.max_hp()) * i64::from(*pct))
            }
            Self::DamageAtLeast(min) => Ok(scope.event.amount().is_some_and(|a| a >= *min)),
        }
    }
}

/// What a template artifact does.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactEffect {
    GainResource(u32),
    /// Block with no Dexterity or Frail applied.
    GainBlock(i32),
    Heal(i32),
    Draw(u32),
    ApplyStatusToSelf {
        kind: StatusKind,
        turns: u32,
        amount: i32,
    },
    /// Unmodified damage to every living enemy.
    DamageAllEnemies(i32),
    GainResonance { element: Element, stacks: u32 },
}

impl ArtifactEffect {
    /// Apply to a scope.
    pub fn apply(&self, scope: &mut ArtifactScope<'_>) -> Result<(), ArtifactFault> {
        match *self {
            Self::GainResource(n) => scope.player.gain_resource(n),
            Self::GainBlock(n) => scope.player.add_raw_block(n),
            Self::Heal(n) => {
                scope.player.heal(n);
            }
            Self::Draw(n) => {
                scope.player.draw(n as usize);
            }
            Self::ApplyStatusToSelf { kind, turns, amount } => {
                let source = StatusSource::Artifact(scope.source);
                scope
                    .player
                    .apply_status(kind, StatusDuration::Turns(turns), amount, source);
            }
            Self::DamageAllEnemies(n) => {
                let rules = scope.rules;
                let mut dealt = Vec::new();
                for (index, enemy) in scope.enemies.iter_mut().enumerate() {
                    if !enemy.is_alive() {
                        continue;
                    }
                    let outcome = enemy.take_hit(DamageInput::new(n), None, rules);
                    if outcome.hp_delta < 0 {
                        dealt.push(CombatEvent::DamageDealt {
                            enemy: index,
                            amount: -outcome.hp_delta,
                        });
                    }
                }
                for event in dealt {
                    scope.raise(event);
                }
            }
            Self::GainResonance { element, stacks } => scope.player.add_resonance(element, stacks),
        }
        Ok(())
    }
}

/// Catalog description of an artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactTemplate {
    pub id: ArtifactId,
    pub name: String,
    pub rarity: Rarity,
    pub trigger: EventKind,
    #[serde(default)]
    pub condition: ArtifactCondition,
    pub effect: ArtifactEffect,
}

impl ArtifactTemplate {
    /// An unconditional common template.
    #[must_use]
    pub fn new(id: ArtifactId, name: impl Into<String>, trigger: EventKind, effect: ArtifactEffect) -> Self {
        Self {
            id,
            name: name.into(),
            rarity: Rarity::Common,
            trigger,
            condition: ArtifactCondition::Always,
            effect,
        }
    }

    #[must_use]
    pub fn with_condition(mut self, condition: ArtifactCondition) -> Self {
        self.condition = condition;
        self
    }

    #[must_use]
    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    /// Build the live artifact.
    #[must_use]
    pub fn instantiate(&self) -> Artifact {
        let condition = self.condition.clone();
        let effect = self.effect.clone();
        Artifact::new(self.id, self.name.clone(), self.trigger, move |scope| effect.apply(scope))
            .with_condition(move |scope| condition.evaluate(scope))
            .with_rarity(self.rarity)
    }
}
