//! Dilemmas: scripted mid-combat branching choices.
//!
//! A dilemma pauses combat in the `Dilemma` phase until the player picks one
//! of its choices. Each choice is a list of outcomes applied in order.
//! Dilemmas are either raised directly (`CombatManager::raise_dilemma`) or
//! scripted with a `DilemmaTrigger` that is checked after every opening draw.

use serde::{Deserialize, Serialize};

use crate::artifacts::CombatEvent;
use crate::cards::{ContentCatalog, Element, Synthesizer};
use crate::combatant::{Combatant, Enemy, Player, StatusDuration, StatusKind, StatusSource};
use crate::core::{CardId, DilemmaId, InstanceAllocator};
use crate::zones::Zone;

/// One effect of a dilemma choice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DilemmaOutcome {
    GainResource(u32),
    /// Unblockable HP loss.
    LoseHp(i32),
    Heal(i32),
    GainBlock(i32),
    Draw(u32),
    ApplyStatusToPlayer {
        kind: StatusKind,
        turns: u32,
        amount: i32,
    },
    ApplyStatusToEnemies {
        kind: StatusKind,
        turns: u32,
        amount: i32,
    },
    /// A combat-only copy of a card, straight into hand.
    AddCardToHand(CardId),
    GainResonance { element: Element, stacks: u32 },
}

/// State a dilemma outcome may touch.
pub struct OutcomeContext<'a> {
    pub player: &'a mut Player,
    pub enemies: &'a mut [Enemy],
    pub catalog: &'a ContentCatalog,
    pub synth: &'a mut Synthesizer,
    pub instances: &'a mut InstanceAllocator,
    pub source: DilemmaId,
}

impl DilemmaOutcome {
    /// Apply the outcome. Player-side events are recorded on the player;
    /// enemy-side events are returned.
    pub fn apply(&self, ctx: &mut OutcomeContext<'_>) -> Vec<CombatEvent> {
        let source = StatusSource::Dilemma(ctx.source);
        let mut events = Vec::new();
        match *self {
            Self::GainResource(n) => ctx.player.gain_resource(n),
            Self::LoseHp(n) => {
                ctx.player.lose_hp(n);
            }
            Self::Heal(n) => {
                ctx.player.heal(n);
            }
            Self::GainBlock(n) => {
                ctx.player.gain_block(n);
            }
            Self::Draw(n) => {
                ctx.player.draw(n as usize);
            }
            Self::ApplyStatusToPlayer { kind, turns, amount } => {
                ctx.player
                    .apply_status(kind, StatusDuration::Turns(turns), amount, source);
            }
            Self::ApplyStatusToEnemies { kind, turns, amount } => {
                for enemy in ctx.enemies.iter_mut().filter(|e| e.is_alive()) {
                    enemy.apply_status(kind, StatusDuration::Turns(turns), amount, source);
                    enemy.refresh_intent();
                    events.push(CombatEvent::StatusApplied {
                        kind,
                        on_player: false,
                    });
                }
            }
            Self::AddCardToHand(card) => {
                let instance = ctx
                    .catalog
                    .instantiate_card(card, ctx.instances.alloc(), ctx.synth);
                ctx.player.deck_mut().add_temporary(instance, Zone::Hand);
            }
            Self::GainResonance { element, stacks } => ctx.player.add_resonance(element, stacks),
        }
        events
    }
}

/// One option of a dilemma.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DilemmaChoice {
    pub label: String,
    pub outcomes: Vec<DilemmaOutcome>,
}

impl DilemmaChoice {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            outcomes: Vec::new(),
        }
    }

    /// Add an outcome (builder pattern).
    #[must_use]
    pub fn with_outcome(mut self, outcome: DilemmaOutcome) -> Self {
        self.outcomes.push(outcome);
        self
    }
}

/// A branching choice presented mid-combat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dilemma {
    pub id: DilemmaId,
    pub prompt: String,
    pub choices: Vec<DilemmaChoice>,
}

impl Dilemma {
    #[must_use]
    pub fn new(id: DilemmaId, prompt: impl Into<String>) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            choices: Vec::new(),
        }
    }

    /// Add a choice (builder pattern).
    #[must_use]
    pub fn with_choice(mut self, choice: DilemmaChoice) -> Self {
        self.choices.push(choice);
        self
    }
}

/// When a scripted dilemma opens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DilemmaTrigger {
    /// At the start of player turn `n`.
    AtTurnStart(u32),
    /// At the start of the first player turn with HP strictly below this
    /// percentage of max HP.
    PlayerHpBelowPercent(u32),
}

impl DilemmaTrigger {
    #[must_use]
    pub fn is_met(self, turn: u32, player: &Player) -> bool {
        match self {
            Self::AtTurnStart(n) => turn == n,
            Self::PlayerHpBelowPercent(pct) => {
                i64::from(player.hp()) * 100 < i64::from(player.max_hp()) * i64::from(pct)
            }
        }
    }
}

/// A dilemma that opens by itself, at most once per combat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedDilemma {
    pub dilemma: Dilemma,
    pub trigger: DilemmaTrigger,
}

impl ScriptedDilemma {
    #[must_use]
    pub fn new(dilemma: Dilemma, trigger: DilemmaTrigger) -> Self {
        Self { dilemma, trigger }
    }
}
