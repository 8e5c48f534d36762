//! Card instances - one concrete copy of a card in a player's deck.
//!
//! An instance is created when a card joins a master deck (draft, purchase,
//! starting loadout) and lives until it is removed from that deck. It survives
//! across combats, so a permanent upgrade sticks.
//!
//! Both payloads (base and upgraded) are synthesized up front and shared through
//! the `Synthesizer` cache; switching between them is a flag flip.

use std::sync::Arc;

use super::definition::CardDefinition;
use super::effects::{EffectSet, StatusTarget};
use super::synthesis::{SynthesizedCard, Synthesizer, MAX_COST};
use super::traits::Element;
use crate::combatant::{AffinityRules, Combatant, DamageOutcome, Enemy, Player, StatusKind, StatusSource};
use crate::core::{CardId, InstanceId};

/// A card in a player's deck.
#[derive(Clone, Debug)]
pub struct CardInstance {
    id: InstanceId,
    definition: Arc<CardDefinition>,
    base: Arc<SynthesizedCard>,
    upgraded_card: Option<Arc<SynthesizedCard>>,
    is_upgraded: bool,
    temporary_cost: Option<u8>,
}

impl CardInstance {
    /// Create a base (non-upgraded) instance.
    pub fn new(id: InstanceId, definition: Arc<CardDefinition>, synth: &mut Synthesizer) -> Self {
        let base = synth.base(&definition);
        let upgraded_card = synth.upgraded(&definition);
        Self {
            id,
            definition,
            base,
            upgraded_card,
            is_upgraded: false,
            temporary_cost: None,
        }
    }

    /// Unique instance id.
    #[must_use]
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Id of the underlying definition.
    #[must_use]
    pub fn card_id(&self) -> CardId {
        self.definition.id
    }

    #[must_use]
    pub fn definition(&self) -> &CardDefinition {
        &self.definition
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    #[must_use]
    pub fn is_upgraded(&self) -> bool {
        self.is_upgraded
    }

    #[must_use]
    pub fn can_upgrade(&self) -> bool {
        !self.is_upgraded && self.upgraded_card.is_some()
    }

    fn active(&self) -> &SynthesizedCard {
        match (&self.upgraded_card, self.is_upgraded) {
            (Some(up), true) => up,
            _ => &self.base,
        }
    }

    /// Current cost, or `None` if the card cannot be played.
    #[must_use]
    pub fn cost(&self) -> Option<u8> {
        if self.definition.unplayable {
            return None;
        }
        Some(self.temporary_cost.unwrap_or(self.active().cost))
    }

    /// Payload for the current upgrade state.
    #[must_use]
    pub fn effects(&self) -> &EffectSet {
        &self.active().effects
    }

    /// Permanently upgrade. Returns `false` if already upgraded or no upgrade
    /// exists.
    pub fn upgrade(&mut self) -> bool {
        if !self.can_upgrade() {
            return false;
        }
        self.is_upgraded = true;
        true
    }

    /// Override the cost until cleared. Clamped to the maximum cost.
    pub fn set_temporary_cost(&mut self, cost: Option<u8>) {
        self.temporary_cost = cost.map(|c| c.min(MAX_COST));
    }

    #[must_use]
    pub fn temporary_cost(&self) -> Option<u8> {
        self.temporary_cost
    }

    /// Whether the card is exhausted instead of discarded after play.
    #[must_use]
    pub fn exhausts(&self) -> bool {
        self.definition.exhausts()
    }

    /// Resolve every channel of the current payload.
    ///
    /// Each channel picks its own target: damage goes to `ctx.target` (or every
    /// living enemy when area), block/heal/focus/draw to the player, and each
    /// status to its own `StatusTarget`. Callers validate the target first; a
    /// missing or dead target here just skips the single-target parts.
    pub fn execute(&self, ctx: &mut PlayContext<'_>) -> PlayReport {
        let effects = self.effects();
        let source = StatusSource::Card(self.card_id());
        let bonus = ctx.player.attunement_bonus(&self.definition);
        let mut report = PlayReport::default();

        if effects.damage > 0 {
            let base = effects.damage + ctx.bonus_damage + bonus;
            let element = self.definition.element;
            for index in ctx.damage_targets(effects.aoe) {
                let hit = ctx.player.vitals().outgoing(base);
                let outcome = ctx.enemies[index].take_hit(hit, element, ctx.rules);
                report.record_hit(index, element, outcome);
            }
            if let (Some(element), true) = (element, report.resonance_gained > 0) {
                ctx.player.add_resonance(element, report.resonance_gained);
            }
        }

        if effects.block > 0 {
            report.block_gained = ctx.player.gain_block(effects.block + bonus);
        }
        if effects.heal > 0 {
            report.healed = ctx.player.heal(effects.heal);
        }
        if effects.focus > 0 {
            let focus = effects.focus as u32;
            ctx.player.gain_resource(focus);
            report.focus_gained = focus;
        }
        if effects.draw > 0 {
            report.drawn = ctx.player.draw(effects.draw as usize);
        }

        for status in &effects.statuses {
            let targets = match status.target {
                StatusTarget::SelfTarget => {
                    ctx.player
                        .apply_status(status.kind, status.duration, status.amount, source);
                    report.statuses.push((None, status.kind));
                    continue;
                }
                StatusTarget::Enemy => ctx.damage_targets(false),
                StatusTarget::AllEnemies => ctx.damage_targets(true),
            };
            for index in targets {
                ctx.enemies[index].apply_status(status.kind, status.duration, status.amount, source);
                report.statuses.push((Some(index), status.kind));
            }
        }

        report
    }
}

/// Everything a card needs to resolve.
pub struct PlayContext<'a> {
    pub player: &'a mut Player,
    pub enemies: &'a mut [Enemy],
    /// Chosen enemy index, for single-target channels.
    pub target: Option<usize>,
    pub rules: AffinityRules,
    /// Extra damage from consumed resonance.
    pub bonus_damage: i32,
}

impl PlayContext<'_> {
    fn damage_targets(&self, all: bool) -> Vec<usize> {
        if all {
            return (0..self.enemies.len())
                .filter(|&i| self.enemies[i].is_alive())
                .collect();
        }
        self.target
            .filter(|&i| self.enemies.get(i).is_some_and(|e| e.is_alive()))
            .into_iter()
            .collect()
    }
}

/// What resolving a card did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayReport {
    /// `(enemy index, outcome)` per hit.
    pub hits: Vec<(usize, DamageOutcome)>,
    pub resonance_gained: u32,
    /// Element of the resonance gained, if any.
    pub resonance_element: Option<Element>,
    pub penalty_cards: u32,
    pub block_gained: i32,
    pub healed: i32,
    pub focus_gained: u32,
    pub drawn: usize,
    /// `(enemy index or None for the player, status)` per application.
    pub statuses: Vec<(Option<usize>, StatusKind)>,
}

impl PlayReport {
    fn record_hit(&mut self, index: usize, element: Option<Element>, outcome: DamageOutcome) {
        if outcome.resonance_gained > 0 {
            self.resonance_element = element;
        }
        self.resonance_gained += outcome.resonance_gained;
        self.penalty_cards += outcome.penalty_cards;
        self.hits.push((index, outcome));
    }

    /// Total HP removed from enemies.
    #[must_use]
    pub fn damage_dealt(&self) -> i32 {
        self.hits.iter().map(|(_, o)| -o.hp_delta).sum()
    }
}
