//! Shared combatant capabilities: HP, Block, statuses, and the modifiers they imply.
//!
//! `Vitals` holds the state and implements the rules once; the `Combatant` trait
//! exposes them for both `Player` and `Enemy`.

use serde::{Deserialize, Serialize};

use super::damage::{compute_damage, AffinityRules, DamageInput, DamageOutcome};
use super::status::{StartTick, StatusDuration, StatusKind, StatusSource, StatusTable};
use crate::cards::{Affinity, Element};

/// Outgoing block multiplier while Frail.
pub const FRAIL_MULTIPLIER: f32 = 0.75;

/// HP, Block and statuses of one combatant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    hp: i32,
    max_hp: i32,
    block: i32,
    statuses: StatusTable,
}

/// Net effect of a start-of-turn status tick after it was applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TurnStartReport {
    pub hp_lost: i32,
    pub healed: i32,
}

impl Vitals {
    /// Full-health vitals.
    #[must_use]
    pub fn new(max_hp: i32) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            hp: max_hp,
            max_hp,
            block: 0,
            statuses: StatusTable::new(),
        }
    }

    /// Vitals at a given HP, clamped to `[0, max_hp]`.
    #[must_use]
    pub fn with_hp(max_hp: i32, hp: i32) -> Self {
        let mut v = Self::new(max_hp);
        v.hp = hp.clamp(0, v.max_hp);
        v
    }

    #[must_use]
    pub fn hp(&self) -> i32 {
        self.hp
    }

    #[must_use]
    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    #[must_use]
    pub fn block(&self) -> i32 {
        self.block
    }

    #[must_use]
    pub fn statuses(&self) -> &StatusTable {
        &self.statuses
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Lose HP, ignoring Block. Returns HP actually lost.
    pub fn lose_hp(&mut self, amount: i32) -> i32 {
        let lost = amount.max(0).min(self.hp);
        self.hp -= lost;
        lost
    }

    /// Restore HP up to max. Returns HP actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let healed = amount.max(0).min(self.max_hp - self.hp);
        self.hp += healed;
        healed
    }

    /// Gain Block after Dexterity and Frail. Returns Block gained.
    pub fn gain_block(&mut self, base: i32) -> i32 {
        if base <= 0 {
            return 0;
        }
        let mut amount = (base + self.statuses.amount(StatusKind::Dexterity)).max(0) as f32;
        if self.statuses.has(StatusKind::Frail) {
            amount *= FRAIL_MULTIPLIER;
        }
        let gained = amount.floor() as i32;
        self.block += gained;
        gained
    }

    /// Gain Block with no modifiers (artifacts, dilemmas).
    pub fn add_raw_block(&mut self, amount: i32) {
        self.block += amount.max(0);
    }

    /// Drop all Block.
    pub fn clear_block(&mut self) {
        self.block = 0;
    }

    /// Apply a status.
    pub fn apply_status(
        &mut self,
        kind: StatusKind,
        duration: StatusDuration,
        amount: i32,
        source: StatusSource,
    ) {
        self.statuses.apply(kind, duration, amount, source);
    }

    /// Remove every status.
    pub fn clear_statuses(&mut self) {
        self.statuses.clear();
    }

    /// Build the attacker half of a hit from this combatant's modifiers.
    #[must_use]
    pub fn outgoing(&self, base: i32) -> DamageInput {
        DamageInput::new(base)
            .with_strength(self.statuses.amount(StatusKind::Strength))
            .weak(self.statuses.has(StatusKind::Weak))
    }

    /// Fill in the defender half of a hit from this combatant's state.
    #[must_use]
    pub fn incoming(&self, hit: DamageInput, affinity: Affinity) -> DamageInput {
        let vulnerable = self
            .statuses
            .get(StatusKind::Vulnerable)
            .map_or(0, |e| e.amount.max(0) as u32);
        hit.against_block(self.block)
            .vulnerable(vulnerable)
            .with_affinity(affinity)
    }

    /// Receive a hit. Returns the outcome with `hp_delta` clamped to the HP lost.
    pub fn receive(&mut self, hit: DamageInput, affinity: Affinity, rules: AffinityRules) -> DamageOutcome {
        let mut outcome = compute_damage(self.incoming(hit, affinity), rules);
        self.block += outcome.block_delta;
        outcome.hp_delta = -self.lose_hp(-outcome.hp_delta);
        outcome
    }

    /// Start of this combatant's own turn: Block resets, then start-of-turn
    /// statuses resolve.
    pub fn begin_turn(&mut self) -> TurnStartReport {
        self.block = 0;
        self.tick_start_statuses()
    }

    /// Resolve start-of-turn statuses without touching Block.
    pub fn tick_start_statuses(&mut self) -> TurnStartReport {
        let StartTick { damage, heal } = self.statuses.tick_start();
        let hp_lost = self.lose_hp(damage);
        let healed = if self.is_alive() { self.heal(heal) } else { 0 };
        TurnStartReport { hp_lost, healed }
    }

    /// End of this combatant's own turn.
    pub fn end_turn(&mut self) {
        self.statuses.tick_end();
    }
}

/// Capability set shared by every combatant.
pub trait Combatant {
    fn vitals(&self) -> &Vitals;

    fn vitals_mut(&mut self) -> &mut Vitals;

    /// How this combatant reacts to an element.
    fn affinity(&self, _element: Option<Element>) -> Affinity {
        Affinity::Neutral
    }

    fn hp(&self) -> i32 {
        self.vitals().hp()
    }

    fn max_hp(&self) -> i32 {
        self.vitals().max_hp()
    }

    fn block(&self) -> i32 {
        self.vitals().block()
    }

    fn is_alive(&self) -> bool {
        self.vitals().is_alive()
    }

    fn statuses(&self) -> &StatusTable {
        self.vitals().statuses()
    }

    fn heal(&mut self, amount: i32) -> i32 {
        self.vitals_mut().heal(amount)
    }

    fn lose_hp(&mut self, amount: i32) -> i32 {
        self.vitals_mut().lose_hp(amount)
    }

    fn gain_block(&mut self, base: i32) -> i32 {
        self.vitals_mut().gain_block(base)
    }

    fn apply_status(
        &mut self,
        kind: StatusKind,
        duration: StatusDuration,
        amount: i32,
        source: StatusSource,
    ) {
        self.vitals_mut().apply_status(kind, duration, amount, source);
    }

    /// Take a hit of `element` built by an attacker's `outgoing`.
    fn take_hit(&mut self, hit: DamageInput, element: Option<Element>, rules: AffinityRules) -> DamageOutcome {
        let affinity = self.affinity(element);
        self.vitals_mut().receive(hit, affinity, rules)
    }
}
