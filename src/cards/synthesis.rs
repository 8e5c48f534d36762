//! Card effect synthesis.
//!
//! Turns a `CardDefinition` plus an upgrade flag into an `EffectSet` and a cost.
//!
//! ## Pipeline
//!
//! 1. **Override**: a hand-authored payload (from the `OverrideTable`, else the
//!    definition's own `override_effects`) is used verbatim.
//! 2. **Potentials**: each numeric channel reads one trait dimension,
//!    `floor(base × (1 + score / 10) × factor)`.
//! 3. **Tag gating**: a channel only materializes if its tag is present.
//! 4. **Statuses**: one application per status tag, duration 1, the tag's fixed
//!    amount; buffs land on the user, debuffs on the enemy (all enemies on
//!    `Sweep` cards).
//! 5. **Upgrade**: nonzero channels become `floor(v × 1.3) + flat`, statuses gain
//!    +1 duration and +1 amount. No channel that was zero is introduced.
//! 6. **Normalize**: clamp to non-negative, then enforce exclusions: damage
//!    suppresses block (unless `Hybrid`), then heal suppresses damage.
//!
//! A definition with no matching tags yields an all-zero set; that is valid.
//!
//! ## Cost
//!
//! `round(average score / class constant)`, +1 for rare, clamped to `[0, 3]`;
//! `Cheap` −1 and `Intense` +1, clamped again. The upgraded cost is one lower than
//! the base cost, except that a cost-1 card whose upgrade is significant keeps
//! cost 1. An upgrade never raises cost.

use std::collections::BTreeSet;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::definition::CardDefinition;
use super::effects::{EffectSet, StatusApplication, StatusTarget};
use super::traits::{CardTag, Rarity, ScoreVector, StatusSide, TraitDimension};
use crate::core::CardId;

/// Highest cost any card can have.
pub const MAX_COST: u8 = 3;

const DAMAGE_BASE: f32 = 6.0;
const BLOCK_BASE: f32 = 5.0;
const DRAW_BASE: f32 = 1.0;
const FOCUS_BASE: f32 = 1.0;
const HEAL_BASE: f32 = 3.0;
const SWEEP_FACTOR: f32 = 0.7;

const UPGRADE_MULTIPLIER: f32 = 1.3;
const DAMAGE_UPGRADE_FLAT: i32 = 2;
const BLOCK_UPGRADE_FLAT: i32 = 2;
const DRAW_UPGRADE_FLAT: i32 = 1;
const FOCUS_UPGRADE_FLAT: i32 = 1;
const HEAL_UPGRADE_FLAT: i32 = 2;

/// Relative growth above which an upgrade counts as significant.
const SIGNIFICANT_RATIO: f32 = 0.4;
/// Absolute growth above which an upgrade counts as significant.
const SIGNIFICANT_ABSOLUTE: i32 = 3;

/// Monotonic channel scaling.
#[must_use]
pub fn potential(base: f32, score: f32, factor: f32) -> i32 {
    (base * (1.0 + score / 10.0) * factor).floor() as i32
}

fn damage_potential(scores: &ScoreVector, sweep: bool) -> i32 {
    let factor = if sweep { SWEEP_FACTOR } else { 1.0 };
    potential(DAMAGE_BASE, scores.get(TraitDimension::Intensity), factor)
}

fn block_potential(scores: &ScoreVector) -> i32 {
    potential(BLOCK_BASE, scores.get(TraitDimension::Structure), 1.0)
}

fn draw_potential(scores: &ScoreVector) -> i32 {
    potential(DRAW_BASE, scores.get(TraitDimension::Curiosity), 1.0)
}

fn focus_potential(scores: &ScoreVector) -> i32 {
    potential(FOCUS_BASE, scores.get(TraitDimension::Clarity), 1.0)
}

fn heal_potential(scores: &ScoreVector) -> i32 {
    potential(HEAL_BASE, scores.get(TraitDimension::Compassion), 1.0)
}

/// Steps 2-4: tag-gated channel potentials plus status applications.
fn generic_effects(scores: &ScoreVector, tags: &BTreeSet<CardTag>) -> EffectSet {
    let has = |tag: CardTag| tags.contains(&tag);
    let sweep = has(CardTag::Sweep);

    let mut set = EffectSet::new();
    if has(CardTag::Attack) {
        set.damage = damage_potential(scores, sweep);
        set.aoe = sweep;
    }
    if has(CardTag::Block) {
        set.block = block_potential(scores);
    }
    if has(CardTag::Draw) {
        set.draw = draw_potential(scores);
    }
    if has(CardTag::Focus) {
        set.focus = focus_potential(scores);
    }
    if has(CardTag::Heal) {
        set.heal = heal_potential(scores);
    }

    for tag in tags {
        append_status(&mut set, *tag, sweep);
    }

    set
}

fn append_status(set: &mut EffectSet, tag: CardTag, sweep: bool) {
    let Some((kind, side, amount)) = tag.status_grant() else {
        return;
    };
    let target = match side {
        StatusSide::Buff => StatusTarget::SelfTarget,
        StatusSide::Debuff if sweep => StatusTarget::AllEnemies,
        StatusSide::Debuff => StatusTarget::Enemy,
    };
    set.statuses
        .push(StatusApplication::new(kind, target, 1, amount));
}

fn upgrade_channel(value: i32, flat: i32) -> i32 {
    if value > 0 {
        (value as f32 * UPGRADE_MULTIPLIER).floor() as i32 + flat
    } else {
        value
    }
}

/// Step 5: the generic upgrade adjustment.
#[must_use]
pub fn apply_upgrade(set: &EffectSet) -> EffectSet {
    let mut up = set.clone();
    up.damage = upgrade_channel(set.damage, DAMAGE_UPGRADE_FLAT);
    up.block = upgrade_channel(set.block, BLOCK_UPGRADE_FLAT);
    up.draw = upgrade_channel(set.draw, DRAW_UPGRADE_FLAT);
    up.focus = upgrade_channel(set.focus, FOCUS_UPGRADE_FLAT);
    up.heal = upgrade_channel(set.heal, HEAL_UPGRADE_FLAT);
    for status in up.statuses.iter_mut() {
        status.duration = status.duration.extended(1);
        status.amount += 1;
    }
    up
}

/// Step 6: clamp and enforce channel exclusions.
#[must_use]
pub fn normalize(mut set: EffectSet, hybrid: bool) -> EffectSet {
    set.damage = set.damage.max(0);
    set.block = set.block.max(0);
    set.draw = set.draw.max(0);
    set.focus = set.focus.max(0);
    set.heal = set.heal.max(0);
    set.statuses.retain(|s| s.amount > 0);

    if set.damage > 0 && set.block > 0 && !hybrid {
        set.block = 0;
    }
    if set.heal > 0 && set.damage > 0 {
        set.damage = 0;
    }
    if set.damage == 0 {
        set.aoe = false;
    }
    set
}

/// Whether `after` improves on `before` enough to keep a cost-1 card at cost 1.
#[must_use]
pub fn is_significant(before: &EffectSet, after: &EffectSet) -> bool {
    let grew = before
        .channels()
        .into_iter()
        .zip(after.channels())
        .any(|(b, a)| {
            if b == 0 {
                a > 0
            } else {
                a - b > SIGNIFICANT_ABSOLUTE || (a - b) as f32 > b as f32 * SIGNIFICANT_RATIO
            }
        });

    let new_status = after
        .statuses
        .iter()
        .any(|s| !before.statuses.iter().any(|b| b.kind == s.kind));

    grew || new_status
}

/// Base cost of a definition.
#[must_use]
pub fn base_cost(def: &CardDefinition) -> u8 {
    let mut cost = (def.scores.average() / def.class.cost_constant()).round() as i32;
    if def.rarity == Rarity::Rare {
        cost += 1;
    }
    cost = cost.clamp(0, i32::from(MAX_COST));

    if def.has_tag(CardTag::Cheap) {
        cost -= 1;
    }
    if def.has_tag(CardTag::Intense) {
        cost += 1;
    }
    cost.clamp(0, i32::from(MAX_COST)) as u8
}

/// Cost of the upgraded variant.
#[must_use]
pub fn upgraded_cost(base_cost: u8, base: &EffectSet, upgraded: &EffectSet) -> u8 {
    let cost = if base_cost == 1 && is_significant(base, upgraded) {
        base_cost
    } else {
        base_cost.saturating_sub(1)
    };
    cost.min(base_cost)
}

/// Hand-authored payloads for the curated cards that deviate from the formula.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CardOverride {
    pub base: EffectSet,
    /// Upgraded payload. `None` applies the generic upgrade step to `base`.
    pub upgraded: Option<EffectSet>,
}

impl CardOverride {
    /// Override only the base payload.
    #[must_use]
    pub fn new(base: EffectSet) -> Self {
        Self {
            base,
            upgraded: None,
        }
    }

    /// Provide the upgraded payload (builder pattern).
    #[must_use]
    pub fn with_upgraded(mut self, upgraded: EffectSet) -> Self {
        self.upgraded = Some(upgraded);
        self
    }
}

/// Override table keyed by definition id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OverrideTable {
    entries: FxHashMap<CardId, CardOverride>,
}

impl OverrideTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an override, replacing any previous one for the id.
    pub fn insert(&mut self, id: CardId, entry: CardOverride) {
        self.entries.insert(id, entry);
    }

    /// Look up an override.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&CardOverride> {
        self.entries.get(&id)
    }

    /// Number of overrides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Derive the payload of a definition for one upgrade state.
///
/// Requesting the upgraded payload of a definition without an upgrade returns the
/// base payload.
#[must_use]
pub fn synthesize(def: &CardDefinition, upgraded: bool, overrides: &OverrideTable) -> EffectSet {
    let upgrade = def.upgrade.as_ref().filter(|_| upgraded);

    let curated = overrides
        .get(def.id)
        .cloned()
        .or_else(|| def.override_effects.clone().map(CardOverride::new));
    if let Some(curated) = curated {
        return match upgrade {
            None => curated.base,
            Some(up) => up
                .override_effects
                .clone()
                .or(curated.upgraded)
                .unwrap_or_else(|| apply_upgrade(&curated.base)),
        };
    }

    let hybrid = def.has_tag(CardTag::Hybrid);
    let Some(up) = upgrade else {
        return normalize(generic_effects(&def.scores, &def.tags), hybrid);
    };
    if let Some(hand_authored) = &up.override_effects {
        return hand_authored.clone();
    }

    let scores = up.scores.unwrap_or(def.scores);
    let mut set = apply_upgrade(&generic_effects(&scores, &def.tags));

    let sweep = def.has_tag(CardTag::Sweep);
    for tag in up.tags.iter().filter(|t| !def.has_tag(**t)) {
        append_status(&mut set, *tag, sweep);
    }

    normalize(set, hybrid)
}

/// A synthesized payload with its cost.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesizedCard {
    pub effects: EffectSet,
    pub cost: u8,
}

/// Memoizing front end to `synthesize`.
///
/// Results are cached per `(definition id, upgraded)`.
#[derive(Clone, Debug, Default)]
pub struct Synthesizer {
    overrides: OverrideTable,
    cache: FxHashMap<(CardId, bool), Arc<SynthesizedCard>>,
}

impl Synthesizer {
    /// Synthesizer without overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Synthesizer consulting a curated override table.
    #[must_use]
    pub fn with_overrides(overrides: OverrideTable) -> Self {
        Self {
            overrides,
            cache: FxHashMap::default(),
        }
    }

    /// The override table.
    #[must_use]
    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    /// Payload and cost of the base variant.
    pub fn base(&mut self, def: &CardDefinition) -> Arc<SynthesizedCard> {
        if let Some(hit) = self.cache.get(&(def.id, false)) {
            return Arc::clone(hit);
        }

        let card = Arc::new(SynthesizedCard {
            effects: synthesize(def, false, &self.overrides),
            cost: base_cost(def),
        });
        self.cache.insert((def.id, false), Arc::clone(&card));
        card
    }

    /// Payload and cost of the upgraded variant, or `None` if the definition has
    /// no upgrade.
    pub fn upgraded(&mut self, def: &CardDefinition) -> Option<Arc<SynthesizedCard>> {
        if !def.is_upgradable() {
            return None;
        }
        if let Some(hit) = self.cache.get(&(def.id, true)) {
            return Some(Arc::clone(hit));
        }

        let base = self.base(def);
        let effects = synthesize(def, true, &self.overrides);
        let card = Arc::new(SynthesizedCard {
            cost: upgraded_cost(base.cost, &base.effects, &effects),
            effects,
        });
        self.cache.insert((def.id, true), Arc::clone(&card));
        Some(card)
    }

    /// Number of cached payloads.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}
