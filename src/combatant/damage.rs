//! The damage pipeline.
//!
//! A pure function of its inputs, used for both player→enemy and enemy→player
//! hits:
//!
//! 1. `pre = max(base + attacker strength, 0)`
//! 2. `raw = floor(pre × 0.75 if attacker is Weak × 1.5 if defender is Vulnerable)`
//! 3. Block absorbs `raw` 1:1; the excess is HP loss.
//!
//! Vulnerable multiplies raw damage *before* Block absorbs it.
//!
//! Elemental affinity does not change the number; it only decides what the
//! attacker gets out of the hit (resonance on weakness, penalty cards on
//! resistance).

use serde::{Deserialize, Serialize};

use crate::cards::Affinity;

/// Outgoing multiplier while Weak.
pub const WEAK_MULTIPLIER: f32 = 0.75;
/// Incoming multiplier while Vulnerable.
pub const VULNERABLE_MULTIPLIER: f32 = 1.5;

/// Inputs of one hit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageInput {
    pub base: i32,
    pub attacker_strength: i32,
    pub attacker_weak: bool,
    pub defender_block: i32,
    /// Vulnerable is on/off: any positive stack count applies ×1.5 once.
    pub defender_vulnerable: u32,
    pub affinity: Affinity,
}

impl DamageInput {
    /// A plain hit of `base` damage with no modifiers.
    #[must_use]
    pub fn new(base: i32) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_strength(mut self, strength: i32) -> Self {
        self.attacker_strength = strength;
        self
    }

    #[must_use]
    pub fn weak(mut self, weak: bool) -> Self {
        self.attacker_weak = weak;
        self
    }

    #[must_use]
    pub fn against_block(mut self, block: i32) -> Self {
        self.defender_block = block;
        self
    }

    #[must_use]
    pub fn vulnerable(mut self, stacks: u32) -> Self {
        self.defender_vulnerable = stacks;
        self
    }

    #[must_use]
    pub fn with_affinity(mut self, affinity: Affinity) -> Self {
        self.affinity = affinity;
        self
    }
}

/// What a weakness or resistance hit yields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffinityRules {
    pub resonance_per_weakness: u32,
    pub penalty_cards_per_resist: u32,
}

impl Default for AffinityRules {
    fn default() -> Self {
        Self {
            resonance_per_weakness: 1,
            penalty_cards_per_resist: 1,
        }
    }
}

/// Result of one hit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageOutcome {
    /// Damage after multipliers, before Block.
    pub raw: i32,
    /// Change to the defender's HP (zero or negative). Not yet clamped to the
    /// defender's remaining HP.
    pub hp_delta: i32,
    /// Change to the defender's Block (zero or negative).
    pub block_delta: i32,
    /// Resonance stacks the attacker gains.
    pub resonance_gained: u32,
    /// Penalty cards queued into the attacker's discard pile.
    pub penalty_cards: u32,
}

/// Run the pipeline.
#[must_use]
pub fn compute_damage(input: DamageInput, rules: AffinityRules) -> DamageOutcome {
    let mut scaled = (input.base + input.attacker_strength).max(0) as f32;
    if input.attacker_weak {
        scaled *= WEAK_MULTIPLIER;
    }
    if input.defender_vulnerable > 0 {
        scaled *= VULNERABLE_MULTIPLIER;
    }
    let raw = scaled.floor() as i32;

    let absorbed = raw.min(input.defender_block.max(0));
    let (resonance_gained, penalty_cards) = match input.affinity {
        Affinity::Neutral => (0, 0),
        Affinity::Weak => (rules.resonance_per_weakness, 0),
        Affinity::Resistant => (0, rules.penalty_cards_per_resist),
    };

    DamageOutcome {
        raw,
        hp_delta: -(raw - absorbed),
        block_delta: -absorbed,
        resonance_gained,
        penalty_cards,
    }
}
