//! `EffectSet`: the resolved numeric and status payload of a card.
//!
//! An `EffectSet` is a value object. It is derived once per
//! `(definition, upgraded)` pair by synthesis (or taken from a hand-authored
//! override) and never mutated afterwards.
//!
//! ## Targeting
//!
//! Targeting is resolved per channel, not per card:
//!
//! - damage lands on the chosen enemy, or on every living enemy when `aoe` is set
//! - block, draw, focus and heal always land on the actor
//! - each status application carries its own `StatusTarget`
//!
//! `target_requirement` summarizes whether the card needs a chosen enemy at all.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::combatant::{StatusDuration, StatusKind};

/// Where a status application lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusTarget {
    /// The card's user.
    SelfTarget,
    /// The chosen enemy.
    Enemy,
    /// Every living enemy.
    AllEnemies,
}

/// One status a card applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusApplication {
    pub kind: StatusKind,
    pub target: StatusTarget,
    pub duration: StatusDuration,
    pub amount: i32,
}

impl StatusApplication {
    /// Create an application lasting `turns` turns.
    #[must_use]
    pub const fn new(kind: StatusKind, target: StatusTarget, turns: u32, amount: i32) -> Self {
        Self {
            kind,
            target,
            duration: StatusDuration::Turns(turns),
            amount,
        }
    }
}

/// What a card needs chosen before it can be played.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetRequirement {
    /// Nothing to aim (no effects, or only area effects).
    #[default]
    None,
    /// Affects only the user.
    SelfOnly,
    /// Needs one living enemy.
    SingleEnemy,
}

/// Resolved payload of a card for one upgrade state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSet {
    pub damage: i32,
    pub aoe: bool,
    pub block: i32,
    pub draw: i32,
    pub focus: i32,
    pub heal: i32,
    pub statuses: SmallVec<[StatusApplication; 2]>,
}

impl EffectSet {
    /// An all-zero effect set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set damage (builder pattern).
    #[must_use]
    pub fn with_damage(mut self, damage: i32) -> Self {
        self.damage = damage;
        self
    }

    /// Make damage hit every enemy (builder pattern).
    #[must_use]
    pub fn area(mut self) -> Self {
        self.aoe = true;
        self
    }

    /// Set block (builder pattern).
    #[must_use]
    pub fn with_block(mut self, block: i32) -> Self {
        self.block = block;
        self
    }

    /// Set draw (builder pattern).
    #[must_use]
    pub fn with_draw(mut self, draw: i32) -> Self {
        self.draw = draw;
        self
    }

    /// Set focus (builder pattern).
    #[must_use]
    pub fn with_focus(mut self, focus: i32) -> Self {
        self.focus = focus;
        self
    }

    /// Set heal (builder pattern).
    #[must_use]
    pub fn with_heal(mut self, heal: i32) -> Self {
        self.heal = heal;
        self
    }

    /// Append a status application (builder pattern).
    #[must_use]
    pub fn with_status(mut self, status: StatusApplication) -> Self {
        self.statuses.push(status);
        self
    }

    /// Whether every channel is zero and no status is applied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.damage == 0
            && self.block == 0
            && self.draw == 0
            && self.focus == 0
            && self.heal == 0
            && self.statuses.is_empty()
    }

    /// Whether any part of this set needs a single chosen enemy.
    #[must_use]
    pub fn needs_enemy_target(&self) -> bool {
        (self.damage > 0 && !self.aoe)
            || self.statuses.iter().any(|s| s.target == StatusTarget::Enemy)
    }

    /// Summarized targeting need.
    #[must_use]
    pub fn target_requirement(&self) -> TargetRequirement {
        if self.needs_enemy_target() {
            TargetRequirement::SingleEnemy
        } else if self.block > 0
            || self.draw > 0
            || self.focus > 0
            || self.heal > 0
            || self.statuses.iter().any(|s| s.target == StatusTarget::SelfTarget)
        {
            TargetRequirement::SelfOnly
        } else {
            TargetRequirement::None
        }
    }

    /// Numeric channels in a fixed order: damage, block, draw, focus, heal.
    #[must_use]
    pub fn channels(&self) -> [i32; 5] {
        [self.damage, self.block, self.draw, self.focus, self.heal]
    }
}
