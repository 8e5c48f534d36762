//! Trait dimensions, score vectors, tags, and elements.
//!
//! A card is described by *what it is* rather than *what it does*: a score on each
//! trait dimension plus a set of keyword tags. Synthesis turns that description into
//! numbers.
//!
//! ## Channel feeds
//!
//! | Dimension  | Feeds    |
//! |------------|----------|
//! | Intensity  | damage   |
//! | Structure  | block    |
//! | Curiosity  | draw     |
//! | Clarity    | focus    |
//! | Compassion | heal     |
//! | Volatility | cost only|

use serde::{Deserialize, Serialize};

use crate::combatant::StatusKind;

/// Number of trait dimensions (for array indexing).
pub const TRAIT_COUNT: usize = 6;

/// Highest score a dimension can hold.
pub const MAX_SCORE: f32 = 10.0;

/// One axis of a concept's scoring vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraitDimension {
    Intensity,
    Structure,
    Curiosity,
    Clarity,
    Compassion,
    Volatility,
}

impl TraitDimension {
    /// All dimensions in index order.
    pub const ALL: [TraitDimension; TRAIT_COUNT] = [
        Self::Intensity,
        Self::Structure,
        Self::Curiosity,
        Self::Clarity,
        Self::Compassion,
        Self::Volatility,
    ];

    /// Array index for this dimension.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Intensity => 0,
            Self::Structure => 1,
            Self::Curiosity => 2,
            Self::Clarity => 3,
            Self::Compassion => 4,
            Self::Volatility => 5,
        }
    }
}

/// Scores in `[0, 10]` for every trait dimension.
///
/// Values are clamped on write, deserialization included, so every stored
/// score is in range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; TRAIT_COUNT]", into = "[f32; TRAIT_COUNT]")]
pub struct ScoreVector([f32; TRAIT_COUNT]);

impl From<[f32; TRAIT_COUNT]> for ScoreVector {
    fn from(scores: [f32; TRAIT_COUNT]) -> Self {
        Self::from_scores(scores)
    }
}

impl From<ScoreVector> for [f32; TRAIT_COUNT] {
    fn from(scores: ScoreVector) -> Self {
        scores.0
    }
}

impl ScoreVector {
    /// All-zero vector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw scores, clamping each to `[0, 10]`.
    #[must_use]
    pub fn from_scores(scores: [f32; TRAIT_COUNT]) -> Self {
        let mut v = Self::default();
        for (dim, score) in TraitDimension::ALL.into_iter().zip(scores) {
            v.set(dim, score);
        }
        v
    }

    /// Set a score (builder pattern).
    #[must_use]
    pub fn with(mut self, dim: TraitDimension, score: f32) -> Self {
        self.set(dim, score);
        self
    }

    /// Set a score, clamping to `[0, 10]`. NaN is stored as 0.
    pub fn set(&mut self, dim: TraitDimension, score: f32) {
        let score = if score.is_nan() { 0.0 } else { score };
        self.0[dim.index()] = score.clamp(0.0, MAX_SCORE);
    }

    /// Get a score.
    #[must_use]
    pub fn get(&self, dim: TraitDimension) -> f32 {
        self.0[dim.index()]
    }

    /// Mean score across all dimensions.
    #[must_use]
    pub fn average(&self) -> f32 {
        self.0.iter().sum::<f32>() / TRAIT_COUNT as f32
    }

    /// The highest-scoring dimension. Ties go to the earlier dimension.
    #[must_use]
    pub fn dominant(&self) -> TraitDimension {
        let mut best = TraitDimension::Intensity;
        for dim in TraitDimension::ALL {
            if self.get(dim) > self.get(best) {
                best = dim;
            }
        }
        best
    }
}

/// Coarse role of a card. Drives the cost class constant and momentum streaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionClass {
    Offense,
    Defense,
    Utility,
}

impl ActionClass {
    /// Divisor applied to the average score when deriving cost.
    #[must_use]
    pub const fn cost_constant(self) -> f32 {
        match self {
            Self::Offense => 3.0,
            Self::Defense => 3.5,
            Self::Utility => 4.0,
        }
    }
}

/// Card rarity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
}

/// Keywords that drive synthesis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardTag {
    // === Channel tags ===
    Attack,
    Block,
    Draw,
    Focus,
    Heal,
    /// Damage hits every enemy (at reduced potential).
    Sweep,

    // === Modifiers ===
    /// Damage and block may coexist.
    Hybrid,
    Cheap,
    Intense,
    /// Card is exhausted instead of discarded after play.
    Exhaust,

    // === Status tags ===
    Empower,
    Fortify,
    Mend,
    Weaken,
    Expose,
    Cripple,
    Poison,
    Ignite,
}

/// Who a status tag lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusSide {
    Buff,
    Debuff,
}

impl CardTag {
    /// The status this tag grants, its side, and its fixed amount.
    #[must_use]
    pub const fn status_grant(self) -> Option<(StatusKind, StatusSide, i32)> {
        match self {
            Self::Empower => Some((StatusKind::Strength, StatusSide::Buff, 1)),
            Self::Fortify => Some((StatusKind::Dexterity, StatusSide::Buff, 1)),
            Self::Mend => Some((StatusKind::Regen, StatusSide::Buff, 2)),
            Self::Weaken => Some((StatusKind::Weak, StatusSide::Debuff, 1)),
            Self::Expose => Some((StatusKind::Vulnerable, StatusSide::Debuff, 1)),
            Self::Cripple => Some((StatusKind::Frail, StatusSide::Debuff, 1)),
            Self::Poison => Some((StatusKind::Poison, StatusSide::Debuff, 3)),
            Self::Ignite => Some((StatusKind::Burn, StatusSide::Debuff, 4)),
            _ => None,
        }
    }

    /// Whether this tag materializes a numeric channel.
    #[must_use]
    pub const fn is_channel(self) -> bool {
        matches!(
            self,
            Self::Attack | Self::Block | Self::Draw | Self::Focus | Self::Heal
        )
    }
}

/// Elemental flavour of a card; enemies are weak or resistant to elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    Ember,
    Tide,
    Gale,
    Stone,
    Radiance,
    Umbra,
}

/// How a defender reacts to an element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Affinity {
    #[default]
    Neutral,
    Weak,
    Resistant,
}
