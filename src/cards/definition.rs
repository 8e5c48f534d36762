//! Card definitions - immutable card data.
//!
//! A `CardDefinition` describes a concept: its trait scores, synthesis tags,
//! rarity and class. It does not list numbers directly; those come from
//! synthesis (or a hand-authored override for the curated few).
//!
//! Runtime state (upgrade flag, temporary cost) lives on `CardInstance`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::effects::EffectSet;
use super::traits::{ActionClass, CardTag, Element, Rarity, ScoreVector};
use crate::core::CardId;

/// Upgraded variant of a definition.
///
/// Every field is optional: an upgrade with nothing set still improves the card
/// through the generic upgrade step.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CardUpgrade {
    /// Replacement scores for the upgraded card.
    pub scores: Option<ScoreVector>,

    /// Extra tags. Only status tags take effect; an upgrade never opens a new
    /// numeric channel.
    #[serde(default)]
    pub tags: BTreeSet<CardTag>,

    /// Hand-authored upgraded payload.
    pub override_effects: Option<EffectSet>,
}

impl CardUpgrade {
    /// An upgrade relying purely on the generic upgrade step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace scores (builder pattern).
    #[must_use]
    pub fn with_scores(mut self, scores: ScoreVector) -> Self {
        self.scores = Some(scores);
        self
    }

    /// Add a tag (builder pattern).
    #[must_use]
    pub fn with_tag(mut self, tag: CardTag) -> Self {
        self.tags.insert(tag);
        self
    }

    /// Use a hand-authored payload (builder pattern).
    #[must_use]
    pub fn with_override(mut self, effects: EffectSet) -> Self {
        self.override_effects = Some(effects);
        self
    }
}

/// Immutable card definition.
///
/// ## Example
///
/// ```
/// use concept_combat::cards::{ActionClass, CardDefinition, CardTag, Rarity, ScoreVector, TraitDimension};
/// use concept_combat::core::CardId;
///
/// let spark = CardDefinition::new(CardId::new(1), "Spark", ActionClass::Offense)
///     .with_rarity(Rarity::Common)
///     .with_scores(ScoreVector::new().with(TraitDimension::Intensity, 7.0))
///     .with_tag(CardTag::Attack);
///
/// assert!(spark.has_tag(CardTag::Attack));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Unique identifier for this definition.
    pub id: CardId,

    /// Display name.
    pub name: String,

    pub rarity: Rarity,

    pub class: ActionClass,

    /// Element of any damage this card deals.
    pub element: Option<Element>,

    /// Trait scores in `[0, 10]`.
    pub scores: ScoreVector,

    /// Synthesis tags, ordered so status applications are deterministic.
    #[serde(default)]
    pub tags: BTreeSet<CardTag>,

    pub upgrade: Option<CardUpgrade>,

    /// Hand-authored payload bypassing synthesis.
    pub override_effects: Option<EffectSet>,

    /// Unplayable cards (penalty cards, missing-content placeholders) have no cost.
    #[serde(default)]
    pub unplayable: bool,
}

impl CardDefinition {
    /// Create a common definition with zero scores and no tags.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>, class: ActionClass) -> Self {
        Self {
            id,
            name: name.into(),
            rarity: Rarity::Common,
            class,
            element: None,
            scores: ScoreVector::default(),
            tags: BTreeSet::new(),
            upgrade: None,
            override_effects: None,
            unplayable: false,
        }
    }

    /// Definition standing in for a card id the catalog does not know.
    #[must_use]
    pub fn placeholder(id: CardId) -> Self {
        Self::new(id, format!("Missing {}", id), ActionClass::Utility).unplayable()
    }

    /// Set rarity (builder pattern).
    #[must_use]
    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    /// Set element (builder pattern).
    #[must_use]
    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    /// Set scores (builder pattern).
    #[must_use]
    pub fn with_scores(mut self, scores: ScoreVector) -> Self {
        self.scores = scores;
        self
    }

    /// Add a tag (builder pattern).
    #[must_use]
    pub fn with_tag(mut self, tag: CardTag) -> Self {
        self.tags.insert(tag);
        self
    }

    /// Add several tags (builder pattern).
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = CardTag>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Attach an upgrade (builder pattern).
    #[must_use]
    pub fn with_upgrade(mut self, upgrade: CardUpgrade) -> Self {
        self.upgrade = Some(upgrade);
        self
    }

    /// Use a hand-authored payload (builder pattern).
    #[must_use]
    pub fn with_override(mut self, effects: EffectSet) -> Self {
        self.override_effects = Some(effects);
        self
    }

    /// Mark as unplayable (builder pattern).
    #[must_use]
    pub fn unplayable(mut self) -> Self {
        self.unplayable = true;
        self
    }

    /// Check for a tag.
    #[must_use]
    pub fn has_tag(&self, tag: CardTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Whether the card leaves combat when played.
    #[must_use]
    pub fn exhausts(&self) -> bool {
        self.has_tag(CardTag::Exhaust)
    }

    /// Whether an upgraded variant exists.
    #[must_use]
    pub fn is_upgradable(&self) -> bool {
        self.upgrade.is_some()
    }
}
