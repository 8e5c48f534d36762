//! Card system: definitions, synthesis, instances, and the content catalog.
//!
//! ## Key Types
//!
//! - `ScoreVector`: a concept's score on each `TraitDimension`
//! - `CardDefinition`: immutable card data (scores, tags, rarity, class)
//! - `EffectSet`: the resolved payload of a card for one upgrade state
//! - `Synthesizer`: derives and caches payloads and costs
//! - `CardInstance`: one copy of a card in a deck, with upgrade state
//! - `ContentCatalog`: read-only content lookup by id

pub mod catalog;
pub mod definition;
pub mod effects;
pub mod instance;
pub mod synthesis;
pub mod traits;

pub use catalog::{ContentCatalog, DEFAULT_PENALTY_CARD};
pub use definition::{CardDefinition, CardUpgrade};
pub use effects::{EffectSet, StatusApplication, StatusTarget, TargetRequirement};
pub use instance::{CardInstance, PlayContext, PlayReport};
pub use synthesis::{
    apply_upgrade, base_cost, is_significant, normalize, potential, synthesize, upgraded_cost,
    CardOverride, OverrideTable, SynthesizedCard, Synthesizer, MAX_COST,
};
pub use traits::{
    ActionClass, Affinity, CardTag, Element, Rarity, ScoreVector, StatusSide, TraitDimension,
    MAX_SCORE, TRAIT_COUNT,
};
