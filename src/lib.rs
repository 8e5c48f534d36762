//! # concept-combat
//!
//! Combat core for a turn-based deck-builder whose cards are synthesized from
//! trait score vectors instead of being authored one by one.
//!
//! ## Design Principles
//!
//! 1. **Derived, Immutable Cards**: a `CardDefinition` never changes. Its
//!    numeric payload (`EffectSet`) and cost are a pure function of the
//!    definition and an upgrade flag, cached per pair.
//!
//! 2. **One Combatant Model**: player and enemies share HP, Block, statuses
//!    and modifiers through the `Combatant` trait; the rules live once.
//!
//! 3. **Events, Not Special Cases**: artifacts subscribe to `CombatEvent`
//!    kinds and run in acquisition order. The core never names an artifact.
//!
//! 4. **Deterministic**: every shuffle and enemy choice draws from a seeded
//!    `GameRng`; the same seed and inputs replay the same combat.
//!
//! ## Modules
//!
//! - `core`: ids, RNG, configuration
//! - `error`: error types
//! - `cards`: score vectors, definitions, synthesis, instances, catalog
//! - `zones`: the deck and its four zones
//! - `combatant`: statuses, damage pipeline, player, enemies
//! - `artifacts`: combat events and event-conditioned artifacts
//! - `combat`: the combat state machine
//!
//! ## Logging
//!
//! The crate logs through `tracing` and installs no subscriber.

pub mod artifacts;
pub mod cards;
pub mod combat;
pub mod combatant;
pub mod core;
pub mod error;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    ArtifactId, CardId, CombatConfig, DilemmaId, EnemyId, GameRng, GameRngState, InstanceAllocator,
    InstanceId,
};

pub use crate::error::{ActionError, ArtifactFault, CombatError, ContentError};

pub use crate::cards::{
    CardDefinition, CardInstance, CardTag, ContentCatalog, EffectSet, Element, ScoreVector,
    Synthesizer, TraitDimension,
};

pub use crate::zones::{DeckManager, Zone};

pub use crate::combatant::{
    Combatant, Enemy, EnemyDefinition, EnemyMove, Player, StatusKind, StatusTable,
};

pub use crate::artifacts::{Artifact, ArtifactTemplate, CombatEvent, EventKind};

pub use crate::combat::{
    CombatManager, CombatOutcome, CombatPhase, CombatSnapshot, Dilemma, EncounterType, PlayerInput,
    RewardGenerator, Rewards,
};
