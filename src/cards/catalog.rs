//! Content catalog for definition lookup.
//!
//! The `ContentCatalog` is read-only content: card definitions, the curated
//! override table, enemy definitions and artifact templates, all keyed by stable
//! id. Combat never mutates it; it is shared behind an `Arc` and injected
//! wherever a lookup is needed (including artifact conditions).
//!
//! Missing ids are not fatal. A missing card becomes an unplayable placeholder
//! (logged at `warn`), so a broken content reference cannot abort a combat.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::warn;

use super::definition::CardDefinition;
use super::instance::CardInstance;
use super::synthesis::{CardOverride, OverrideTable, Synthesizer};
use super::traits::ActionClass;
use crate::artifacts::{Artifact, ArtifactTemplate};
use crate::combatant::EnemyDefinition;
use crate::core::{ArtifactId, CardId, EnemyId, InstanceId};
use crate::error::ContentError;

/// Id of the built-in penalty card used when the catalog names none.
pub const DEFAULT_PENALTY_CARD: CardId = CardId::new(u32::MAX);

/// Catalog of all combat content.
///
/// ## Example
///
/// ```
/// use concept_combat::cards::{ActionClass, CardDefinition, ContentCatalog};
/// use concept_combat::core::CardId;
///
/// let catalog = ContentCatalog::new()
///     .with_card(CardDefinition::new(CardId::new(1), "Spark", ActionClass::Offense));
///
/// assert_eq!(catalog.card(CardId::new(1)).unwrap().name, "Spark");
/// assert!(catalog.card_or_placeholder(CardId::new(2)).unplayable);
/// ```
#[derive(Clone, Debug)]
pub struct ContentCatalog {
    cards: FxHashMap<CardId, Arc<CardDefinition>>,
    overrides: OverrideTable,
    enemies: FxHashMap<EnemyId, Arc<EnemyDefinition>>,
    artifacts: FxHashMap<ArtifactId, ArtifactTemplate>,
    penalty_card: Arc<CardDefinition>,
}

impl Default for ContentCatalog {
    fn default() -> Self {
        Self {
            cards: FxHashMap::default(),
            overrides: OverrideTable::new(),
            enemies: FxHashMap::default(),
            artifacts: FxHashMap::default(),
            penalty_card: Arc::new(
                CardDefinition::new(DEFAULT_PENALTY_CARD, "Dissonance", ActionClass::Utility).unplayable(),
            ),
        }
    }
}

impl ContentCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === Cards ===

    /// Register a card definition (builder pattern).
    #[must_use]
    pub fn with_card(mut self, card: CardDefinition) -> Self {
        self.register_card(card);
        self
    }

    /// Register a card definition, replacing any previous one with the same id.
    pub fn register_card(&mut self, card: CardDefinition) -> Option<Arc<CardDefinition>> {
        self.cards.insert(card.id, Arc::new(card))
    }

    /// Get a card definition by id.
    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&Arc<CardDefinition>> {
        self.cards.get(&id)
    }

    /// Get a card definition, or an unplayable placeholder if it is missing.
    #[must_use]
    pub fn card_or_placeholder(&self, id: CardId) -> Arc<CardDefinition> {
        if let Some(card) = self.cards.get(&id) {
            return Arc::clone(card);
        }
        if id == self.penalty_card.id {
            return Arc::clone(&self.penalty_card);
        }
        warn!(error = %ContentError::MissingCard(id), "using placeholder card");
        Arc::new(CardDefinition::placeholder(id))
    }

    /// Iterate all registered card definitions.
    pub fn cards(&self) -> impl Iterator<Item = &Arc<CardDefinition>> {
        self.cards.values()
    }

    /// Number of registered cards.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// Create an instance of a card, using a placeholder for a missing id.
    pub fn instantiate_card(&self, id: CardId, instance: InstanceId, synth: &mut Synthesizer) -> CardInstance {
        CardInstance::new(instance, self.card_or_placeholder(id), synth)
    }

    // === Overrides ===

    /// Register a curated payload override (builder pattern).
    #[must_use]
    pub fn with_override(mut self, id: CardId, entry: CardOverride) -> Self {
        self.overrides.insert(id, entry);
        self
    }

    #[must_use]
    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    /// A synthesizer consulting this catalog's overrides.
    #[must_use]
    pub fn synthesizer(&self) -> Synthesizer {
        Synthesizer::with_overrides(self.overrides.clone())
    }

    // === Penalty card ===

    /// Use a custom penalty card (builder pattern). It is registered as a card
    /// too; it should be unplayable.
    #[must_use]
    pub fn with_penalty_card(mut self, card: CardDefinition) -> Self {
        let card = Arc::new(card);
        self.cards.insert(card.id, Arc::clone(&card));
        self.penalty_card = card;
        self
    }

    /// Definition queued into the attacker's discard on a resistance hit.
    #[must_use]
    pub fn penalty_card(&self) -> &Arc<CardDefinition> {
        &self.penalty_card
    }

    // === Enemies ===

    #[must_use]
    pub fn with_enemy(mut self, enemy: EnemyDefinition) -> Self {
        self.register_enemy(enemy);
        self
    }

    pub fn register_enemy(&mut self, enemy: EnemyDefinition) -> Option<Arc<EnemyDefinition>> {
        self.enemies.insert(enemy.id, Arc::new(enemy))
    }

    #[must_use]
    pub fn enemy(&self, id: EnemyId) -> Option<&Arc<EnemyDefinition>> {
        self.enemies.get(&id)
    }

    // === Artifacts ===

    #[must_use]
    pub fn with_artifact(mut self, template: ArtifactTemplate) -> Self {
        self.register_artifact(template);
        self
    }

    pub fn register_artifact(&mut self, template: ArtifactTemplate) -> Option<ArtifactTemplate> {
        self.artifacts.insert(template.id, template)
    }

    #[must_use]
    pub fn artifact_template(&self, id: ArtifactId) -> Option<&ArtifactTemplate> {
        self.artifacts.get(&id)
    }

    /// Build a live artifact from its template.
    pub fn instantiate_artifact(&self, id: ArtifactId) -> Result<Artifact, ContentError> {
        self.artifacts
            .get(&id)
            .map(ArtifactTemplate::instantiate)
            .ok_or(ContentError::MissingArtifact(id))
    }
}
