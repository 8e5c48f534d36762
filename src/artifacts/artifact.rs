//! Artifacts: passive effects held by the player.
//!
//! An artifact listens for exactly one `EventKind`. When a matching event is
//! dispatched its condition is evaluated and, if it holds, its effect runs.
//! Both are closures over an `ArtifactScope`, which hands them the state they
//! may read or mutate explicitly; nothing is looked up ambiently.
//!
//! Conditions and effects are fallible. A returned `ArtifactFault` (or a panic
//! inside either closure) is caught by the dispatcher and treated as a
//! non-trigger.

use std::fmt;
use std::sync::Arc;

use super::event::{CombatEvent, EventKind};
use crate::cards::{ContentCatalog, Rarity};
use crate::combatant::{AffinityRules, Enemy, Player};
use crate::core::ArtifactId;
use crate::error::ArtifactFault;

/// Condition closure.
pub type ConditionFn = Arc<dyn Fn(&ArtifactScope<'_>) -> Result<bool, ArtifactFault> + Send + Sync>;

/// Effect closure.
pub type EffectFn = Arc<dyn Fn(&mut ArtifactScope<'_>) -> Result<(), ArtifactFault> + Send + Sync>;

fn always(_: &ArtifactScope<'_>) -> Result<bool, ArtifactFault> {
    Ok(true)
}

/// Everything an artifact can see and touch while handling one event.
pub struct ArtifactScope<'a> {
    pub player: &'a mut Player,
    pub enemies: &'a mut [Enemy],
    pub event: &'a CombatEvent,
    pub catalog: &'a ContentCatalog,
    /// Current player turn, starting at 1.
    pub turn: u32,
    pub rules: AffinityRules,
    /// The artifact being run.
    pub source: ArtifactId,
    raised: Vec<CombatEvent>,
}

impl<'a> ArtifactScope<'a> {
    /// Create a scope for one artifact invocation.
    pub fn new(
        player: &'a mut Player,
        enemies: &'a mut [Enemy],
        event: &'a CombatEvent,
        catalog: &'a ContentCatalog,
        turn: u32,
        rules: AffinityRules,
        source: ArtifactId,
    ) -> Self {
        Self {
            player,
            enemies,
            event,
            catalog,
            turn,
            rules,
            source,
            raised: Vec::new(),
        }
    }

    /// Raise an event that the player's own bookkeeping does not record
    /// (anything happening to enemies). It is dispatched in the next round.
    pub fn raise(&mut self, event: CombatEvent) {
        self.raised.push(event);
    }

    /// Events raised so far.
    pub fn into_raised(self) -> Vec<CombatEvent> {
        self.raised
    }
}

/// A held artifact. Immutable once created.
#[derive(Clone)]
pub struct Artifact {
    id: ArtifactId,
    name: String,
    rarity: Rarity,
    trigger: EventKind,
    condition: ConditionFn,
    effect: EffectFn,
}

impl Artifact {
    /// Create an unconditional artifact.
    pub fn new<F>(id: ArtifactId, name: impl Into<String>, trigger: EventKind, effect: F) -> Self
    where
        F: Fn(&mut ArtifactScope<'_>) -> Result<(), ArtifactFault> + Send + Sync + 'static,
    {
        Self {
            id,
            name: name.into(),
            rarity: Rarity::Common,
            trigger,
            condition: Arc::new(always),
            effect: Arc::new(effect),
        }
    }

    /// Gate the effect behind a condition (builder pattern).
    #[must_use]
    pub fn with_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&ArtifactScope<'_>) -> Result<bool, ArtifactFault> + Send + Sync + 'static,
    {
        self.condition = Arc::new(condition);
        self
    }

    #[must_use]
    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    #[must_use]
    pub fn id(&self) -> ArtifactId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn rarity(&self) -> Rarity {
        self.rarity
    }

    #[must_use]
    pub fn trigger(&self) -> EventKind {
        self.trigger
    }

    /// Handle an event. Returns whether the effect ran.
    ///
    /// A trigger mismatch is a no-op; a failing condition or effect is
    /// returned as an error for the dispatcher to log.
    pub fn handle(&self, scope: &mut ArtifactScope<'_>) -> Result<bool, ArtifactFault> {
        if scope.event.kind() != self.trigger {
            return Ok(false);
        }
        if !(self.condition)(&*scope)? {
            return Ok(false);
        }
        (self.effect)(scope)?;
        Ok(true)
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("rarity", &self.rarity)
            .field("trigger", &self.trigger)
            .finish_non_exhaustive()
    }
}
