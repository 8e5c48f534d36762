//! Status effects and the per-combatant status table.
//!
//! Each combatant holds at most one entry per `StatusKind`; re-applying a status
//! merges into the existing entry instead of stacking a duplicate.
//!
//! ## Ticking
//!
//! Statuses tick at two points of their *holder's* turn:
//!
//! - **Start of turn**: damage-over-time and regeneration resolve. Poison deals its
//!   amount and then loses one amount; Burn deals its amount and loses one
//!   duration; Regen heals its amount and loses one duration.
//! - **End of turn**: every other non-permanent status loses one duration.
//!
//! Entries whose duration or amount reaches zero are removed.
//!
//! Enemies act inside their own turn, so whatever an enemy applies (to itself
//! or to the player) is marked *fresh* and skips the holder's next end-of-turn
//! decrement. A one-turn enemy buff therefore lasts into its next action, and
//! a one-turn Vulnerable on the player lasts into the next enemy turn.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{ArtifactId, CardId, DilemmaId, EnemyId};

/// Kinds of status effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusKind {
    /// +amount outgoing damage per hit.
    Strength,
    /// +amount block per block gain.
    Dexterity,
    /// Outgoing damage ×0.75.
    Weak,
    /// Incoming damage ×1.5.
    Vulnerable,
    /// Block gained ×0.75.
    Frail,
    Poison,
    Burn,
    Regen,
}

impl StatusKind {
    /// Every kind, in tick order.
    pub const ALL: [StatusKind; 8] = [
        Self::Strength,
        Self::Dexterity,
        Self::Weak,
        Self::Vulnerable,
        Self::Frail,
        Self::Poison,
        Self::Burn,
        Self::Regen,
    ];

    /// Whether this status resolves at the start of its holder's turn.
    #[must_use]
    pub const fn ticks_at_start(self) -> bool {
        matches!(self, Self::Poison | Self::Burn | Self::Regen)
    }

}

/// How long a status lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusDuration {
    Turns(u32),
    Permanent,
}

impl StatusDuration {
    /// Combine two durations on re-application.
    #[must_use]
    pub fn merge(self, other: StatusDuration) -> StatusDuration {
        match (self, other) {
            (Self::Turns(a), Self::Turns(b)) => Self::Turns(a.saturating_add(b)),
            _ => Self::Permanent,
        }
    }

    /// Extend by `n` turns. Permanent stays permanent.
    #[must_use]
    pub fn extended(self, n: u32) -> StatusDuration {
        match self {
            Self::Turns(t) => Self::Turns(t.saturating_add(n)),
            Self::Permanent => Self::Permanent,
        }
    }

    fn decrement(&mut self) {
        if let Self::Turns(t) = self {
            *t = t.saturating_sub(1);
        }
    }

    fn is_expired(self) -> bool {
        self == Self::Turns(0)
    }
}

/// Who applied a status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusSource {
    Card(CardId),
    Enemy(EnemyId),
    Artifact(ArtifactId),
    Dilemma(DilemmaId),
}

impl StatusSource {
    const fn applies_fresh(self) -> bool {
        matches!(self, Self::Enemy(_))
    }
}

/// One active status on a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub duration: StatusDuration,
    pub amount: i32,
    pub source: StatusSource,
    /// Skips the next end-of-turn decrement.
    #[serde(default)]
    fresh: bool,
}

impl StatusEntry {
    /// Whether the next end-of-turn tick will leave this entry's duration alone.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }
}

/// Net result of a start-of-turn tick, applied by the holder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StartTick {
    /// Unblockable damage to take.
    pub damage: i32,
    /// HP to restore.
    pub heal: i32,
}

/// Status table for one combatant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusTable {
    entries: FxHashMap<StatusKind, StatusEntry>,
}

impl StatusTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a status, merging with any existing entry of the same kind.
    ///
    /// Applications with non-positive amount or zero duration are ignored.
    pub fn apply(
        &mut self,
        kind: StatusKind,
        duration: StatusDuration,
        amount: i32,
        source: StatusSource,
    ) {
        if amount <= 0 || duration.is_expired() {
            return;
        }

        let fresh = source.applies_fresh();
        self.entries
            .entry(kind)
            .and_modify(|e| {
                e.duration = e.duration.merge(duration);
                e.amount = e.amount.saturating_add(amount);
                e.source = source;
                e.fresh |= fresh;
            })
            .or_insert(StatusEntry {
                duration,
                amount,
                source,
                fresh,
            });
    }

    /// Get an entry.
    #[must_use]
    pub fn get(&self, kind: StatusKind) -> Option<&StatusEntry> {
        self.entries.get(&kind)
    }

    /// Whether a status is active.
    #[must_use]
    pub fn has(&self, kind: StatusKind) -> bool {
        self.entries.contains_key(&kind)
    }

    /// Amount of a status, 0 if absent.
    #[must_use]
    pub fn amount(&self, kind: StatusKind) -> i32 {
        self.entries.get(&kind).map_or(0, |e| e.amount)
    }

    /// Remove a status entirely.
    pub fn remove(&mut self, kind: StatusKind) -> Option<StatusEntry> {
        self.entries.remove(&kind)
    }

    /// Remove every status.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of active statuses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no status is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Active statuses in stable kind order.
    pub fn iter(&self) -> impl Iterator<Item = (StatusKind, &StatusEntry)> {
        StatusKind::ALL
            .into_iter()
            .filter_map(move |kind| self.entries.get(&kind).map(|e| (kind, e)))
    }

    /// Resolve start-of-turn statuses.
    pub fn tick_start(&mut self) -> StartTick {
        let mut tick = StartTick::default();

        if let Some(poison) = self.entries.get_mut(&StatusKind::Poison) {
            tick.damage += poison.amount;
            poison.amount -= 1;
        }
        if let Some(burn) = self.entries.get_mut(&StatusKind::Burn) {
            tick.damage += burn.amount;
            burn.duration.decrement();
        }
        if let Some(regen) = self.entries.get_mut(&StatusKind::Regen) {
            tick.heal += regen.amount;
            regen.duration.decrement();
        }

        self.prune();
        tick
    }

    /// Decrement end-of-turn statuses. Fresh entries only lose their mark.
    pub fn tick_end(&mut self) {
        for (kind, entry) in self.entries.iter_mut() {
            if std::mem::take(&mut entry.fresh) {
                continue;
            }
            if !kind.ticks_at_start() {
                entry.duration.decrement();
            }
        }
        self.prune();
    }

    fn prune(&mut self) {
        self.entries
            .retain(|_, e| e.amount > 0 && !e.duration.is_expired());
    }
}
