//! Stable identifiers.
//!
//! Content ids (`CardId`, `EnemyId`, `ArtifactId`, `DilemmaId`) name entries in the
//! `ContentCatalog` and never change between runs. `InstanceId` names one concrete
//! card in a player's deck and is unique for the lifetime of a run.

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Create a new id.
            #[must_use]
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            /// Get the raw id value.
            #[must_use]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of a card definition (the "kind" of card, not a copy of it).
    CardId,
    "Card"
);

id_type!(
    /// Identifier of one card instance owned by a player.
    InstanceId,
    "Instance"
);

id_type!(
    /// Identifier of an enemy definition.
    EnemyId,
    "Enemy"
);

id_type!(
    /// Identifier of an artifact template.
    ArtifactId,
    "Artifact"
);

id_type!(
    /// Identifier of a scripted dilemma.
    DilemmaId,
    "Dilemma"
);

/// Allocator for run-unique instance ids.
///
/// Owned by whoever mints card instances (the run, or a `CombatManager` when it
/// creates combat-temporary penalty cards).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InstanceAllocator {
    next: u32,
}

impl InstanceAllocator {
    /// Create an allocator starting at id 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an allocator that continues after `last` (used when resuming a run).
    #[must_use]
    pub fn starting_after(last: InstanceId) -> Self {
        Self { next: last.0 + 1 }
    }

    /// Hand out the next id.
    pub fn alloc(&mut self) -> InstanceId {
        let id = InstanceId(self.next);
        self.next += 1;
        id
    }
}
