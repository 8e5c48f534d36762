//! Combatants: the player and enemies.
//!
//! Both share one capability set (`Combatant`): HP, Block, statuses, and the
//! modifiers statuses imply. The rules live once in `Vitals`; `Player` adds a
//! resource pool, deck and artifacts, `Enemy` adds a move policy and intent.
//!
//! ## Key Types
//!
//! - `StatusTable`: at most one merged entry per `StatusKind`
//! - `compute_damage`: the pure damage pipeline
//! - `Combatant`: the shared capability trait
//! - `Player`, `Enemy`: the two implementations

pub mod damage;
pub mod enemy;
pub mod player;
pub mod status;
pub mod vitals;

pub use damage::{compute_damage, AffinityRules, DamageInput, DamageOutcome};
pub use enemy::{Enemy, EnemyActionReport, EnemyDefinition, EnemyMove, Intent, IntentKind, MovePolicy};
pub use player::{Momentum, Player};
pub use status::{StartTick, StatusDuration, StatusEntry, StatusKind, StatusSource, StatusTable};
pub use vitals::{Combatant, TurnStartReport, Vitals};
