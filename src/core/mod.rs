//! Core types shared by every subsystem: ids, RNG, configuration.

pub mod config;
pub mod ids;
pub mod rng;

pub use config::CombatConfig;
pub use ids::{ArtifactId, CardId, DilemmaId, EnemyId, InstanceAllocator, InstanceId};
pub use rng::{GameRng, GameRngState};
