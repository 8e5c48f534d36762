//! Victory rewards, delegated to an external generator.

use serde::{Deserialize, Serialize};

use crate::core::{ArtifactId, CardId, EnemyId};

/// Kind of encounter being fought. Passed through to the reward generator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncounterType {
    #[default]
    Normal,
    Elite,
    Boss,
}

/// Rewards offered after a victory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewards {
    /// Meta currency.
    pub insight: u32,
    pub card_choice_ids: Vec<CardId>,
    pub artifact_choice_id: Option<ArtifactId>,
}

/// Computes rewards. Invoked exactly once per won combat.
pub trait RewardGenerator {
    fn generate(&mut self, encounter: EncounterType, roster: &[EnemyId]) -> Rewards;
}

/// Generator that offers nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRewards;

impl RewardGenerator for NoRewards {
    fn generate(&mut self, _encounter: EncounterType, _roster: &[EnemyId]) -> Rewards {
        Rewards::default()
    }
}
