//! Combat tuning knobs.
//!
//! `CombatConfig` is plain serde data so callers can load it from whatever format
//! their content pipeline uses. Builder methods cover the common overrides.

use serde::{Deserialize, Serialize};

use crate::combatant::AffinityRules;

/// Tuning for one combat.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Cards drawn at the start of every player turn.
    pub hand_size: usize,

    /// Hard cap on hand size; draws beyond it are skipped.
    pub max_hand_size: usize,

    /// Resource refilled at the start of every player turn.
    pub max_resource: u32,

    /// Card plays allowed per turn. `None` for unlimited.
    /// Reaching the cap ends the turn automatically.
    pub max_plays_per_turn: Option<u32>,

    /// Penalty cards queued into the attacker's discard per resistance hit.
    pub penalty_cards_per_resist: u32,

    /// Resonance stacks granted per weakness hit.
    pub resonance_per_weakness: u32,

    /// Bonus damage granted per consumed resonance stack.
    pub resonance_bonus_per_stack: i32,

    /// Consecutive same-class plays needed to trigger a momentum surge.
    pub momentum_threshold: u32,

    /// Resource granted by a momentum surge.
    pub momentum_resource_gain: u32,

    /// How many rounds of artifact-raised events are dispatched per mutation.
    pub max_event_depth: u32,

    /// Seconds of `tick` time between queued enemy actions. Zero drains one
    /// action per tick.
    pub enemy_action_delay: f32,

    /// Seed for deck shuffles and enemy move selection.
    pub seed: u64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            hand_size: 5,
            max_hand_size: 10,
            max_resource: 3,
            max_plays_per_turn: Some(10),
            penalty_cards_per_resist: 1,
            resonance_per_weakness: 1,
            resonance_bonus_per_stack: 2,
            momentum_threshold: 3,
            momentum_resource_gain: 1,
            max_event_depth: 4,
            enemy_action_delay: 0.0,
            seed: 0,
        }
    }
}

impl CombatConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the per-turn hand size.
    #[must_use]
    pub fn with_hand_size(mut self, hand_size: usize) -> Self {
        self.hand_size = hand_size;
        self
    }

    /// Set the per-turn resource.
    #[must_use]
    pub fn with_max_resource(mut self, max_resource: u32) -> Self {
        self.max_resource = max_resource;
        self
    }

    /// Set (or remove) the per-turn play cap.
    #[must_use]
    pub fn with_play_cap(mut self, cap: Option<u32>) -> Self {
        self.max_plays_per_turn = cap;
        self
    }

    /// Set how many penalty cards a resistance hit queues.
    #[must_use]
    pub fn with_penalty_cards(mut self, count: u32) -> Self {
        self.penalty_cards_per_resist = count;
        self
    }

    /// Pace enemy actions by `seconds` of tick time.
    #[must_use]
    pub fn with_enemy_action_delay(mut self, seconds: f32) -> Self {
        self.enemy_action_delay = seconds.max(0.0);
        self
    }

    /// Weakness and resistance yields.
    #[must_use]
    pub fn affinity_rules(&self) -> AffinityRules {
        AffinityRules {
            resonance_per_weakness: self.resonance_per_weakness,
            penalty_cards_per_resist: self.penalty_cards_per_resist,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CombatConfig::default();
        assert_eq!(config.hand_size, 5);
        assert_eq!(config.max_resource, 3);
        assert!(config.max_hand_size >= config.hand_size);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CombatConfig = serde_json::from_str(r#"{"hand_size": 4, "seed": 9}"#).unwrap();
        assert_eq!(config.hand_size, 4);
        assert_eq!(config.seed, 9);
        assert_eq!(config.max_resource, 3);
    }

    #[test]
    fn test_builder() {
        let config = CombatConfig::new()
            .with_seed(3)
            .with_hand_size(6)
            .with_play_cap(None);
        assert_eq!(config.seed, 3);
        assert_eq!(config.hand_size, 6);
        assert_eq!(config.max_plays_per_turn, None);
    }

    #[test]
    fn test_affinity_rules() {
        let rules = CombatConfig::new().with_penalty_cards(2).affinity_rules();
        assert_eq!(rules.penalty_cards_per_resist, 2);
        assert_eq!(rules.resonance_per_weakness, 1);
    }
}
