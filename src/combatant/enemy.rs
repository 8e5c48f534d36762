//! Enemies: data-driven move lists plus a visible intent.
//!
//! An `EnemyDefinition` is catalog data. An `Enemy` is one live copy of it in a
//! combat: its own `Vitals`, the move it has committed to (`Intent`), and the
//! bookkeeping its `MovePolicy` needs.
//!
//! Move statuses reuse `StatusApplication`, read from the enemy's point of view:
//! `SelfTarget` lands on the enemy, `Enemy`/`AllEnemies` land on the player.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::damage::{compute_damage, AffinityRules, DamageOutcome};
use super::status::StatusSource;
use super::vitals::{Combatant, Vitals};
use crate::cards::{Affinity, Element, StatusApplication, StatusTarget};
use crate::core::{EnemyId, GameRng};

/// One move an enemy can make.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyMove {
    pub name: String,
    /// Damage per hit.
    pub damage: i32,
    pub hits: u32,
    pub block: i32,
    #[serde(default)]
    pub statuses: SmallVec<[StatusApplication; 2]>,
    /// Selection weight for the weighted policies.
    pub weight: u32,
}

impl EnemyMove {
    /// A move that does nothing, weight 1.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            damage: 0,
            hits: 1,
            block: 0,
            statuses: SmallVec::new(),
            weight: 1,
        }
    }

    /// Deal `damage` per hit (builder pattern).
    #[must_use]
    pub fn attack(mut self, damage: i32) -> Self {
        self.damage = damage;
        self
    }

    /// Hit `hits` times (builder pattern).
    #[must_use]
    pub fn hits(mut self, hits: u32) -> Self {
        self.hits = hits.max(1);
        self
    }

    #[must_use]
    pub fn with_block(mut self, block: i32) -> Self {
        self.block = block;
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusApplication) -> Self {
        self.statuses.push(status);
        self
    }

    #[must_use]
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    /// Broad category shown to the player.
    #[must_use]
    pub fn kind(&self) -> IntentKind {
        let hostile_status = self
            .statuses
            .iter()
            .any(|s| s.target != StatusTarget::SelfTarget);
        match (self.damage > 0, self.block > 0) {
            (true, true) => IntentKind::AttackDefend,
            (true, false) => IntentKind::Attack,
            (false, true) => IntentKind::Defend,
            (false, false) if hostile_status => IntentKind::Debuff,
            (false, false) if !self.statuses.is_empty() => IntentKind::Buff,
            _ => IntentKind::Unknown,
        }
    }
}

/// How an enemy picks its next move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovePolicy {
    /// Moves in listed order, wrapping around.
    #[default]
    Cycle,
    /// Random by weight.
    Weighted,
    /// Random by weight, never the same move twice in a row (unless it is the
    /// only one available).
    WeightedNoRepeat,
}

/// Catalog data for an enemy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyDefinition {
    pub id: EnemyId,
    pub name: String,
    pub max_hp: i32,
    #[serde(default)]
    pub weaknesses: Vec<Element>,
    #[serde(default)]
    pub resistances: Vec<Element>,
    pub moves: Vec<EnemyMove>,
    #[serde(default)]
    pub policy: MovePolicy,
}

impl EnemyDefinition {
    #[must_use]
    pub fn new(id: EnemyId, name: impl Into<String>, max_hp: i32) -> Self {
        Self {
            id,
            name: name.into(),
            max_hp,
            weaknesses: Vec::new(),
            resistances: Vec::new(),
            moves: Vec::new(),
            policy: MovePolicy::Cycle,
        }
    }

    #[must_use]
    pub fn with_weakness(mut self, element: Element) -> Self {
        self.weaknesses.push(element);
        self
    }

    #[must_use]
    pub fn with_resistance(mut self, element: Element) -> Self {
        self.resistances.push(element);
        self
    }

    #[must_use]
    pub fn with_move(mut self, mv: EnemyMove) -> Self {
        self.moves.push(mv);
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: MovePolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Broad category of an intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentKind {
    Attack,
    Defend,
    AttackDefend,
    Buff,
    Debuff,
    Unknown,
}

/// An enemy's committed next move, visible before it resolves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// Index into the definition's move list.
    pub move_index: usize,
    pub name: String,
    pub kind: IntentKind,
    /// Per-hit damage after the enemy's current Strength and Weak.
    pub damage_preview: i32,
    pub hits: u32,
    pub block: i32,
}

/// What one enemy action did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnemyActionReport {
    pub move_name: String,
    pub hits: Vec<DamageOutcome>,
    pub block_gained: i32,
    pub statuses_applied: usize,
}

impl EnemyActionReport {
    /// HP the target lost across all hits.
    #[must_use]
    pub fn hp_lost(&self) -> i32 {
        self.hits.iter().map(|h| -h.hp_delta).sum()
    }
}

/// A live enemy.
#[derive(Clone, Debug)]
pub struct Enemy {
    definition: Arc<EnemyDefinition>,
    vitals: Vitals,
    intent: Option<Intent>,
    last_move: Option<usize>,
    next_cycle: usize,
}

impl Enemy {
    /// Spawn at full health with no intent.
    #[must_use]
    pub fn new(definition: Arc<EnemyDefinition>) -> Self {
        let vitals = Vitals::new(definition.max_hp);
        Self {
            definition,
            vitals,
            intent: None,
            last_move: None,
            next_cycle: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> EnemyId {
        self.definition.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    #[must_use]
    pub fn definition(&self) -> &EnemyDefinition {
        &self.definition
    }

    #[must_use]
    pub fn intent(&self) -> Option<&Intent> {
        self.intent.as_ref()
    }

    /// Commit to a next move according to the policy.
    ///
    /// Enemies without moves, or whose weights are all zero, have no intent.
    pub fn choose_intent(&mut self, rng: &mut GameRng) -> Option<&Intent> {
        let moves = &self.definition.moves;
        let index = match self.definition.policy {
            MovePolicy::Cycle if moves.is_empty() => None,
            MovePolicy::Cycle => {
                let i = self.next_cycle % moves.len();
                self.next_cycle = i + 1;
                Some(i)
            }
            MovePolicy::Weighted => {
                let weights: Vec<u32> = moves.iter().map(|m| m.weight).collect();
                rng.choose_weighted(&weights)
            }
            MovePolicy::WeightedNoRepeat => {
                let mut weights: Vec<u32> = moves.iter().map(|m| m.weight).collect();
                let available = weights.iter().filter(|&&w| w > 0).count();
                if let (Some(last), true) = (self.last_move, available > 1) {
                    weights[last] = 0;
                }
                rng.choose_weighted(&weights)
            }
        };

        self.intent = index.map(|i| self.build_intent(i));
        self.intent.as_ref()
    }

    /// Recompute the damage preview after modifiers changed.
    pub fn refresh_intent(&mut self) {
        if let Some(index) = self.intent.as_ref().map(|i| i.move_index) {
            self.intent = Some(self.build_intent(index));
        }
    }

    fn build_intent(&self, index: usize) -> Intent {
        let mv = &self.definition.moves[index];
        let damage_preview = if mv.damage > 0 {
            compute_damage(self.vitals.outgoing(mv.damage), AffinityRules::default()).raw
        } else {
            0
        };
        Intent {
            move_index: index,
            name: mv.name.clone(),
            kind: mv.kind(),
            damage_preview,
            hits: mv.hits,
            block: mv.block,
        }
    }

    /// Resolve the committed move against `target` and clear the intent.
    pub fn act(&mut self, target: &mut impl Combatant, rules: AffinityRules) -> Option<EnemyActionReport> {
        let intent = self.intent.take()?;
        let definition = Arc::clone(&self.definition);
        let mv = definition.moves.get(intent.move_index)?;
        self.last_move = Some(intent.move_index);

        let source = StatusSource::Enemy(self.id());
        let mut report = EnemyActionReport {
            move_name: mv.name.clone(),
            ..EnemyActionReport::default()
        };

        if mv.damage > 0 {
            for _ in 0..mv.hits {
                if !target.is_alive() {
                    break;
                }
                let hit = self.vitals.outgoing(mv.damage);
                report.hits.push(target.take_hit(hit, None, rules));
            }
        }
        if mv.block > 0 {
            report.block_gained = self.gain_block(mv.block);
        }
        for status in &mv.statuses {
            if status.target == StatusTarget::SelfTarget {
                self.apply_status(status.kind, status.duration, status.amount, source);
            } else {
                target.apply_status(status.kind, status.duration, status.amount, source);
            }
            report.statuses_applied += 1;
        }

        Some(report)
    }
}

impl Combatant for Enemy {
    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    fn affinity(&self, element: Option<Element>) -> Affinity {
        let Some(element) = element else {
            return Affinity::Neutral;
        };
        if self.definition.weaknesses.contains(&element) {
            Affinity::Weak
        } else if self.definition.resistances.contains(&element) {
            Affinity::Resistant
        } else {
            Affinity::Neutral
        }
    }
}
