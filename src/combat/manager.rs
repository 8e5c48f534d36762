//! The combat state machine.
//!
//! `CombatManager` owns one combat: the player, the enemy roster, the phase,
//! and the event pump that feeds artifacts. Callers drive it with three
//! entry points:
//!
//! - `handle_player_input` for player choices (rejected inputs change nothing)
//! - `tick` to advance the enemy turn one step at a time
//! - `raise_dilemma` to open a scripted branch point
//!
//! Every mutation is followed by a flush: events recorded since the last flush
//! are dispatched to the player's artifacts in acquisition order, then deaths
//! are resolved.
//!
//! ## Turn structure
//!
//! Player turn start: Block resets, resource refills, `TurnStart` fires,
//! start-of-turn statuses tick, the hand is drawn, then (turn 1 only)
//! `CombatStart` fires. Player turn end: `TurnEnd` fires, end-of-turn statuses
//! tick, the hand is discarded.
//!
//! Enemy turn: on the first step every living enemy resolves its start-of-turn
//! statuses and the action queue is built in roster order; each further step
//! resolves one queued action. Player death stops the queue immediately. When
//! the queue drains, enemies pick their next intents and the player turn
//! starts.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, warn};

use super::dilemma::{Dilemma, OutcomeContext, ScriptedDilemma};
use super::input::PlayerInput;
use super::phase::{CombatOutcome, CombatPhase};
use super::reward::{EncounterType, RewardGenerator, Rewards};
use super::snapshot::{CardView, CombatSnapshot, EnemyView, PlayerView};
use crate::artifacts::{pump_events, CombatEvent, DispatchEnv};
use crate::cards::{CardInstance, ContentCatalog, PlayContext, Synthesizer};
use crate::combatant::{AffinityRules, Combatant, Enemy, Player};
use crate::core::{CombatConfig, EnemyId, GameRng, InstanceAllocator};
use crate::error::{ActionError, CombatError, ContentError};
use crate::zones::Zone;

/// A play that passed validation.
struct ValidPlay {
    card: CardInstance,
    cost: u8,
}

/// One combat encounter.
pub struct CombatManager {
    player: Player,
    enemies: Vec<Enemy>,
    roster: Vec<EnemyId>,
    encounter: EncounterType,
    catalog: Arc<ContentCatalog>,
    config: CombatConfig,
    rules: AffinityRules,
    synth: Synthesizer,
    instances: InstanceAllocator,
    intent_rng: GameRng,
    rewards: Box<dyn RewardGenerator>,

    phase: CombatPhase,
    turn: u32,
    enemy_queue: VecDeque<usize>,
    action_timer: f32,
    defeated: Vec<bool>,

    scripted: Vec<(ScriptedDilemma, bool)>,
    active_dilemma: Option<Dilemma>,
    queued_dilemmas: VecDeque<Dilemma>,

    pending: Vec<CombatEvent>,
    event_log: Vec<CombatEvent>,
    outcome: Option<CombatOutcome>,
    pending_rewards: Option<Rewards>,
}

impl CombatManager {
    /// Prepare a combat. Nothing happens until `start_combat`.
    pub fn new(
        player: Player,
        catalog: Arc<ContentCatalog>,
        config: CombatConfig,
        rewards: Box<dyn RewardGenerator>,
    ) -> Self {
        let rng = GameRng::new(config.seed);
        let instances = player
            .deck()
            .max_instance_id()
            .map_or_else(InstanceAllocator::new, InstanceAllocator::starting_after);
        Self {
            player,
            enemies: Vec::new(),
            roster: Vec::new(),
            encounter: EncounterType::default(),
            synth: catalog.synthesizer(),
            catalog,
            rules: config.affinity_rules(),
            config,
            instances,
            intent_rng: rng.for_context("intent"),
            rewards,
            phase: CombatPhase::NotStarted,
            turn: 0,
            enemy_queue: VecDeque::new(),
            action_timer: 0.0,
            defeated: Vec::new(),
            scripted: Vec::new(),
            active_dilemma: None,
            queued_dilemmas: VecDeque::new(),
            pending: Vec::new(),
            event_log: Vec::new(),
            outcome: None,
            pending_rewards: None,
        }
    }

    /// Script a dilemma (builder pattern). Each fires at most once.
    #[must_use]
    pub fn with_scripted_dilemma(mut self, scripted: ScriptedDilemma) -> Self {
        self.scripted.push((scripted, false));
        self
    }

    // === Lifecycle ===

    /// Spawn the roster and start the first player turn.
    ///
    /// Unknown enemy ids are skipped with a warning; a roster with no known
    /// enemies is an error.
    pub fn start_combat(&mut self, enemy_ids: &[EnemyId], encounter: EncounterType) -> Result<(), CombatError> {
        if self.phase != CombatPhase::NotStarted {
            return Err(CombatError::AlreadyStarted);
        }

        let mut enemies = Vec::with_capacity(enemy_ids.len());
        for &id in enemy_ids {
            match self.catalog.enemy(id) {
                Some(def) => enemies.push(Enemy::new(Arc::clone(def))),
                None => warn!(error = %ContentError::MissingEnemy(id), "skipping enemy"),
            }
        }
        if enemies.is_empty() {
            return Err(ContentError::EmptyRoster.into());
        }

        self.roster = enemies.iter().map(Enemy::id).collect();
        self.defeated = vec![false; enemies.len()];
        self.enemies = enemies;
        self.encounter = encounter;

        let shuffle = GameRng::new(self.config.seed).for_context("shuffle");
        self.player.deck_mut().set_rng(shuffle);
        self.player.reset_for_combat(&self.config);
        for enemy in &mut self.enemies {
            enemy.choose_intent(&mut self.intent_rng);
        }

        debug!(enemies = self.enemies.len(), ?encounter, "combat started");
        self.start_player_turn();
        Ok(())
    }

    /// Finish with this combat and hand the player back, zones reset and
    /// combat-only state cleared. HP carries over.
    #[must_use]
    pub fn end_combat(mut self) -> Player {
        self.player.reset_for_combat(&self.config);
        self.player
    }

    // === Queries ===

    #[must_use]
    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    /// Current player turn, starting at 1.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    #[must_use]
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    #[must_use]
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn active_dilemma(&self) -> Option<&Dilemma> {
        self.active_dilemma.as_ref()
    }

    /// Every event dispatched so far, in order.
    #[must_use]
    pub fn event_log(&self) -> &[CombatEvent] {
        &self.event_log
    }

    /// Enemy actions still queued this enemy turn.
    #[must_use]
    pub fn queued_enemy_actions(&self) -> usize {
        self.enemy_queue.len()
    }

    #[must_use]
    pub fn is_combat_over(&self) -> bool {
        self.phase == CombatPhase::GameOver
    }

    #[must_use]
    pub fn outcome(&self) -> Option<CombatOutcome> {
        self.outcome
    }

    #[must_use]
    pub fn pending_rewards(&self) -> Option<&Rewards> {
        self.pending_rewards.as_ref()
    }

    pub fn take_pending_rewards(&mut self) -> Option<Rewards> {
        self.pending_rewards.take()
    }

    /// Detached view for the presentation layer.
    #[must_use]
    pub fn snapshot(&self) -> CombatSnapshot {
        CombatSnapshot {
            phase: self.phase,
            turn: self.turn,
            player: PlayerView::of(&self.player),
            hand: self.player.deck().hand_cards().map(CardView::of).collect(),
            enemies: self
                .enemies
                .iter()
                .enumerate()
                .map(|(i, e)| EnemyView::of(i, e))
                .collect(),
            dilemma: self.active_dilemma.clone(),
            outcome: self.outcome,
        }
    }

    // === Input ===

    /// Apply one player input.
    pub fn handle_player_input(&mut self, input: PlayerInput) -> Result<(), ActionError> {
        if self.phase == CombatPhase::GameOver {
            return Err(ActionError::CombatOver);
        }
        match input {
            PlayerInput::SelectCard { hand_index } => {
                self.expect_phase(CombatPhase::PlayerChooseAction)?;
                let play = self.validate(hand_index, None, false)?;
                if play.card.effects().needs_enemy_target() {
                    self.set_phase(CombatPhase::PlayerSelectTarget { hand_index });
                    Ok(())
                } else {
                    self.play(play, None);
                    Ok(())
                }
            }
            PlayerInput::ChooseTarget { enemy } => {
                let hand_index = self.pending_card()?;
                let play = self.validate(hand_index, Some(enemy), true)?;
                self.set_phase(CombatPhase::PlayerChooseAction);
                self.play(play, Some(enemy));
                Ok(())
            }
            PlayerInput::CancelTarget => {
                self.pending_card()?;
                self.set_phase(CombatPhase::PlayerChooseAction);
                Ok(())
            }
            PlayerInput::PlayCard { hand_index, target } => {
                self.expect_phase(CombatPhase::PlayerChooseAction)?;
                let play = self.validate(hand_index, target, true)?;
                self.play(play, target);
                Ok(())
            }
            PlayerInput::EndTurn => {
                self.expect_phase(CombatPhase::PlayerChooseAction)?;
                self.end_player_turn();
                Ok(())
            }
            PlayerInput::ResolveDilemma { choice } => self.resolve_dilemma(choice),
        }
    }

    fn expect_phase(&self, phase: CombatPhase) -> Result<(), ActionError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(ActionError::WrongPhase {
                phase: self.phase.name(),
            })
        }
    }

    fn pending_card(&self) -> Result<usize, ActionError> {
        match self.phase {
            CombatPhase::PlayerSelectTarget { hand_index } => Ok(hand_index),
            CombatPhase::PlayerChooseAction => Err(ActionError::NoPendingCard),
            phase => Err(ActionError::WrongPhase { phase: phase.name() }),
        }
    }

    /// Check every play precondition without touching state.
    fn validate(&self, hand_index: usize, target: Option<usize>, check_target: bool) -> Result<ValidPlay, ActionError> {
        let card = self
            .player
            .deck()
            .hand_card(hand_index)
            .ok_or(ActionError::CardNotInHand { index: hand_index })?;
        let cost = card
            .cost()
            .ok_or(ActionError::Unplayable { instance: card.id() })?;

        let available = self.player.resource();
        if u32::from(cost) > available {
            return Err(ActionError::InsufficientResource {
                needed: u32::from(cost),
                available,
            });
        }
        if let Some(cap) = self.config.max_plays_per_turn {
            if self.player.plays_this_turn() >= cap {
                return Err(ActionError::PlayCapReached { cap });
            }
        }
        if check_target && card.effects().needs_enemy_target() {
            let index = target.ok_or(ActionError::TargetRequired)?;
            if !self.enemies.get(index).is_some_and(Enemy::is_alive) {
                return Err(ActionError::InvalidTarget { index });
            }
        }

        Ok(ValidPlay {
            card: card.clone(),
            cost,
        })
    }

    /// Resolve a validated play. Runs to completion.
    fn play(&mut self, play: ValidPlay, target: Option<usize>) {
        let ValidPlay { card, cost } = play;
        let class = card.definition().class;
        debug!(card = card.name(), instance = %card.id(), cost, ?target, "card played");

        self.player.spend_resource(u32::from(cost));
        self.player.note_play();

        if self
            .player
            .record_momentum(class, self.config.momentum_threshold)
        {
            debug!(?class, "momentum surge");
            self.player.gain_resource(self.config.momentum_resource_gain);
        }

        let mut bonus_damage = 0;
        if let (Some(element), true) = (card.definition().element, card.effects().damage > 0) {
            let stacks = self.player.consume_resonance(element);
            bonus_damage = stacks as i32 * self.config.resonance_bonus_per_stack;
        }

        let report = {
            let mut ctx = PlayContext {
                player: &mut self.player,
                enemies: &mut self.enemies,
                target,
                rules: self.rules,
                bonus_damage,
            };
            card.execute(&mut ctx)
        };

        for &(enemy, outcome) in &report.hits {
            if outcome.hp_delta < 0 {
                self.pending.push(CombatEvent::DamageDealt {
                    enemy,
                    amount: -outcome.hp_delta,
                });
            }
        }
        self.pending.extend(self.player.take_events());
        for &(index, kind) in &report.statuses {
            if index.is_some() {
                self.pending.push(CombatEvent::StatusApplied {
                    kind,
                    on_player: false,
                });
            }
        }
        if report.penalty_cards > 0 {
            self.add_penalty_cards(report.penalty_cards);
        }
        self.pending.push(CombatEvent::CardPlayed {
            instance: card.id(),
            card: card.card_id(),
            cost,
            class,
        });
        self.flush();

        if card.exhausts() {
            self.player.exhaust_card(card.id());
        } else {
            self.player.discard_card(card.id());
        }
        self.flush();
        self.player.deck_mut().check_invariants();

        for enemy in &mut self.enemies {
            enemy.refresh_intent();
        }
        if self.resolve_deaths() {
            return;
        }

        let capped = self
            .config
            .max_plays_per_turn
            .is_some_and(|cap| self.player.plays_this_turn() >= cap);
        if capped && self.phase == CombatPhase::PlayerChooseAction {
            debug!("play cap reached; ending turn");
            self.end_player_turn();
        }
    }

    fn add_penalty_cards(&mut self, count: u32) {
        let definition = Arc::clone(self.catalog.penalty_card());
        for _ in 0..count {
            let card = CardInstance::new(self.instances.alloc(), Arc::clone(&definition), &mut self.synth);
            self.player.deck_mut().add_temporary(card, Zone::DiscardPile);
        }
        debug!(count, "penalty cards added to discard");
        self.pending.push(CombatEvent::PenaltyCardsAdded { count });
    }

    // === Turns ===

    fn start_player_turn(&mut self) {
        self.turn += 1;
        self.player.start_turn();
        self.set_phase(CombatPhase::PlayerChooseAction);
        debug!(turn = self.turn, "player turn started");

        self.emit(CombatEvent::TurnStart { turn: self.turn });
        self.flush();
        if self.resolve_deaths() {
            return;
        }

        self.player.tick_start_statuses();
        self.flush();
        if self.resolve_deaths() {
            return;
        }

        self.player.draw(self.config.hand_size);
        if self.turn == 1 {
            self.emit(CombatEvent::CombatStart);
        }
        self.flush();
        if self.resolve_deaths() {
            return;
        }

        self.open_scripted_dilemmas();
    }

    fn end_player_turn(&mut self) {
        debug!(turn = self.turn, "player turn ended");
        self.emit(CombatEvent::TurnEnd { turn: self.turn });
        self.flush();
        if self.resolve_deaths() {
            return;
        }

        self.player.end_turn();
        self.player.discard_hand();
        self.flush();
        if self.resolve_deaths() {
            return;
        }

        self.action_timer = 0.0;
        self.set_phase(CombatPhase::EnemyTurnStart);
    }

    /// Advance the enemy turn by at most one step once `delta` seconds (summed
    /// across calls) reach the configured action delay. Returns whether a step
    /// ran.
    pub fn tick(&mut self, delta: f32) -> bool {
        if !self.phase.is_enemy_turn() {
            return false;
        }
        self.action_timer += delta.max(0.0);
        if self.action_timer < self.config.enemy_action_delay {
            return false;
        }
        self.action_timer = 0.0;
        self.step_enemy_turn();
        true
    }

    /// Run the whole enemy turn synchronously. Returns the number of steps.
    pub fn drain_enemy_turn(&mut self) -> usize {
        let mut steps = 0;
        while self.phase.is_enemy_turn() {
            self.step_enemy_turn();
            steps += 1;
        }
        steps
    }

    fn step_enemy_turn(&mut self) {
        match self.phase {
            CombatPhase::EnemyTurnStart => self.begin_enemy_actions(),
            CombatPhase::EnemyActing => self.next_enemy_action(),
            _ => {}
        }
    }

    fn begin_enemy_actions(&mut self) {
        for enemy in self.enemies.iter_mut().filter(|e| e.is_alive()) {
            let report = enemy.vitals_mut().begin_turn();
            if report.hp_lost > 0 {
                debug!(enemy = enemy.name(), hp_lost = report.hp_lost, "enemy took status damage");
            }
        }
        if self.resolve_deaths() {
            return;
        }

        self.enemy_queue = (0..self.enemies.len())
            .filter(|&i| self.enemies[i].is_alive())
            .collect();
        self.set_phase(CombatPhase::EnemyActing);
        if self.enemy_queue.is_empty() {
            self.finish_enemy_turn();
        }
    }

    fn next_enemy_action(&mut self) {
        let Some(index) = self.enemy_queue.pop_front() else {
            self.finish_enemy_turn();
            return;
        };

        let enemy = &mut self.enemies[index];
        if enemy.is_alive() {
            if let Some(report) = enemy.act(&mut self.player, self.rules) {
                debug!(
                    enemy = enemy.name(),
                    action = %report.move_name,
                    hp_lost = report.hp_lost(),
                    "enemy acted"
                );
            }
            enemy.vitals_mut().end_turn();
        }
        self.flush();
        if self.resolve_deaths() {
            return;
        }

        if self.enemy_queue.is_empty() {
            self.finish_enemy_turn();
        }
    }

    fn finish_enemy_turn(&mut self) {
        self.enemy_queue.clear();
        for enemy in self.enemies.iter_mut().filter(|e| e.is_alive()) {
            enemy.choose_intent(&mut self.intent_rng);
        }
        self.start_player_turn();
        if self.phase == CombatPhase::PlayerChooseAction {
            self.open_next_dilemma();
        }
    }

    // === Dilemmas ===

    /// Open a dilemma.
    ///
    /// During the player's turn it opens immediately (a pending target choice
    /// is cancelled). During the enemy turn, or while another dilemma is open,
    /// it waits until the player can act again.
    pub fn raise_dilemma(&mut self, dilemma: Dilemma) -> Result<(), ActionError> {
        match self.phase {
            CombatPhase::GameOver => return Err(ActionError::CombatOver),
            CombatPhase::NotStarted => {
                return Err(ActionError::WrongPhase {
                    phase: self.phase.name(),
                })
            }
            _ => {}
        }
        if dilemma.choices.is_empty() {
            warn!(dilemma = %dilemma.id, "ignoring dilemma without choices");
            return Ok(());
        }
        self.queued_dilemmas.push_back(dilemma);
        if self.phase.is_player_turn() {
            self.open_next_dilemma();
        }
        Ok(())
    }

    fn open_scripted_dilemmas(&mut self) {
        let turn = self.turn;
        let mut ready = Vec::new();
        for (scripted, fired) in &mut self.scripted {
            if !*fired && scripted.trigger.is_met(turn, &self.player) {
                *fired = true;
                ready.push(scripted.dilemma.clone());
            }
        }
        for dilemma in ready {
            if let Err(err) = self.raise_dilemma(dilemma) {
                warn!(error = %err, "scripted dilemma not opened");
            }
        }
    }

    fn open_next_dilemma(&mut self) {
        if self.active_dilemma.is_some() {
            return;
        }
        if let Some(dilemma) = self.queued_dilemmas.pop_front() {
            debug!(dilemma = %dilemma.id, "dilemma opened");
            self.active_dilemma = Some(dilemma);
            self.set_phase(CombatPhase::Dilemma);
        }
    }

    fn resolve_dilemma(&mut self, choice: usize) -> Result<(), ActionError> {
        self.expect_phase(CombatPhase::Dilemma)?;
        let Some(dilemma) = self.active_dilemma.as_ref() else {
            return Err(ActionError::WrongPhase {
                phase: self.phase.name(),
            });
        };
        let outcomes = dilemma
            .choices
            .get(choice)
            .ok_or(ActionError::InvalidDilemmaChoice { choice })?
            .outcomes
            .clone();
        let id = dilemma.id;
        self.active_dilemma = None;
        debug!(dilemma = %id, choice, "dilemma resolved");

        for outcome in &outcomes {
            let mut ctx = OutcomeContext {
                player: &mut self.player,
                enemies: &mut self.enemies,
                catalog: self.catalog.as_ref(),
                synth: &mut self.synth,
                instances: &mut self.instances,
                source: id,
            };
            let enemy_events = outcome.apply(&mut ctx);
            self.pending.extend(self.player.take_events());
            self.pending.extend(enemy_events);
        }
        self.emit(CombatEvent::DilemmaResolved { dilemma: id, choice });
        self.flush();
        if self.resolve_deaths() {
            return Ok(());
        }

        self.set_phase(CombatPhase::PlayerChooseAction);
        self.open_next_dilemma();
        Ok(())
    }

    // === Events and deaths ===

    /// Queue an event after anything the player recorded before it.
    fn emit(&mut self, event: CombatEvent) {
        self.pending.extend(self.player.take_events());
        self.pending.push(event);
    }

    /// Dispatch everything queued so far.
    fn flush(&mut self) {
        self.pending.extend(self.player.take_events());
        if self.pending.is_empty() {
            return;
        }
        let initial = std::mem::take(&mut self.pending);
        let env = DispatchEnv {
            catalog: self.catalog.as_ref(),
            turn: self.turn,
            rules: self.rules,
        };
        let report = pump_events(
            initial,
            &mut self.player,
            &mut self.enemies,
            env,
            self.config.max_event_depth,
        );
        self.event_log.extend(report.dispatched);
    }

    /// Report newly defeated enemies and end the combat if one side is down.
    /// Returns `true` once the combat is over.
    fn resolve_deaths(&mut self) -> bool {
        if self.phase == CombatPhase::GameOver {
            return true;
        }
        loop {
            let mut newly_defeated = false;
            for (index, enemy) in self.enemies.iter().enumerate() {
                if !enemy.is_alive() && !self.defeated[index] {
                    self.defeated[index] = true;
                    newly_defeated = true;
                    debug!(enemy = enemy.name(), index, "enemy defeated");
                    self.pending.push(CombatEvent::EnemyDefeated {
                        enemy: index,
                        definition: enemy.id(),
                    });
                }
            }
            if !newly_defeated {
                break;
            }
            self.flush();
        }

        if !self.player.is_alive() {
            self.finish(CombatOutcome::Defeat);
            return true;
        }
        if self.enemies.iter().all(|e| !e.is_alive()) {
            self.finish(CombatOutcome::Victory);
            return true;
        }
        false
    }

    fn finish(&mut self, outcome: CombatOutcome) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(outcome);
        self.enemy_queue.clear();
        self.active_dilemma = None;
        self.queued_dilemmas.clear();
        self.set_phase(CombatPhase::GameOver);

        if outcome == CombatOutcome::Victory {
            self.emit(CombatEvent::Victory);
            self.flush();
            self.pending_rewards = Some(self.rewards.generate(self.encounter, &self.roster));
        } else {
            self.flush();
        }
        debug!(?outcome, turn = self.turn, "combat over");
    }

    fn set_phase(&mut self, phase: CombatPhase) {
        if self.phase != phase {
            debug!(from = %self.phase, to = %phase, "phase change");
            self.phase = phase;
        }
    }
}

impl std::fmt::Debug for CombatManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatManager")
            .field("phase", &self.phase)
            .field("turn", &self.turn)
            .field("player", &self.player)
            .field("enemies", &self.enemies)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}
