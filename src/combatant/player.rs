//! The player combatant.
//!
//! On top of the shared `Vitals`, a player owns a resource pool, a deck, held
//! artifacts (in acquisition order), a read-only attunement profile, resonance
//! stacks and a momentum streak.
//!
//! Mutations that artifacts can react to (draws, hand removals, block, healing,
//! HP loss, statuses, resonance) are recorded as pending `CombatEvent`s. The
//! combat manager drains them with `take_events` and dispatches them; the player
//! itself never calls an artifact.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::damage::{AffinityRules, DamageInput, DamageOutcome};
use super::status::{StatusDuration, StatusKind, StatusSource};
use super::vitals::{Combatant, TurnStartReport, Vitals};
use crate::artifacts::{Artifact, CombatEvent};
use crate::cards::{ActionClass, CardDefinition, Element, ScoreVector};
use crate::core::{CombatConfig, InstanceId};
use crate::zones::{DeckManager, HandRemoval, Zone};

/// Consecutive plays of one action class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Momentum {
    pub class: Option<ActionClass>,
    pub streak: u32,
}

/// The player.
#[derive(Clone, Debug)]
pub struct Player {
    vitals: Vitals,
    resource: u32,
    max_resource: u32,
    artifacts: im::Vector<Arc<Artifact>>,
    deck: DeckManager,
    attunement: ScoreVector,
    resonance: BTreeMap<Element, u32>,
    momentum: Momentum,
    plays_this_turn: u32,
    pending_events: Vec<CombatEvent>,
}

impl Player {
    /// Full-health player with an empty resource pool.
    #[must_use]
    pub fn new(max_hp: i32, deck: DeckManager) -> Self {
        Self {
            vitals: Vitals::new(max_hp),
            resource: 0,
            max_resource: CombatConfig::default().max_resource,
            artifacts: im::Vector::new(),
            deck,
            attunement: ScoreVector::default(),
            resonance: BTreeMap::new(),
            momentum: Momentum::default(),
            plays_this_turn: 0,
            pending_events: Vec::new(),
        }
    }

    /// Start below full health (builder pattern).
    #[must_use]
    pub fn with_hp(mut self, hp: i32) -> Self {
        self.vitals = Vitals::with_hp(self.vitals.max_hp(), hp);
        self
    }

    #[must_use]
    pub fn with_attunement(mut self, attunement: ScoreVector) -> Self {
        self.attunement = attunement;
        self
    }

    /// Acquire an artifact (builder pattern).
    #[must_use]
    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.acquire_artifact(artifact);
        self
    }

    // === Artifacts ===

    /// Acquire an artifact. It fires after every artifact acquired before it.
    pub fn acquire_artifact(&mut self, artifact: Artifact) {
        self.artifacts.push_back(Arc::new(artifact));
    }

    /// Held artifacts in acquisition order.
    #[must_use]
    pub fn artifacts(&self) -> &im::Vector<Arc<Artifact>> {
        &self.artifacts
    }

    // === Deck ===

    #[must_use]
    pub fn deck(&self) -> &DeckManager {
        &self.deck
    }

    pub fn deck_mut(&mut self) -> &mut DeckManager {
        &mut self.deck
    }

    /// Draw up to `n` cards. Returns how many were drawn.
    pub fn draw(&mut self, n: usize) -> usize {
        let report = self.deck.draw(n);
        if report.reshuffled {
            self.pending_events.push(CombatEvent::DeckShuffled);
        }
        for &instance in &report.drawn {
            if let Some(card) = self.deck.card(instance) {
                self.pending_events.push(CombatEvent::CardDrawn {
                    instance,
                    card: card.card_id(),
                });
            }
        }
        report.drawn.len()
    }

    /// Move a card from hand to the discard pile.
    pub fn discard_card(&mut self, instance: InstanceId) -> Option<HandRemoval> {
        let removal = self.deck.discard_from_hand(instance)?;
        self.record_removal(removal);
        Some(removal)
    }

    /// Move a card from hand to the exhaust pile.
    pub fn exhaust_card(&mut self, instance: InstanceId) -> Option<HandRemoval> {
        let removal = self.deck.exhaust_from_hand(instance)?;
        self.record_removal(removal);
        Some(removal)
    }

    /// Discard the whole hand.
    pub fn discard_hand(&mut self) -> Vec<HandRemoval> {
        let removals = self.deck.discard_hand();
        for removal in &removals {
            self.record_removal(*removal);
        }
        removals
    }

    fn record_removal(&mut self, removal: HandRemoval) {
        let HandRemoval { instance, card, to } = removal;
        let event = match to {
            Zone::ExhaustPile => CombatEvent::CardExhausted { instance, card },
            _ => CombatEvent::CardDiscarded { instance, card },
        };
        self.pending_events.push(event);
    }

    // === Resource ===

    #[must_use]
    pub fn resource(&self) -> u32 {
        self.resource
    }

    #[must_use]
    pub fn max_resource(&self) -> u32 {
        self.max_resource
    }

    /// Spend resource. Returns `false` (and spends nothing) if short.
    pub fn spend_resource(&mut self, amount: u32) -> bool {
        if amount > self.resource {
            return false;
        }
        self.resource -= amount;
        true
    }

    /// Gain resource. May exceed the per-turn maximum until the next refill.
    pub fn gain_resource(&mut self, amount: u32) {
        self.resource = self.resource.saturating_add(amount);
    }

    // === Attunement, resonance, momentum ===

    #[must_use]
    pub fn attunement(&self) -> &ScoreVector {
        &self.attunement
    }

    /// +1 when the card's dominant trait matches the player's dominant
    /// attunement trait. Blank profiles or blank cards never match.
    #[must_use]
    pub fn attunement_bonus(&self, card: &CardDefinition) -> i32 {
        if self.attunement.average() <= 0.0 || card.scores.average() <= 0.0 {
            return 0;
        }
        i32::from(card.scores.dominant() == self.attunement.dominant())
    }

    /// Resonance stacks held for an element.
    #[must_use]
    pub fn resonance(&self, element: Element) -> u32 {
        self.resonance.get(&element).copied().unwrap_or(0)
    }

    /// All non-zero resonance stacks, ordered by element.
    #[must_use]
    pub fn resonance_stacks(&self) -> &BTreeMap<Element, u32> {
        &self.resonance
    }

    pub fn add_resonance(&mut self, element: Element, stacks: u32) {
        if stacks == 0 {
            return;
        }
        *self.resonance.entry(element).or_insert(0) += stacks;
        self.pending_events
            .push(CombatEvent::ResonanceGained { element, stacks });
    }

    /// Remove and return every stack of an element.
    pub fn consume_resonance(&mut self, element: Element) -> u32 {
        self.resonance.remove(&element).unwrap_or(0)
    }

    #[must_use]
    pub fn momentum(&self) -> Momentum {
        self.momentum
    }

    /// Extend (or restart) the streak with a play of `class`. Returns `true` when
    /// the streak reaches `threshold`; the streak then resets.
    pub fn record_momentum(&mut self, class: ActionClass, threshold: u32) -> bool {
        if self.momentum.class == Some(class) {
            self.momentum.streak += 1;
        } else {
            self.momentum = Momentum {
                class: Some(class),
                streak: 1,
            };
        }
        if threshold > 0 && self.momentum.streak >= threshold {
            self.momentum = Momentum::default();
            return true;
        }
        false
    }

    #[must_use]
    pub fn plays_this_turn(&self) -> u32 {
        self.plays_this_turn
    }

    pub fn note_play(&mut self) {
        self.plays_this_turn += 1;
    }

    // === Turn structure ===

    /// Reset Block, refill resource and clear per-turn counters.
    pub fn start_turn(&mut self) {
        self.vitals.clear_block();
        self.resource = self.max_resource;
        self.plays_this_turn = 0;
        self.momentum = Momentum::default();
    }

    /// Resolve start-of-turn statuses.
    pub fn tick_start_statuses(&mut self) -> TurnStartReport {
        let report = self.vitals.tick_start_statuses();
        if report.hp_lost > 0 {
            self.pending_events
                .push(CombatEvent::DamageTaken { amount: report.hp_lost });
        }
        if report.healed > 0 {
            self.pending_events
                .push(CombatEvent::Healed { amount: report.healed });
        }
        report
    }

    /// Resolve end-of-turn statuses.
    pub fn end_turn(&mut self) {
        self.vitals.end_turn();
    }

    /// Gain Block with no Dexterity or Frail applied.
    pub fn add_raw_block(&mut self, amount: i32) {
        if amount <= 0 {
            return;
        }
        self.vitals.add_raw_block(amount);
        self.pending_events.push(CombatEvent::BlockGained { amount });
    }

    /// Prepare for a new combat: zones reset, combat-only state cleared. HP
    /// carries over.
    pub fn reset_for_combat(&mut self, config: &CombatConfig) {
        self.vitals.clear_block();
        self.vitals.clear_statuses();
        self.max_resource = config.max_resource;
        self.resource = 0;
        self.resonance.clear();
        self.momentum = Momentum::default();
        self.plays_this_turn = 0;
        self.pending_events.clear();
        self.deck.set_max_hand_size(config.max_hand_size);
        self.deck.reset_for_combat();
    }

    // === Events ===

    /// Record an event for the next dispatch round.
    pub fn push_event(&mut self, event: CombatEvent) {
        self.pending_events.push(event);
    }

    /// Drain recorded events in the order they happened.
    pub fn take_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.pending_events)
    }

    #[must_use]
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }
}

impl Combatant for Player {
    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    fn heal(&mut self, amount: i32) -> i32 {
        let healed = self.vitals.heal(amount);
        if healed > 0 {
            self.pending_events.push(CombatEvent::Healed { amount: healed });
        }
        healed
    }

    fn lose_hp(&mut self, amount: i32) -> i32 {
        let lost = self.vitals.lose_hp(amount);
        if lost > 0 {
            self.pending_events.push(CombatEvent::DamageTaken { amount: lost });
        }
        lost
    }

    fn gain_block(&mut self, base: i32) -> i32 {
        let gained = self.vitals.gain_block(base);
        if gained > 0 {
            self.pending_events.push(CombatEvent::BlockGained { amount: gained });
        }
        gained
    }

    fn apply_status(
        &mut self,
        kind: StatusKind,
        duration: StatusDuration,
        amount: i32,
        source: StatusSource,
    ) {
        let before = self.vitals.statuses().get(kind).copied();
        self.vitals.apply_status(kind, duration, amount, source);
        if self.vitals.statuses().get(kind).copied() != before {
            self.pending_events.push(CombatEvent::StatusApplied {
                kind,
                on_player: true,
            });
        }
    }

    fn take_hit(&mut self, hit: DamageInput, element: Option<Element>, rules: AffinityRules) -> DamageOutcome {
        let affinity = self.affinity(element);
        let outcome = self.vitals.receive(hit, affinity, rules);
        if outcome.hp_delta < 0 {
            self.pending_events.push(CombatEvent::DamageTaken {
                amount: -outcome.hp_delta,
            });
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardInstance, CardTag, Synthesizer, TraitDimension};
    use crate::core::{CardId, GameRng};

    fn player_with_deck(n: u32) -> Player {
        let mut synth = Synthesizer::new();
        let def = Arc::new(
            CardDefinition::new(CardId::new(1), "Strike", ActionClass::Offense).with_tag(CardTag::Attack),
        );
        let mut deck = DeckManager::new(GameRng::new(5));
        for i in 0..n {
            deck.add_to_master_deck(CardInstance::new(InstanceId::new(i), Arc::clone(&def), &mut synth));
        }
        let mut player = Player::new(50, deck);
        player.reset_for_combat(&CombatConfig::default());
        player
    }

    #[test]
    fn test_resource() {
        let mut player = player_with_deck(0);
        player.start_turn();
        assert_eq!(player.resource(), 3);

        assert!(!player.spend_resource(4));
        assert_eq!(player.resource(), 3);
        assert!(player.spend_resource(2));
        player.gain_resource(5);
        assert_eq!(player.resource(), 6);

        player.start_turn();
        assert_eq!(player.resource(), 3);
    }

    #[test]
    fn test_draw_and_removals_record_events() {
        let mut player = player_with_deck(4);
        assert_eq!(player.draw(2), 2);

        let events = player.take_events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| matches!(e, CombatEvent::CardDrawn { .. })));

        let first = player.deck().hand()[0];
        player.exhaust_card(first);
        player.discard_hand();
        let events = player.take_events();
        assert!(matches!(events[0], CombatEvent::CardExhausted { .. }));
        assert!(matches!(events[1], CombatEvent::CardDiscarded { .. }));
        assert!(!player.has_pending_events());
    }

    #[test]
    fn test_reshuffle_records_event() {
        let mut player = player_with_deck(2);
        player.draw(2);
        player.discard_hand();
        player.take_events();

        player.draw(1);
        assert_eq!(player.take_events()[0], CombatEvent::DeckShuffled);
    }

    #[test]
    fn test_scenario_a_unmodified_hit() {
        let mut player = player_with_deck(0);
        let out = player.take_hit(DamageInput::new(10), None, AffinityRules::default());

        assert_eq!(out.hp_delta, -10);
        assert_eq!(player.block(), 0);
        assert_eq!(player.hp(), 40);
        assert_eq!(player.take_events(), vec![CombatEvent::DamageTaken { amount: 10 }]);
    }

    #[test]
    fn test_momentum() {
        let mut player = player_with_deck(0);
        assert!(!player.record_momentum(ActionClass::Offense, 3));
        assert!(!player.record_momentum(ActionClass::Offense, 3));
        assert!(player.record_momentum(ActionClass::Offense, 3));
        assert_eq!(player.momentum().streak, 0);

        player.record_momentum(ActionClass::Offense, 3);
        player.record_momentum(ActionClass::Defense, 3);
        assert_eq!(player.momentum().streak, 1);
        assert_eq!(player.momentum().class, Some(ActionClass::Defense));
    }

    #[test]
    fn test_resonance() {
        let mut player = player_with_deck(0);
        player.add_resonance(Element::Tide, 2);
        player.add_resonance(Element::Tide, 1);
        player.add_resonance(Element::Ember, 0);

        assert_eq!(player.resonance(Element::Tide), 3);
        assert_eq!(player.resonance_stacks().len(), 1);
        assert_eq!(player.consume_resonance(Element::Tide), 3);
        assert_eq!(player.resonance(Element::Tide), 0);
        assert_eq!(player.take_events().len(), 2);
    }

    #[test]
    fn test_attunement_bonus() {
        let player = player_with_deck(0)
            .with_attunement(ScoreVector::new().with(TraitDimension::Structure, 8.0));

        let wall = CardDefinition::new(CardId::new(2), "Wall", ActionClass::Defense)
            .with_scores(ScoreVector::new().with(TraitDimension::Structure, 5.0));
        let blade = CardDefinition::new(CardId::new(3), "Blade", ActionClass::Offense)
            .with_scores(ScoreVector::new().with(TraitDimension::Intensity, 5.0));
        let blank = CardDefinition::new(CardId::new(4), "Blank", ActionClass::Utility);

        assert_eq!(player.attunement_bonus(&wall), 1);
        assert_eq!(player.attunement_bonus(&blade), 0);
        assert_eq!(player.attunement_bonus(&blank), 0);
    }

    #[test]
    fn test_reset_for_combat_keeps_hp() {
        let mut player = player_with_deck(3).with_hp(20);
        player.add_raw_block(5);
        player.apply_status(StatusKind::Weak, StatusDuration::Turns(2), 1, StatusSource::Card(CardId::new(1)));
        player.add_resonance(Element::Gale, 1);

        player.reset_for_combat(&CombatConfig::default());
        assert_eq!(player.hp(), 20);
        assert_eq!(player.block(), 0);
        assert!(player.statuses().is_empty());
        assert_eq!(player.resonance(Element::Gale), 0);
        assert_eq!(player.deck().draw_pile().len(), 3);
        assert!(!player.has_pending_events());
    }
}
