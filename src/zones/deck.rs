//! Deck manager for one combatant's card zones.
//!
//! The `DeckManager` owns every `CardInstance` in a master deck and tracks which
//! combat zone each one occupies. It supports:
//! - Resetting zones for a new combat without creating new instances
//! - Drawing with an automatic discard reshuffle
//! - Hand removals (discard, exhaust, end-of-turn discard)
//! - Combat-temporary cards (penalty cards, dilemma grants) purged on reset
//!
//! Zones are ordered; for the draw pile the last element is the top.
//!
//! Hand removals return a `HandRemoval` fact. The manager never dispatches
//! anything itself; its owner turns those facts into events.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::cards::CardInstance;
use crate::core::{CardId, GameRng, InstanceId};

/// Default hard cap on hand size.
pub const DEFAULT_MAX_HAND_SIZE: usize = 10;

/// A combat zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    DrawPile,
    Hand,
    DiscardPile,
    ExhaustPile,
}

impl Zone {
    /// Every zone, in invariant-check order.
    pub const ALL: [Zone; 4] = [Zone::DrawPile, Zone::Hand, Zone::DiscardPile, Zone::ExhaustPile];
}

/// A card leaving the hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandRemoval {
    pub instance: InstanceId,
    pub card: CardId,
    pub to: Zone,
}

/// Result of a draw.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DrawReport {
    /// Instances drawn, in draw order.
    pub drawn: Vec<InstanceId>,
    /// Whether the discard pile was shuffled into the draw pile.
    pub reshuffled: bool,
}

/// Manages a master deck and its combat zones.
///
/// ## Usage
///
/// ```
/// use std::sync::Arc;
/// use concept_combat::cards::{ActionClass, CardDefinition, CardInstance, CardTag, Synthesizer};
/// use concept_combat::core::{CardId, GameRng, InstanceId};
/// use concept_combat::zones::DeckManager;
///
/// let mut synth = Synthesizer::new();
/// let strike = Arc::new(
///     CardDefinition::new(CardId::new(1), "Strike", ActionClass::Offense).with_tag(CardTag::Attack),
/// );
///
/// let mut deck = DeckManager::new(GameRng::new(7));
/// for i in 0..8 {
///     deck.add_to_master_deck(CardInstance::new(InstanceId::new(i), Arc::clone(&strike), &mut synth));
/// }
///
/// deck.reset_for_combat();
/// let report = deck.draw(5);
///
/// assert_eq!(report.drawn.len(), 5);
/// assert_eq!(deck.hand().len(), 5);
/// assert_eq!(deck.draw_pile().len(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct DeckManager {
    /// Every known instance: master deck plus combat temporaries.
    cards: FxHashMap<InstanceId, CardInstance>,

    /// Master deck in acquisition order.
    master: Vec<InstanceId>,

    /// Combat-only instances, dropped on reset.
    temporaries: Vec<InstanceId>,

    /// Card locations: instance -> zone
    locations: FxHashMap<InstanceId, Zone>,

    draw_pile: im::Vector<InstanceId>,
    hand: im::Vector<InstanceId>,
    discard_pile: im::Vector<InstanceId>,
    exhaust_pile: im::Vector<InstanceId>,

    max_hand_size: usize,
    rng: GameRng,
}

impl DeckManager {
    /// Create an empty manager shuffling from `rng`.
    #[must_use]
    pub fn new(rng: GameRng) -> Self {
        Self {
            cards: FxHashMap::default(),
            master: Vec::new(),
            temporaries: Vec::new(),
            locations: FxHashMap::default(),
            draw_pile: im::Vector::new(),
            hand: im::Vector::new(),
            discard_pile: im::Vector::new(),
            exhaust_pile: im::Vector::new(),
            max_hand_size: DEFAULT_MAX_HAND_SIZE,
            rng,
        }
    }

    /// Set the hand size cap (builder pattern).
    #[must_use]
    pub fn with_max_hand_size(mut self, max: usize) -> Self {
        self.max_hand_size = max;
        self
    }

    pub fn set_max_hand_size(&mut self, max: usize) {
        self.max_hand_size = max;
    }

    #[must_use]
    pub fn max_hand_size(&self) -> usize {
        self.max_hand_size
    }

    /// Replace the shuffle stream.
    pub fn set_rng(&mut self, rng: GameRng) {
        self.rng = rng;
    }

    // === Master deck ===

    /// Add a card permanently. It joins the zones at the next reset.
    ///
    /// Returns `false` if the instance id is already known.
    pub fn add_to_master_deck(&mut self, card: CardInstance) -> bool {
        let id = card.id();
        if self.cards.contains_key(&id) {
            warn!(instance = %id, "instance already in deck; ignoring");
            return false;
        }
        self.cards.insert(id, card);
        self.master.push(id);
        true
    }

    /// Remove a card permanently, wherever it currently is.
    pub fn remove_from_master_deck(&mut self, id: InstanceId) -> Option<CardInstance> {
        let pos = self.master.iter().position(|&m| m == id)?;
        self.master.remove(pos);
        self.detach(id);
        self.cards.remove(&id)
    }

    /// Master deck cards in acquisition order.
    pub fn master_deck(&self) -> impl Iterator<Item = &CardInstance> + '_ {
        self.master.iter().filter_map(move |id| self.cards.get(id))
    }

    #[must_use]
    pub fn master_len(&self) -> usize {
        self.master.len()
    }

    /// Largest instance id known to this deck.
    #[must_use]
    pub fn max_instance_id(&self) -> Option<InstanceId> {
        self.cards.keys().copied().max()
    }

    // === Combat lifecycle ===

    /// Put the whole master deck into a freshly shuffled draw pile.
    ///
    /// Combat temporaries are discarded and temporary costs cleared; upgrades
    /// persist.
    pub fn reset_for_combat(&mut self) {
        for id in self.temporaries.drain(..) {
            self.cards.remove(&id);
        }
        self.locations.clear();
        self.hand.clear();
        self.discard_pile.clear();
        self.exhaust_pile.clear();

        let mut order = self.master.clone();
        self.rng.shuffle(&mut order);
        for &id in &order {
            self.locations.insert(id, Zone::DrawPile);
            if let Some(card) = self.cards.get_mut(&id) {
                card.set_temporary_cost(None);
            }
        }
        self.draw_pile = order.into_iter().collect();
        debug!(cards = self.draw_pile.len(), "deck reset for combat");
    }

    /// Add a combat-only card to `zone`.
    ///
    /// A card bound for a full hand goes to the discard pile instead. Returns the
    /// zone the card landed in, or `None` if the id is already known.
    pub fn add_temporary(&mut self, card: CardInstance, zone: Zone) -> Option<Zone> {
        let id = card.id();
        if self.cards.contains_key(&id) {
            warn!(instance = %id, "temporary instance already in deck; ignoring");
            return None;
        }
        let zone = if zone == Zone::Hand && self.hand.len() >= self.max_hand_size {
            Zone::DiscardPile
        } else {
            zone
        };
        self.cards.insert(id, card);
        self.temporaries.push(id);
        self.place(id, zone);
        Some(zone)
    }

    /// Draw up to `n` cards.
    ///
    /// An empty draw pile is refilled by shuffling the discard pile; if both are
    /// empty, or the hand is full, the draw stops short.
    pub fn draw(&mut self, n: usize) -> DrawReport {
        let mut report = DrawReport::default();
        for _ in 0..n {
            if self.hand.len() >= self.max_hand_size {
                break;
            }
            if self.draw_pile.is_empty() {
                if self.discard_pile.is_empty() {
                    break;
                }
                self.reshuffle_discard();
                report.reshuffled = true;
            }
            let Some(id) = self.draw_pile.pop_back() else {
                break;
            };
            self.hand.push_back(id);
            self.locations.insert(id, Zone::Hand);
            report.drawn.push(id);
        }
        report
    }

    fn reshuffle_discard(&mut self) {
        let mut pile: Vec<InstanceId> = self.discard_pile.iter().copied().collect();
        self.discard_pile.clear();
        self.rng.shuffle(&mut pile);
        for &id in &pile {
            self.locations.insert(id, Zone::DrawPile);
        }
        debug!(cards = pile.len(), "discard pile shuffled into draw pile");
        self.draw_pile.extend(pile);
    }

    /// Move a card from hand to the discard pile.
    pub fn discard_from_hand(&mut self, id: InstanceId) -> Option<HandRemoval> {
        self.remove_from_hand(id, Zone::DiscardPile)
    }

    /// Move a card from hand to the exhaust pile.
    pub fn exhaust_from_hand(&mut self, id: InstanceId) -> Option<HandRemoval> {
        self.remove_from_hand(id, Zone::ExhaustPile)
    }

    /// Discard the whole hand, in hand order.
    pub fn discard_hand(&mut self) -> Vec<HandRemoval> {
        let ids: Vec<InstanceId> = self.hand.iter().copied().collect();
        ids.into_iter()
            .filter_map(|id| self.discard_from_hand(id))
            .collect()
    }

    fn remove_from_hand(&mut self, id: InstanceId, to: Zone) -> Option<HandRemoval> {
        let pos = self.hand.index_of(&id)?;
        self.hand.remove(pos);
        self.place(id, to);
        let card = self.cards.get(&id).map_or(CardId::new(0), CardInstance::card_id);
        Some(HandRemoval { instance: id, card, to })
    }

    // === Queries ===

    #[must_use]
    pub fn draw_pile(&self) -> &im::Vector<InstanceId> {
        &self.draw_pile
    }

    #[must_use]
    pub fn hand(&self) -> &im::Vector<InstanceId> {
        &self.hand
    }

    #[must_use]
    pub fn discard_pile(&self) -> &im::Vector<InstanceId> {
        &self.discard_pile
    }

    #[must_use]
    pub fn exhaust_pile(&self) -> &im::Vector<InstanceId> {
        &self.exhaust_pile
    }

    #[must_use]
    pub fn zone(&self, zone: Zone) -> &im::Vector<InstanceId> {
        match zone {
            Zone::DrawPile => &self.draw_pile,
            Zone::Hand => &self.hand,
            Zone::DiscardPile => &self.discard_pile,
            Zone::ExhaustPile => &self.exhaust_pile,
        }
    }

    /// Zone an instance occupies, if any.
    #[must_use]
    pub fn zone_of(&self, id: InstanceId) -> Option<Zone> {
        self.locations.get(&id).copied()
    }

    #[must_use]
    pub fn card(&self, id: InstanceId) -> Option<&CardInstance> {
        self.cards.get(&id)
    }

    pub fn card_mut(&mut self, id: InstanceId) -> Option<&mut CardInstance> {
        self.cards.get_mut(&id)
    }

    /// Card at a hand position.
    #[must_use]
    pub fn hand_card(&self, index: usize) -> Option<&CardInstance> {
        self.hand.get(index).and_then(|id| self.cards.get(id))
    }

    /// Hand cards in order.
    pub fn hand_cards(&self) -> impl Iterator<Item = &CardInstance> + '_ {
        self.hand.iter().filter_map(move |id| self.cards.get(id))
    }

    /// Total cards across all four zones.
    #[must_use]
    pub fn in_combat_count(&self) -> usize {
        Zone::ALL.iter().map(|&z| self.zone(z).len()).sum()
    }

    // === Invariants ===

    /// Verify that no instance sits in two zones, every zoned instance is known,
    /// and the hand is within its cap.
    ///
    /// Panics in debug builds on violation; in release builds the offending
    /// entries are dropped and logged.
    pub fn check_invariants(&mut self) {
        let repaired = self.repair_zones();
        debug_assert!(repaired == 0, "deck zone invariant violated ({repaired} entries)");
    }

    /// Drop duplicate or unknown zone entries, keeping the first occurrence.
    /// Returns the number of entries dropped.
    pub fn repair_zones(&mut self) -> usize {
        let mut seen = FxHashSet::default();
        let mut dropped = 0;

        for zone in Zone::ALL {
            let cards = &self.cards;
            let pile = match zone {
                Zone::DrawPile => &mut self.draw_pile,
                Zone::Hand => &mut self.hand,
                Zone::DiscardPile => &mut self.discard_pile,
                Zone::ExhaustPile => &mut self.exhaust_pile,
            };
            let before = pile.len();
            pile.retain(|id| cards.contains_key(id) && seen.insert(*id));
            let removed = before - pile.len();
            if removed > 0 {
                error!(?zone, removed, "dropped duplicate or unknown card entries");
                dropped += removed;
            }
        }

        while self.hand.len() > self.max_hand_size {
            if let Some(id) = self.hand.pop_back() {
                error!(instance = %id, "hand over capacity; moving card to discard");
                self.discard_pile.push_back(id);
                dropped += 1;
            }
        }

        let mut locations = FxHashMap::default();
        for zone in Zone::ALL {
            for &id in self.zone(zone).iter() {
                locations.insert(id, zone);
            }
        }
        self.locations = locations;
        dropped
    }

    fn place(&mut self, id: InstanceId, zone: Zone) {
        self.locations.insert(id, zone);
        match zone {
            Zone::DrawPile => self.draw_pile.push_back(id),
            Zone::Hand => self.hand.push_back(id),
            Zone::DiscardPile => self.discard_pile.push_back(id),
            Zone::ExhaustPile => self.exhaust_pile.push_back(id),
        }
    }

    fn detach(&mut self, id: InstanceId) {
        let Some(zone) = self.locations.remove(&id) else {
            return;
        };
        let pile = match zone {
            Zone::DrawPile => &mut self.draw_pile,
            Zone::Hand => &mut self.hand,
            Zone::DiscardPile => &mut self.discard_pile,
            Zone::ExhaustPile => &mut self.exhaust_pile,
        };
        pile.retain(|&e| e != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{ActionClass, CardDefinition, CardTag, Synthesizer};
    use std::sync::Arc;

    fn deck_of(n: u32) -> DeckManager {
        let mut synth = Synthesizer::new();
        let def = Arc::new(
            CardDefinition::new(CardId::new(1), "Strike", ActionClass::Offense).with_tag(CardTag::Attack),
        );
        let mut deck = DeckManager::new(GameRng::new(42));
        for i in 0..n {
            deck.add_to_master_deck(CardInstance::new(InstanceId::new(i), Arc::clone(&def), &mut synth));
        }
        deck
    }

    fn temp(id: u32) -> CardInstance {
        let mut synth = Synthesizer::new();
        let def = Arc::new(CardDefinition::placeholder(CardId::new(900)));
        CardInstance::new(InstanceId::new(id), def, &mut synth)
    }

    #[test]
    fn test_reset_moves_master_into_draw_pile() {
        let mut deck = deck_of(10);
        deck.reset_for_combat();

        assert_eq!(deck.draw_pile().len(), 10);
        assert!(deck.hand().is_empty());
        assert_eq!(deck.zone_of(InstanceId::new(3)), Some(Zone::DrawPile));
    }

    #[test]
    fn test_reset_is_seeded() {
        let mut a = deck_of(20);
        let mut b = deck_of(20);
        a.reset_for_combat();
        b.reset_for_combat();
        assert_eq!(a.draw_pile(), b.draw_pile());
    }

    #[test]
    fn test_draw_reshuffles_discard() {
        let mut deck = deck_of(13);
        deck.reset_for_combat();

        // Leave 3 in the draw pile and 10 in discard.
        let drawn = deck.draw(10).drawn;
        for id in drawn {
            deck.discard_from_hand(id);
        }
        assert_eq!(deck.draw_pile().len(), 3);
        assert_eq!(deck.discard_pile().len(), 10);

        let report = deck.draw(5);
        assert!(report.reshuffled);
        assert_eq!(report.drawn.len(), 5);
        assert_eq!(deck.hand().len(), 5);
        assert_eq!(deck.draw_pile().len(), 8);
        assert!(deck.discard_pile().is_empty());
    }

    #[test]
    fn test_draw_stops_when_everything_is_empty() {
        let mut deck = deck_of(3);
        deck.reset_for_combat();

        let report = deck.draw(5);
        assert_eq!(report.drawn.len(), 3);
        assert!(!report.reshuffled);
    }

    #[test]
    fn test_draw_respects_hand_cap() {
        let mut deck = deck_of(10).with_max_hand_size(4);
        deck.reset_for_combat();

        assert_eq!(deck.draw(6).drawn.len(), 4);
        assert_eq!(deck.draw(1).drawn.len(), 0);
        assert_eq!(deck.draw_pile().len(), 6);
    }

    #[test]
    fn test_hand_removals() {
        let mut deck = deck_of(5);
        deck.reset_for_combat();
        let drawn = deck.draw(3).drawn;

        let removal = deck.exhaust_from_hand(drawn[0]).unwrap();
        assert_eq!(removal.to, Zone::ExhaustPile);
        assert_eq!(removal.card, CardId::new(1));
        assert_eq!(deck.zone_of(drawn[0]), Some(Zone::ExhaustPile));

        // Not in hand any more
        assert!(deck.discard_from_hand(drawn[0]).is_none());

        let rest = deck.discard_hand();
        assert_eq!(rest.len(), 2);
        assert!(deck.hand().is_empty());
        assert_eq!(deck.discard_pile().len(), 2);
        assert_eq!(deck.in_combat_count(), 5);
    }

    #[test]
    fn test_temporaries_are_purged_on_reset() {
        let mut deck = deck_of(4);
        deck.reset_for_combat();

        assert_eq!(deck.add_temporary(temp(100), Zone::DiscardPile), Some(Zone::DiscardPile));
        assert_eq!(deck.in_combat_count(), 5);
        assert_eq!(deck.master_len(), 4);

        deck.reset_for_combat();
        assert_eq!(deck.in_combat_count(), 4);
        assert!(deck.card(InstanceId::new(100)).is_none());
    }

    #[test]
    fn test_temporary_to_full_hand_goes_to_discard() {
        let mut deck = deck_of(4).with_max_hand_size(2);
        deck.reset_for_combat();
        deck.draw(2);

        assert_eq!(deck.add_temporary(temp(100), Zone::Hand), Some(Zone::DiscardPile));
    }

    #[test]
    fn test_reset_clears_temporary_costs() {
        let mut deck = deck_of(2);
        deck.reset_for_combat();
        deck.draw(2);
        deck.card_mut(InstanceId::new(0)).unwrap().set_temporary_cost(Some(3));

        deck.reset_for_combat();
        assert_eq!(deck.card(InstanceId::new(0)).unwrap().temporary_cost(), None);
        assert_eq!(deck.master_len(), 2);
    }

    #[test]
    fn test_remove_from_master_deck() {
        let mut deck = deck_of(3);
        deck.reset_for_combat();

        let removed = deck.remove_from_master_deck(InstanceId::new(1));
        assert!(removed.is_some());
        assert_eq!(deck.master_len(), 2);
        assert_eq!(deck.in_combat_count(), 2);
        assert_eq!(deck.zone_of(InstanceId::new(1)), None);
        assert!(deck.remove_from_master_deck(InstanceId::new(1)).is_none());
    }

    #[test]
    fn test_duplicate_instance_is_rejected() {
        let mut deck = deck_of(1);
        assert!(!deck.add_to_master_deck(temp(0)));
        assert_eq!(deck.master_len(), 1);
    }

    #[test]
    fn test_repair_drops_duplicates() {
        let mut deck = deck_of(3);
        deck.reset_for_combat();
        let top = *deck.draw_pile().last().unwrap();
        deck.discard_pile.push_back(top);
        deck.exhaust_pile.push_back(InstanceId::new(77));

        assert_eq!(deck.repair_zones(), 2);
        assert_eq!(deck.in_combat_count(), 3);
        assert_eq!(deck.zone_of(top), Some(Zone::DrawPile));

        deck.check_invariants();
    }
}
