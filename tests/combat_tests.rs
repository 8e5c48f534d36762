//! Combat state machine tests.
//!
//! These drive a `CombatManager` through its public inputs only:
//! - Card selection, targeting and validation
//! - Enemy turns stepped by `tick`
//! - Affinity side effects (resonance, penalty cards)
//! - Combat end and rewards

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use concept_combat::artifacts::CombatEvent;
use concept_combat::cards::{
    ActionClass, CardDefinition, CardInstance, CardTag, ContentCatalog, Element, StatusApplication, StatusTarget,
    Synthesizer,
};
use concept_combat::combat::{
    CombatManager, CombatOutcome, CombatPhase, EncounterType, NoRewards, PlayerInput, RewardGenerator, Rewards,
};
use concept_combat::combatant::{Combatant, EnemyDefinition, EnemyMove, Player, StatusKind};
use concept_combat::core::{CardId, CombatConfig, EnemyId, GameRng, InstanceId};
use concept_combat::error::{ActionError, CombatError, ContentError};
use concept_combat::zones::DeckManager;

fn strike() -> CardDefinition {
    CardDefinition::new(CardId::new(1), "Strike", ActionClass::Offense).with_tag(CardTag::Attack)
}

fn deck_of(card: CardDefinition, copies: u32) -> Player {
    let mut synth = Synthesizer::new();
    let def = Arc::new(card);
    let mut deck = DeckManager::new(GameRng::new(1));
    for i in 0..copies {
        deck.add_to_master_deck(CardInstance::new(InstanceId::new(i), Arc::clone(&def), &mut synth));
    }
    Player::new(50, deck)
}

fn slime(hp: i32) -> EnemyDefinition {
    EnemyDefinition::new(EnemyId::new(1), "Slime", hp).with_move(EnemyMove::new("Tackle").attack(10))
}

fn start(player: Player, catalog: ContentCatalog, config: CombatConfig, roster: &[EnemyId]) -> CombatManager {
    let mut combat = CombatManager::new(player, Arc::new(catalog), config, Box::new(NoRewards));
    combat
        .start_combat(roster, EncounterType::Normal)
        .expect("roster should spawn");
    combat
}

fn strike_combat(enemy: EnemyDefinition) -> CombatManager {
    start(
        deck_of(strike(), 10),
        ContentCatalog::new().with_enemy(enemy),
        CombatConfig::default(),
        &[EnemyId::new(1)],
    )
}

/// Counts how often it is asked for rewards.
struct CountingRewards(Arc<AtomicU32>);

impl RewardGenerator for CountingRewards {
    fn generate(&mut self, encounter: EncounterType, roster: &[EnemyId]) -> Rewards {
        self.0.fetch_add(1, Ordering::SeqCst);
        let scale = if encounter == EncounterType::Elite { 2 } else { 1 };
        Rewards {
            insight: 10 * scale * roster.len() as u32,
            card_choice_ids: vec![CardId::new(1)],
            artifact_choice_id: None,
        }
    }
}

#[test]
fn test_start_combat_opens_first_turn() {
    let combat = strike_combat(slime(30));

    assert_eq!(combat.phase(), CombatPhase::PlayerChooseAction);
    assert_eq!(combat.turn(), 1);
    assert_eq!(combat.player().deck().hand().len(), 5);
    assert_eq!(combat.player().resource(), 3);
    assert!(combat.enemies()[0].intent().is_some());
}

#[test]
fn test_start_combat_errors() {
    let catalog = ContentCatalog::new().with_enemy(slime(30));
    let mut combat = CombatManager::new(
        deck_of(strike(), 10),
        Arc::new(catalog),
        CombatConfig::default(),
        Box::new(NoRewards),
    );

    assert_eq!(
        combat.handle_player_input(PlayerInput::EndTurn),
        Err(ActionError::WrongPhase { phase: "NotStarted" })
    );
    assert_eq!(
        combat.start_combat(&[EnemyId::new(9)], EncounterType::Normal),
        Err(CombatError::Content(ContentError::EmptyRoster))
    );

    // Unknown ids are skipped
    combat
        .start_combat(&[EnemyId::new(9), EnemyId::new(1)], EncounterType::Normal)
        .expect("one known enemy");
    assert_eq!(combat.enemies().len(), 1);
    assert_eq!(
        combat.start_combat(&[EnemyId::new(1)], EncounterType::Normal),
        Err(CombatError::AlreadyStarted)
    );
}

#[test]
fn test_select_cancel_and_choose_target() {
    let mut combat = strike_combat(slime(30));

    combat
        .handle_player_input(PlayerInput::SelectCard { hand_index: 0 })
        .unwrap();
    assert_eq!(combat.phase(), CombatPhase::PlayerSelectTarget { hand_index: 0 });

    combat.handle_player_input(PlayerInput::CancelTarget).unwrap();
    assert_eq!(combat.phase(), CombatPhase::PlayerChooseAction);
    assert_eq!(combat.player().deck().hand().len(), 5);
    assert_eq!(combat.player().resource(), 3);

    combat
        .handle_player_input(PlayerInput::SelectCard { hand_index: 0 })
        .unwrap();
    assert_eq!(
        combat.handle_player_input(PlayerInput::ChooseTarget { enemy: 5 }),
        Err(ActionError::InvalidTarget { index: 5 })
    );
    assert_eq!(combat.phase(), CombatPhase::PlayerSelectTarget { hand_index: 0 });

    combat
        .handle_player_input(PlayerInput::ChooseTarget { enemy: 0 })
        .unwrap();
    assert_eq!(combat.phase(), CombatPhase::PlayerChooseAction);
    assert_eq!(combat.enemies()[0].hp(), 24);
    assert_eq!(combat.player().deck().hand().len(), 4);
    assert_eq!(combat.player().deck().discard_pile().len(), 1);
}

#[test]
fn test_input_validation() {
    let mut combat = strike_combat(slime(30));

    assert_eq!(
        combat.handle_player_input(PlayerInput::ChooseTarget { enemy: 0 }),
        Err(ActionError::NoPendingCard)
    );
    assert_eq!(
        combat.handle_player_input(PlayerInput::PlayCard {
            hand_index: 9,
            target: Some(0)
        }),
        Err(ActionError::CardNotInHand { index: 9 })
    );
    assert_eq!(
        combat.handle_player_input(PlayerInput::PlayCard {
            hand_index: 0,
            target: None
        }),
        Err(ActionError::TargetRequired)
    );
    assert_eq!(
        combat.handle_player_input(PlayerInput::ResolveDilemma { choice: 0 }),
        Err(ActionError::WrongPhase {
            phase: "PlayerChooseAction"
        })
    );
}

#[test]
fn test_rejected_input_changes_nothing() {
    let mut combat = strike_combat(slime(30));
    let before = combat.snapshot();
    let log_len = combat.event_log().len();

    let _ = combat.handle_player_input(PlayerInput::PlayCard {
        hand_index: 2,
        target: Some(3),
    });
    let _ = combat.handle_player_input(PlayerInput::CancelTarget);

    assert_eq!(combat.snapshot(), before);
    assert_eq!(combat.event_log().len(), log_len);
}

#[test]
fn test_enemy_turn_is_stepped_by_tick() {
    let catalog = ContentCatalog::new().with_enemy(slime(30));
    let config = CombatConfig::default().with_enemy_action_delay(0.5);
    let mut combat = start(deck_of(strike(), 10), catalog, config, &[EnemyId::new(1), EnemyId::new(1)]);

    assert!(!combat.tick(1.0));
    combat.handle_player_input(PlayerInput::EndTurn).unwrap();
    assert_eq!(combat.phase(), CombatPhase::EnemyTurnStart);
    assert!(combat.player().deck().hand().is_empty());

    assert!(!combat.tick(0.25));
    assert!(combat.tick(0.25));
    assert_eq!(combat.phase(), CombatPhase::EnemyActing);
    assert_eq!(combat.queued_enemy_actions(), 2);
    assert_eq!(
        combat.handle_player_input(PlayerInput::EndTurn),
        Err(ActionError::WrongPhase { phase: "EnemyActing" })
    );

    assert!(combat.tick(0.5));
    assert_eq!(combat.player().hp(), 40);
    assert_eq!(combat.queued_enemy_actions(), 1);

    assert!(combat.tick(0.5));
    assert_eq!(combat.player().hp(), 30);
    assert_eq!(combat.phase(), CombatPhase::PlayerChooseAction);
    assert_eq!(combat.turn(), 2);
    assert_eq!(combat.player().deck().hand().len(), 5);
}

#[test]
fn test_drain_enemy_turn() {
    let mut combat = strike_combat(slime(30));
    combat.handle_player_input(PlayerInput::EndTurn).unwrap();

    // Setup step plus one action
    assert_eq!(combat.drain_enemy_turn(), 2);
    assert_eq!(combat.turn(), 2);
    assert!(combat.enemies()[0].intent().is_some());
}

#[test]
fn test_player_death_stops_enemy_queue() {
    let catalog = ContentCatalog::new().with_enemy(slime(30));
    let player = deck_of(strike(), 10).with_hp(15);
    let roster = [EnemyId::new(1), EnemyId::new(1), EnemyId::new(1)];
    let mut combat = start(player, catalog, CombatConfig::default(), &roster);

    combat.handle_player_input(PlayerInput::EndTurn).unwrap();
    combat.drain_enemy_turn();

    assert_eq!(combat.outcome(), Some(CombatOutcome::Defeat));
    assert_eq!(combat.phase(), CombatPhase::GameOver);
    assert_eq!(combat.player().hp(), 0);
    assert_eq!(combat.queued_enemy_actions(), 0);
    // The third enemy never acted
    assert!(combat.enemies()[2].intent().is_some());
    assert!(combat.pending_rewards().is_none());
    assert_eq!(
        combat.handle_player_input(PlayerInput::EndTurn),
        Err(ActionError::CombatOver)
    );
    assert!(!combat.tick(1.0));
}

#[test]
fn test_victory_generates_rewards_once() {
    let calls = Arc::new(AtomicU32::new(0));
    let catalog = ContentCatalog::new().with_enemy(slime(6));
    let mut combat = CombatManager::new(
        deck_of(strike(), 10),
        Arc::new(catalog),
        CombatConfig::default(),
        Box::new(CountingRewards(Arc::clone(&calls))),
    );
    combat
        .start_combat(&[EnemyId::new(1)], EncounterType::Elite)
        .unwrap();

    combat
        .handle_player_input(PlayerInput::PlayCard {
            hand_index: 0,
            target: Some(0),
        })
        .unwrap();

    assert!(combat.is_combat_over());
    assert_eq!(combat.outcome(), Some(CombatOutcome::Victory));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(combat.event_log().contains(&CombatEvent::EnemyDefeated {
        enemy: 0,
        definition: EnemyId::new(1),
    }));
    assert_eq!(combat.event_log().last(), Some(&CombatEvent::Victory));

    assert_eq!(
        combat.handle_player_input(PlayerInput::PlayCard {
            hand_index: 0,
            target: Some(0)
        }),
        Err(ActionError::CombatOver)
    );
    let rewards = combat.take_pending_rewards().expect("victory rewards");
    assert_eq!(rewards.insight, 20);
    assert!(combat.take_pending_rewards().is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_end_combat_returns_player() {
    let mut combat = strike_combat(slime(30));
    combat.handle_player_input(PlayerInput::EndTurn).unwrap();
    combat.drain_enemy_turn();

    let player = combat.end_combat();
    assert_eq!(player.hp(), 40);
    assert_eq!(player.block(), 0);
    assert!(player.deck().hand().is_empty());
    assert_eq!(player.deck().master_len(), 10);
}

#[test]
fn test_play_cap_ends_turn() {
    let catalog = ContentCatalog::new().with_enemy(slime(100));
    let config = CombatConfig::default().with_play_cap(Some(2));
    let mut combat = start(deck_of(strike(), 10), catalog, config, &[EnemyId::new(1)]);

    for _ in 0..2 {
        combat
            .handle_player_input(PlayerInput::PlayCard {
                hand_index: 0,
                target: Some(0),
            })
            .unwrap();
    }

    assert_eq!(combat.phase(), CombatPhase::EnemyTurnStart);
    assert!(combat.player().deck().hand().is_empty());
    assert_eq!(combat.enemies()[0].hp(), 88);
}

#[test]
fn test_momentum_surge_grants_resource() {
    let mut combat = strike_combat(slime(100));

    for _ in 0..3 {
        combat
            .handle_player_input(PlayerInput::PlayCard {
                hand_index: 0,
                target: Some(0),
            })
            .unwrap();
    }

    assert_eq!(combat.player().resource(), 4);
    assert_eq!(combat.player().momentum().streak, 0);
}

#[test]
fn test_resistance_adds_penalty_cards() {
    let enemy = slime(100).with_resistance(Element::Ember);
    let mut combat = start(
        deck_of(strike().with_element(Element::Ember), 10),
        ContentCatalog::new().with_enemy(enemy),
        CombatConfig::default(),
        &[EnemyId::new(1)],
    );

    combat
        .handle_player_input(PlayerInput::PlayCard {
            hand_index: 0,
            target: Some(0),
        })
        .unwrap();

    // Damage is unchanged by affinity
    assert_eq!(combat.enemies()[0].hp(), 94);
    assert_eq!(combat.player().deck().discard_pile().len(), 2);
    assert!(combat
        .event_log()
        .contains(&CombatEvent::PenaltyCardsAdded { count: 1 }));

    let player = combat.end_combat();
    assert_eq!(player.deck().master_len(), 10);
    assert_eq!(player.deck().in_combat_count(), 10);
}

#[test]
fn test_weakness_builds_resonance() {
    let enemy = slime(100).with_weakness(Element::Ember);
    let mut combat = start(
        deck_of(strike().with_element(Element::Ember), 10),
        ContentCatalog::new().with_enemy(enemy),
        CombatConfig::default(),
        &[EnemyId::new(1)],
    );

    combat
        .handle_player_input(PlayerInput::PlayCard {
            hand_index: 0,
            target: Some(0),
        })
        .unwrap();
    assert_eq!(combat.enemies()[0].hp(), 94);
    assert_eq!(combat.player().resonance(Element::Ember), 1);

    // The next Ember attack consumes the stack for +2 damage
    combat
        .handle_player_input(PlayerInput::PlayCard {
            hand_index: 0,
            target: Some(0),
        })
        .unwrap();
    assert_eq!(combat.enemies()[0].hp(), 86);
    assert_eq!(combat.player().resonance(Element::Ember), 1);
}

#[test]
fn test_poison_kills_at_enemy_turn_start() {
    let toxin = CardDefinition::new(CardId::new(3), "Toxin", ActionClass::Utility).with_tag(CardTag::Poison);
    let enemy = EnemyDefinition::new(EnemyId::new(1), "Sprout", 3);
    let mut combat = start(
        deck_of(toxin, 10),
        ContentCatalog::new().with_enemy(enemy),
        CombatConfig::default(),
        &[EnemyId::new(1)],
    );

    combat
        .handle_player_input(PlayerInput::PlayCard {
            hand_index: 0,
            target: Some(0),
        })
        .unwrap();
    assert!(combat.enemies()[0].statuses().has(StatusKind::Poison));

    combat.handle_player_input(PlayerInput::EndTurn).unwrap();
    assert!(combat.tick(0.0));

    assert_eq!(combat.outcome(), Some(CombatOutcome::Victory));
    assert_eq!(combat.enemies()[0].hp(), 0);
}

#[test]
fn test_enemy_self_buff_lasts_into_next_attack() {
    let ogre = EnemyDefinition::new(EnemyId::new(1), "Ogre", 60)
        .with_move(EnemyMove::new("Roar").with_status(StatusApplication::new(
            StatusKind::Strength,
            StatusTarget::SelfTarget,
            1,
            3,
        )))
        .with_move(EnemyMove::new("Smash").attack(10));
    let mut combat = strike_combat(ogre);

    combat.handle_player_input(PlayerInput::EndTurn).unwrap();
    combat.drain_enemy_turn();
    assert_eq!(combat.enemies()[0].statuses().amount(StatusKind::Strength), 3);
    assert_eq!(combat.enemies()[0].intent().map(|i| i.damage_preview), Some(13));

    combat.handle_player_input(PlayerInput::EndTurn).unwrap();
    combat.drain_enemy_turn();
    assert_eq!(combat.player().hp(), 37);
    assert!(!combat.enemies()[0].statuses().has(StatusKind::Strength));
}

#[test]
fn test_enemy_vulnerable_amplifies_next_enemy_hit() {
    let hexer = EnemyDefinition::new(EnemyId::new(1), "Hexer", 60)
        .with_move(EnemyMove::new("Hex").with_status(StatusApplication::new(
            StatusKind::Vulnerable,
            StatusTarget::Enemy,
            1,
            1,
        )))
        .with_move(EnemyMove::new("Smash").attack(10));
    let mut combat = strike_combat(hexer);

    combat.handle_player_input(PlayerInput::EndTurn).unwrap();
    combat.drain_enemy_turn();
    assert!(combat.player().statuses().has(StatusKind::Vulnerable));

    // floor(10 × 1.5)
    combat.handle_player_input(PlayerInput::EndTurn).unwrap();
    combat.drain_enemy_turn();
    assert_eq!(combat.player().hp(), 35);

    combat.handle_player_input(PlayerInput::EndTurn).unwrap();
    assert!(!combat.player().statuses().has(StatusKind::Vulnerable));
}

#[test]
fn test_turn_events_are_ordered() {
    let combat = strike_combat(slime(30));
    let log = combat.event_log();

    let position = |wanted: &CombatEvent| log.iter().position(|e| e == wanted);
    let turn_start = position(&CombatEvent::TurnStart { turn: 1 }).expect("turn start");
    let combat_start = position(&CombatEvent::CombatStart).expect("combat start");
    let first_draw = log
        .iter()
        .position(|e| matches!(e, CombatEvent::CardDrawn { .. }))
        .expect("draws");

    assert!(turn_start < first_draw);
    assert!(first_draw < combat_start);
    assert_eq!(
        log.iter()
            .filter(|e| matches!(e, CombatEvent::CardDrawn { .. }))
            .count(),
        5
    );
}

#[test]
fn test_snapshot_reflects_state() {
    let combat = strike_combat(slime(30));
    let snapshot = combat.snapshot();

    assert_eq!(snapshot.turn, 1);
    assert_eq!(snapshot.hand.len(), 5);
    assert_eq!(snapshot.hand[0].cost, Some(0));
    assert_eq!(snapshot.player.draw_pile, 5);
    assert_eq!(snapshot.enemies[0].hp, 30);
    assert!(snapshot.enemies[0].alive);
    assert!(snapshot.dilemma.is_none());

    let json = serde_json::to_string(&snapshot).unwrap();
    let back: concept_combat::combat::CombatSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);
}
