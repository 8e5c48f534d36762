//! Worked examples of the core rules.
//!
//! Each test pins one concrete case: plain and Vulnerable hits against Block,
//! an unaffordable play, a draw that reshuffles, and channel exclusion.

use std::sync::Arc;

use concept_combat::cards::{
    synthesize, ActionClass, CardDefinition, CardInstance, CardTag, ContentCatalog, OverrideTable, Rarity,
    ScoreVector, Synthesizer, TraitDimension,
};
use concept_combat::combat::{
    CombatManager, CombatPhase, Dilemma, DilemmaChoice, DilemmaOutcome, EncounterType, NoRewards, PlayerInput,
};
use concept_combat::combatant::{
    AffinityRules, Combatant, DamageInput, EnemyDefinition, EnemyMove, Player, StatusDuration, StatusKind,
    StatusSource,
};
use concept_combat::core::{CardId, CombatConfig, DilemmaId, EnemyId, GameRng, InstanceId};
use concept_combat::error::ActionError;
use concept_combat::zones::DeckManager;

fn deck_of(card: CardDefinition, copies: u32) -> DeckManager {
    let mut synth = Synthesizer::new();
    let def = Arc::new(card);
    let mut deck = DeckManager::new(GameRng::new(3));
    for i in 0..copies {
        deck.add_to_master_deck(CardInstance::new(InstanceId::new(i), Arc::clone(&def), &mut synth));
    }
    deck
}

fn brute(damage: i32) -> EnemyDefinition {
    EnemyDefinition::new(EnemyId::new(1), "Brute", 60).with_move(EnemyMove::new("Smash").attack(damage))
}

fn start(player: Player, enemy: EnemyDefinition, config: CombatConfig) -> CombatManager {
    let catalog = Arc::new(ContentCatalog::new().with_enemy(enemy));
    let mut combat = CombatManager::new(player, catalog, config, Box::new(NoRewards));
    combat
        .start_combat(&[EnemyId::new(1)], EncounterType::Normal)
        .expect("brute should spawn");
    combat
}

#[test]
fn test_unmodified_hit_without_block() {
    let strike = CardDefinition::new(CardId::new(1), "Strike", ActionClass::Offense).with_tag(CardTag::Attack);
    let mut combat = start(Player::new(50, deck_of(strike, 10)), brute(10), CombatConfig::default());

    combat.handle_player_input(PlayerInput::EndTurn).unwrap();
    combat.drain_enemy_turn();

    assert_eq!(combat.player().hp(), 40);
    assert_eq!(combat.player().block(), 0);
}

#[test]
fn test_vulnerable_hit_against_block() {
    let mut player = Player::new(50, DeckManager::new(GameRng::new(0)));
    player.gain_block(5);
    player.apply_status(
        StatusKind::Vulnerable,
        StatusDuration::Turns(1),
        1,
        StatusSource::Enemy(EnemyId::new(1)),
    );

    let outcome = player.take_hit(DamageInput::new(8), None, AffinityRules::default());

    assert_eq!(outcome.raw, 12);
    assert_eq!(outcome.block_delta, -5);
    assert_eq!(outcome.hp_delta, -7);
    assert_eq!(player.block(), 0);
    assert_eq!(player.hp(), 43);
}

#[test]
fn test_vulnerable_hit_against_block_in_combat() {
    let defend = CardDefinition::new(CardId::new(2), "Defend", ActionClass::Defense).with_tag(CardTag::Block);
    let mut combat = start(Player::new(50, deck_of(defend, 10)), brute(8), CombatConfig::default());

    let exposed = Dilemma::new(DilemmaId::new(1), "Lower your guard?").with_choice(
        DilemmaChoice::new("Yes").with_outcome(DilemmaOutcome::ApplyStatusToPlayer {
            kind: StatusKind::Vulnerable,
            turns: 2,
            amount: 1,
        }),
    );
    combat.raise_dilemma(exposed).unwrap();
    combat
        .handle_player_input(PlayerInput::ResolveDilemma { choice: 0 })
        .unwrap();

    combat
        .handle_player_input(PlayerInput::PlayCard {
            hand_index: 0,
            target: None,
        })
        .unwrap();
    assert_eq!(combat.player().block(), 5);

    combat.handle_player_input(PlayerInput::EndTurn).unwrap();
    combat.drain_enemy_turn();

    assert_eq!(combat.player().hp(), 43);
}

#[test]
fn test_unaffordable_play_is_rejected() {
    let overload = CardDefinition::new(CardId::new(3), "Overload", ActionClass::Offense)
        .with_rarity(Rarity::Rare)
        .with_tags([CardTag::Attack, CardTag::Intense]);
    let config = CombatConfig::default().with_max_resource(1);
    let mut combat = start(Player::new(50, deck_of(overload, 10)), brute(10), config);

    assert_eq!(combat.player().deck().hand_card(0).and_then(CardInstance::cost), Some(2));
    let before = combat.snapshot();

    let result = combat.handle_player_input(PlayerInput::PlayCard {
        hand_index: 0,
        target: Some(0),
    });

    assert_eq!(
        result,
        Err(ActionError::InsufficientResource { needed: 2, available: 1 })
    );
    assert_eq!(
        combat.handle_player_input(PlayerInput::SelectCard { hand_index: 0 }),
        Err(ActionError::InsufficientResource { needed: 2, available: 1 })
    );
    assert_eq!(combat.phase(), CombatPhase::PlayerChooseAction);
    assert_eq!(combat.player().resource(), 1);
    assert_eq!(combat.player().deck().hand().len(), 5);
    assert!(combat.player().deck().discard_pile().is_empty());
    assert_eq!(combat.snapshot(), before);
}

#[test]
fn test_draw_reshuffles_discard() {
    let strike = CardDefinition::new(CardId::new(1), "Strike", ActionClass::Offense).with_tag(CardTag::Attack);
    let mut deck = deck_of(strike, 13);
    deck.reset_for_combat();
    deck.draw(10);
    deck.discard_hand();

    assert_eq!(deck.draw_pile().len(), 3);
    assert_eq!(deck.discard_pile().len(), 10);
    let remaining: Vec<InstanceId> = deck.draw_pile().iter().copied().collect();

    let report = deck.draw(5);

    assert!(report.reshuffled);
    assert_eq!(report.drawn.len(), 5);
    assert_eq!(deck.hand().len(), 5);
    assert_eq!(deck.draw_pile().len(), 8);
    assert!(deck.discard_pile().is_empty());
    // The old draw pile is used up before the reshuffle
    for id in remaining {
        assert!(report.drawn[..3].contains(&id));
    }
}

#[test]
fn test_attack_and_block_tags_keep_only_damage() {
    let bash = CardDefinition::new(CardId::new(4), "Shield Bash", ActionClass::Offense)
        .with_scores(
            ScoreVector::new()
                .with(TraitDimension::Intensity, 4.0)
                .with(TraitDimension::Structure, 6.0),
        )
        .with_tags([CardTag::Attack, CardTag::Block]);

    let effects = synthesize(&bash, false, &OverrideTable::new());
    assert!(effects.damage > 0);
    assert_eq!(effects.block, 0);

    let hybrid = bash.with_tag(CardTag::Hybrid);
    let effects = synthesize(&hybrid, false, &OverrideTable::new());
    assert!(effects.damage > 0);
    assert!(effects.block > 0);
}
