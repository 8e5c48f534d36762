use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use concept_combat::cards::{
    synthesize, ActionClass, CardDefinition, CardTag, CardUpgrade, ContentCatalog, OverrideTable, ScoreVector,
    TraitDimension,
};
use concept_combat::combat::{CombatManager, EncounterType, NoRewards, PlayerInput};
use concept_combat::combatant::{EnemyDefinition, EnemyMove, Player};
use concept_combat::core::{CardId, CombatConfig, EnemyId, GameRng, InstanceId};
use concept_combat::zones::DeckManager;

fn definitions() -> Vec<CardDefinition> {
    let classes = [ActionClass::Offense, ActionClass::Defense, ActionClass::Utility];
    let tag_sets: [&[CardTag]; 4] = [
        &[CardTag::Attack, CardTag::Weaken],
        &[CardTag::Block, CardTag::Fortify],
        &[CardTag::Attack, CardTag::Sweep, CardTag::Ignite],
        &[CardTag::Draw, CardTag::Focus, CardTag::Cheap],
    ];
    (0..64u32)
        .map(|i| {
            let score = (i % 11) as f32;
            CardDefinition::new(CardId::new(i), format!("Card {i}"), classes[i as usize % 3])
                .with_scores(
                    ScoreVector::new()
                        .with(TraitDimension::Intensity, score)
                        .with(TraitDimension::Structure, 10.0 - score)
                        .with(TraitDimension::Curiosity, score / 2.0),
                )
                .with_tags(tag_sets[i as usize % 4].iter().copied())
                .with_upgrade(CardUpgrade::new())
        })
        .collect()
}

fn bench_synthesize(c: &mut Criterion) {
    let defs = definitions();
    let overrides = OverrideTable::new();

    c.bench_function("synthesize_64_base", |b| {
        b.iter(|| {
            for def in &defs {
                black_box(synthesize(black_box(def), false, &overrides));
            }
        });
    });

    c.bench_function("synthesize_64_upgraded", |b| {
        b.iter(|| {
            for def in &defs {
                black_box(synthesize(black_box(def), true, &overrides));
            }
        });
    });
}

fn bench_combat_turn(c: &mut Criterion) {
    let strike = CardDefinition::new(CardId::new(1), "Strike", ActionClass::Offense).with_tag(CardTag::Attack);
    let catalog = Arc::new(
        ContentCatalog::new()
            .with_card(strike)
            .with_enemy(EnemyDefinition::new(EnemyId::new(1), "Dummy", 1_000).with_move(EnemyMove::new("Poke").attack(1))),
    );

    c.bench_function("combat_full_turn", |b| {
        b.iter(|| {
            let mut synth = catalog.synthesizer();
            let mut deck = DeckManager::new(GameRng::new(1));
            for i in 0..15 {
                deck.add_to_master_deck(catalog.instantiate_card(CardId::new(1), InstanceId::new(i), &mut synth));
            }
            let mut combat = CombatManager::new(
                Player::new(80, deck),
                Arc::clone(&catalog),
                CombatConfig::default(),
                Box::new(NoRewards),
            );
            let _ = combat.start_combat(&[EnemyId::new(1)], EncounterType::Normal);
            while combat
                .handle_player_input(PlayerInput::PlayCard {
                    hand_index: 0,
                    target: Some(0),
                })
                .is_ok()
            {}
            let _ = combat.handle_player_input(PlayerInput::EndTurn);
            black_box(combat.drain_enemy_turn());
        });
    });
}

criterion_group!(benches, bench_synthesize, bench_combat_turn);
criterion_main!(benches);
