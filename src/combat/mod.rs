//! Combat: the turn and targeting state machine.
//!
//! ## Key Types
//!
//! - `CombatManager`: owns one combat and accepts inputs, ticks and dilemmas
//! - `CombatPhase`: where the state machine is
//! - `PlayerInput`: the only inputs the presentation layer may send
//! - `Dilemma`: a scripted branching choice
//! - `RewardGenerator`: external collaborator invoked once on victory
//! - `CombatSnapshot`: detached read-only view
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use concept_combat::cards::{ActionClass, CardDefinition, CardTag, ContentCatalog};
//! use concept_combat::combat::{CombatManager, CombatPhase, EncounterType, NoRewards, PlayerInput};
//! use concept_combat::combatant::{Combatant, EnemyDefinition, EnemyMove, Player};
//! use concept_combat::core::{CardId, CombatConfig, EnemyId, GameRng, InstanceId};
//! use concept_combat::zones::DeckManager;
//!
//! let catalog = ContentCatalog::new()
//!     .with_card(CardDefinition::new(CardId::new(1), "Strike", ActionClass::Offense).with_tag(CardTag::Attack))
//!     .with_enemy(EnemyDefinition::new(EnemyId::new(1), "Slime", 12).with_move(EnemyMove::new("Slam").attack(5)));
//!
//! let mut synth = catalog.synthesizer();
//! let mut deck = DeckManager::new(GameRng::new(1));
//! for i in 0..5 {
//!     deck.add_to_master_deck(catalog.instantiate_card(CardId::new(1), InstanceId::new(i), &mut synth));
//! }
//!
//! let mut combat = CombatManager::new(
//!     Player::new(50, deck),
//!     Arc::new(catalog),
//!     CombatConfig::default(),
//!     Box::new(NoRewards),
//! );
//! combat.start_combat(&[EnemyId::new(1)], EncounterType::Normal).unwrap();
//! assert_eq!(combat.phase(), CombatPhase::PlayerChooseAction);
//!
//! combat.handle_player_input(PlayerInput::PlayCard { hand_index: 0, target: Some(0) }).unwrap();
//! assert_eq!(combat.enemies()[0].hp(), 6);
//! ```

pub mod dilemma;
pub mod input;
pub mod manager;
pub mod phase;
pub mod reward;
pub mod snapshot;

pub use dilemma::{Dilemma, DilemmaChoice, DilemmaOutcome, DilemmaTrigger, OutcomeContext, ScriptedDilemma};
pub use input::PlayerInput;
pub use manager::CombatManager;
pub use phase::{CombatOutcome, CombatPhase};
pub use reward::{EncounterType, NoRewards, RewardGenerator, Rewards};
pub use snapshot::{CardView, CombatSnapshot, EnemyView, PlayerView};
