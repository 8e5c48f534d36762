//! Card zones for one combatant.
//!
//! ## Key Types
//!
//! - `DeckManager`: master deck ownership plus draw/hand/discard/exhaust tracking
//! - `Zone`: which of the four combat zones a card occupies
//! - `HandRemoval`: the fact reported whenever a card leaves the hand

pub mod deck;

pub use deck::{DeckManager, DrawReport, HandRemoval, Zone, DEFAULT_MAX_HAND_SIZE};
