//! Artifact system: event-conditioned passive effects.
//!
//! The core never special-cases an artifact. It raises `CombatEvent`s; the
//! dispatcher hands each one to every held artifact in acquisition order, and
//! an artifact whose trigger matches evaluates its condition and runs its
//! effect against an explicit `ArtifactScope`.
//!
//! ## Key Types
//!
//! - `CombatEvent`: tagged union of everything an artifact can react to
//! - `EventKind`: the discriminant an artifact subscribes to
//! - `Artifact`: trigger + condition + effect closures
//! - `ArtifactTemplate`: data description that instantiates an `Artifact`
//! - `dispatch_event`, `pump_events`: ordered, fault-isolated dispatch
//!
//! ## Usage
//!
//! ```
//! use concept_combat::artifacts::{Artifact, EventKind};
//! use concept_combat::core::ArtifactId;
//!
//! let battery = Artifact::new(ArtifactId::new(1), "Battery", EventKind::TurnStart, |scope| {
//!     scope.player.gain_resource(1);
//!     Ok(())
//! });
//! assert_eq!(battery.trigger(), EventKind::TurnStart);
//! ```

pub mod artifact;
pub mod dispatch;
pub mod event;
pub mod template;

pub use artifact::{Artifact, ArtifactScope, ConditionFn, EffectFn};
pub use dispatch::{dispatch_event, pump_events, DispatchEnv, DispatchReport, PumpReport};
pub use event::{CombatEvent, EventKind};
pub use template::{ArtifactCondition, ArtifactEffect, ArtifactTemplate};
