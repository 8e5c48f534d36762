//! Artifact dispatch.
//!
//! `dispatch_event` runs every held artifact against one event, in acquisition
//! order. A fault or panic in one artifact is logged and recorded; the loop
//! moves on to the next artifact.
//!
//! `pump_events` drives dispatch to a fixed point: events raised while
//! handling one round (by artifact effects, or recorded by the player as a
//! side effect) form the next round, up to a depth limit.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use super::artifact::ArtifactScope;
use super::event::CombatEvent;
use crate::cards::ContentCatalog;
use crate::combatant::{AffinityRules, Enemy, Player};
use crate::core::ArtifactId;
use crate::error::ArtifactFault;

/// Read-only inputs for a dispatch.
#[derive(Clone, Copy, Debug)]
pub struct DispatchEnv<'a> {
    pub catalog: &'a ContentCatalog,
    pub turn: u32,
    pub rules: AffinityRules,
}

/// What one dispatch did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Artifacts whose effect ran, in firing order.
    pub fired: Vec<ArtifactId>,
    /// Artifacts that faulted.
    pub faults: Vec<(ArtifactId, ArtifactFault)>,
    /// Events raised through `ArtifactScope::raise`.
    pub raised: Vec<CombatEvent>,
}

/// Result of pumping a batch of events.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// Every event dispatched, in order.
    pub dispatched: Vec<CombatEvent>,
    pub fired: Vec<ArtifactId>,
    pub faults: Vec<(ArtifactId, ArtifactFault)>,
    /// Events left undispatched when the depth limit was hit.
    pub truncated: usize,
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}

/// Run every held artifact against `event`.
pub fn dispatch_event(
    event: &CombatEvent,
    player: &mut Player,
    enemies: &mut [Enemy],
    env: DispatchEnv<'_>,
) -> DispatchReport {
    let mut report = DispatchReport::default();
    // Artifacts acquired mid-dispatch wait for the next event
    let artifacts = player.artifacts().clone();

    for artifact in &artifacts {
        if artifact.trigger() != event.kind() {
            continue;
        }
        let id = artifact.id();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut scope =
                ArtifactScope::new(&mut *player, &mut *enemies, event, env.catalog, env.turn, env.rules, id);
            let handled = artifact.handle(&mut scope);
            (handled, scope.into_raised())
        }));

        let fault = match result {
            Ok((Ok(true), raised)) => {
                debug!(artifact = %id, name = artifact.name(), event = ?event.kind(), "artifact fired");
                report.fired.push(id);
                report.raised.extend(raised);
                continue;
            }
            Ok((Ok(false), _)) => continue,
            Ok((Err(fault), _)) => fault,
            Err(payload) => ArtifactFault::new(format!("panicked: {}", panic_message(&*payload))),
        };
        warn!(artifact = %id, event = ?event.kind(), error = %fault, "artifact faulted");
        report.faults.push((id, fault));
    }

    report
}

/// Dispatch `initial`, then whatever those events caused, for at most
/// `max_depth` further rounds.
///
/// The player's pending events are drained after each event, so anything an
/// artifact does to the player is dispatched in the following round.
pub fn pump_events(
    initial: Vec<CombatEvent>,
    player: &mut Player,
    enemies: &mut [Enemy],
    env: DispatchEnv<'_>,
    max_depth: u32,
) -> PumpReport {
    let mut report = PumpReport::default();
    let mut round = initial;
    let mut depth = 0;

    while !round.is_empty() {
        if depth > max_depth {
            report.truncated = round.len();
            debug!(pending = round.len(), max_depth, "event depth limit reached");
            break;
        }
        let mut next = Vec::new();
        for event in round {
            let dispatch = dispatch_event(&event, player, enemies, env);
            report.fired.extend(dispatch.fired);
            report.faults.extend(dispatch.faults);
            next.extend(dispatch.raised);
            next.extend(player.take_events());
            report.dispatched.push(event);
        }
        round = next;
        depth += 1;
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{Artifact, EventKind};
    use crate::combatant::Combatant;
    use crate::core::{CombatConfig, GameRng};
    use crate::zones::DeckManager;

    fn player() -> Player {
        let mut p = Player::new(40, DeckManager::new(GameRng::new(0)));
        p.reset_for_combat(&CombatConfig::default());
        p
    }

    fn env(catalog: &ContentCatalog) -> DispatchEnv<'_> {
        DispatchEnv {
            catalog,
            turn: 1,
            rules: AffinityRules::default(),
        }
    }

    fn plus_one(id: u32) -> Artifact {
        Artifact::new(ArtifactId::new(id), "Plus One", EventKind::TurnStart, |scope| {
            scope.player.gain_resource(1);
            Ok(())
        })
    }

    fn doubler(id: u32) -> Artifact {
        Artifact::new(ArtifactId::new(id), "Doubler", EventKind::TurnStart, |scope| {
            let current = scope.player.resource();
            scope.player.gain_resource(current);
            Ok(())
        })
    }

    #[test]
    fn test_acquisition_order() {
        let catalog = ContentCatalog::new();
        let event = CombatEvent::TurnStart { turn: 1 };

        let mut a = player().with_artifact(plus_one(1)).with_artifact(doubler(2));
        let report = dispatch_event(&event, &mut a, &mut [], env(&catalog));
        assert_eq!(a.resource(), 2);
        assert_eq!(report.fired, vec![ArtifactId::new(1), ArtifactId::new(2)]);

        let mut b = player().with_artifact(doubler(2)).with_artifact(plus_one(1));
        dispatch_event(&event, &mut b, &mut [], env(&catalog));
        assert_eq!(b.resource(), 1);
    }

    #[test]
    fn test_faults_do_not_stop_dispatch() {
        let catalog = ContentCatalog::new();
        let failing = Artifact::new(ArtifactId::new(5), "Cracked", EventKind::TurnStart, |_| {
            Err(ArtifactFault::new("cracked"))
        });
        let panicking = Artifact::new(ArtifactId::new(6), "Cursed", EventKind::TurnStart, |_| {
            panic!("cursed");
        });
        let mut p = player()
            .with_artifact(plus_one(1))
            .with_artifact(failing)
            .with_artifact(panicking)
            .with_artifact(plus_one(2));

        let report = dispatch_event(&CombatEvent::TurnStart { turn: 1 }, &mut p, &mut [], env(&catalog));

        assert_eq!(p.resource(), 2);
        assert_eq!(report.fired, vec![ArtifactId::new(1), ArtifactId::new(2)]);
        assert_eq!(report.faults.len(), 2);
        assert_eq!(report.faults[0].0, ArtifactId::new(5));
        assert!(report.faults[1].1.message.contains("cursed"));
    }

    #[test]
    fn test_pump_follows_player_events() {
        let catalog = ContentCatalog::new();
        let shield = Artifact::new(ArtifactId::new(1), "Shield", EventKind::TurnStart, |scope| {
            scope.player.add_raw_block(3);
            Ok(())
        });
        let echo = Artifact::new(ArtifactId::new(2), "Echo", EventKind::BlockGained, |scope| {
            scope.player.heal(1);
            Ok(())
        });
        let mut p = player().with_hp(30).with_artifact(shield).with_artifact(echo);

        let report = pump_events(vec![CombatEvent::TurnStart { turn: 1 }], &mut p, &mut [], env(&catalog), 4);

        assert_eq!(p.block(), 3);
        assert_eq!(p.hp(), 31);
        assert_eq!(
            report.dispatched,
            vec![
                CombatEvent::TurnStart { turn: 1 },
                CombatEvent::BlockGained { amount: 3 },
                CombatEvent::Healed { amount: 1 },
            ]
        );
        assert_eq!(report.truncated, 0);
    }

    #[test]
    fn test_pump_depth_limit() {
        let catalog = ContentCatalog::new();
        let feedback = Artifact::new(ArtifactId::new(1), "Feedback", EventKind::BlockGained, |scope| {
            scope.player.add_raw_block(1);
            Ok(())
        });
        let mut p = player().with_artifact(feedback);

        let report = pump_events(vec![CombatEvent::BlockGained { amount: 1 }], &mut p, &mut [], env(&catalog), 2);

        // Initial round plus two follow-up rounds
        assert_eq!(report.fired.len(), 3);
        assert_eq!(p.block(), 3);
        assert_eq!(report.truncated, 1);
    }
}
