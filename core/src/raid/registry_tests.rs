//! Tests for raid lifecycle bookkeeping
//!
//! Damage arithmetic, defeat edge cases, despawn horizons, and visibility.

use crate::config::RaidSettings;
use crate::world::TICKS_PER_SECOND;
use crate::world::Vec3;
use crate::world::mock::MockWorld;

use super::{DamageOutcome, RaidRegistry, RaidSeed};

fn make_seed(boss_actor: u64, max_health: i64, despawn_secs: u64) -> RaidSeed {
    RaidSeed {
        boss_actor,
        species: "groudon".to_string(),
        level: 70,
        shiny: false,
        position: Vec3::new(0.0, 64.0, 0.0),
        max_health,
        damage_per_win: 500,
        despawn_secs,
    }
}

fn bound_registry() -> RaidRegistry {
    let registry = RaidRegistry::new();
    registry.bind(RaidSettings::default());
    registry
}

/// Spawn the boss actor in the world and register the raid around it.
fn spawn_raid(registry: &RaidRegistry, world: &mut MockWorld, max_health: i64, despawn_secs: u64) -> u64 {
    use crate::world::{ActorSpec, WorldHost};
    let actor = world
        .spawn_actor(&ActorSpec {
            species: "groudon".to_string(),
            level: 70,
            shiny: false,
            scale: 2.0,
            catchable: false,
            position: Vec3::new(0.0, 64.0, 0.0),
            yaw: 0.0,
        })
        .unwrap();
    assert!(registry.create(make_seed(actor, max_health, despawn_secs), 0));
    actor
}

#[test]
fn create_requires_binding() {
    let registry = RaidRegistry::new();
    assert!(!registry.create(make_seed(1, 1000, 0), 0));
    assert!(registry.is_empty());

    registry.bind(RaidSettings::default());
    assert!(registry.create(make_seed(1, 1000, 0), 0));
    assert_eq!(registry.len(), 1);
}

#[test]
fn damage_accumulates_and_clamps_at_zero() {
    let registry = bound_registry();
    registry.create(make_seed(1, 1000, 0), 0);

    assert_eq!(registry.apply_damage(10, 1, 300), DamageOutcome::Weakened);
    assert_eq!(registry.apply_damage(11, 1, 300), DamageOutcome::Weakened);
    assert_eq!(
        registry.with_raid(1, |r| r.current_health()).unwrap(),
        400
    );

    // Overshoot clamps to zero and defeats
    match registry.apply_damage(10, 1, 9999) {
        DamageOutcome::Defeated { participants, source } => {
            assert_eq!(participants.len(), 2);
            assert!(participants.contains(&10));
            assert!(participants.contains(&11));
            assert_eq!(source.species, "groudon");
        }
        other => panic!("expected defeat, got {other:?}"),
    }
    assert_eq!(registry.with_raid(1, |r| r.current_health()).unwrap(), 0);
}

#[test]
fn ledger_tracks_per_participant_totals() {
    let registry = bound_registry();
    registry.create(make_seed(1, 100_000, 0), 0);

    for _ in 0..3 {
        registry.apply_damage(10, 1, 500);
    }
    registry.apply_damage(11, 1, 250);

    assert_eq!(registry.with_raid(1, |r| r.ledger_total(10)).unwrap(), 1500);
    assert_eq!(registry.with_raid(1, |r| r.ledger_total(11)).unwrap(), 250);
    assert_eq!(registry.with_raid(1, |r| r.ledger_total(99)).unwrap(), 0);
    assert_eq!(registry.with_raid(1, |r| r.last_attacker()).unwrap(), Some(11));
}

#[test]
fn defeat_fires_exactly_once() {
    let registry = bound_registry();
    registry.create(make_seed(1, 10_000, 0), 0);

    // 10000 health at 500 per win: the 20th victory defeats
    for i in 1..=19 {
        let outcome = registry.apply_damage(10, 1, 500);
        assert_eq!(outcome, DamageOutcome::Weakened, "victory {i}");
    }
    assert!(matches!(
        registry.apply_damage(10, 1, 500),
        DamageOutcome::Defeated { .. }
    ));

    // The 21st is a no-op: health stays 0, no duplicate defeat signal
    assert_eq!(
        registry.apply_damage(10, 1, 500),
        DamageOutcome::AlreadyDefeated
    );
    assert_eq!(registry.with_raid(1, |r| r.current_health()).unwrap(), 0);
}

#[test]
fn unknown_raid_damage_is_a_logged_noop() {
    let registry = bound_registry();
    assert_eq!(registry.apply_damage(10, 404, 500), DamageOutcome::UnknownRaid);
}

#[test]
fn infinite_despawn_never_expires() {
    let registry = bound_registry();
    let mut world = MockWorld::new();
    spawn_raid(&registry, &mut world, 1000, 0);

    for tick in 0..10_000 {
        registry.tick(&mut world, tick);
    }
    assert_eq!(registry.len(), 1, "despawn_secs=0 must never auto-expire");
    assert!(world.broadcasts.is_empty());
}

#[test]
fn despawn_horizon_removes_and_announces() {
    let registry = bound_registry();
    let mut world = MockWorld::new();
    let actor = spawn_raid(&registry, &mut world, 1000, 60);

    // One tick before the horizon: still alive
    registry.tick(&mut world, 60 * TICKS_PER_SECOND - 1);
    assert_eq!(registry.len(), 1);

    registry.tick(&mut world, 60 * TICKS_PER_SECOND);
    assert!(registry.is_empty());
    assert_eq!(world.broadcasts, vec!["groudon has despawned!"]);
    assert_eq!(world.particles.len(), 1);
    // The registry does not remove the actor itself; the host or an
    // enqueued task does. It must still exist here.
    assert!(world.actors.contains_key(&actor));
}

#[test]
fn vanished_actor_is_reaped() {
    let registry = bound_registry();
    let mut world = MockWorld::new();
    let actor = spawn_raid(&registry, &mut world, 1000, 0);

    registry.tick(&mut world, 1);
    assert_eq!(registry.len(), 1);

    world.vanish_actor(actor);
    registry.tick(&mut world, 2);
    assert!(registry.is_empty());
}

#[test]
fn remaining_time_label_updates_each_second() {
    let registry = bound_registry();
    let mut world = MockWorld::new();
    let actor = spawn_raid(&registry, &mut world, 1000, 90);

    registry.tick(&mut world, 20);
    let label = registry.with_raid(actor, |r| r.bar().snapshot().label).unwrap();
    assert_eq!(label, "groudon | Despawns in: 01:29");

    // Mid-second ticks do not rewrite the label
    registry.tick(&mut world, 30);
    let label = registry.with_raid(actor, |r| r.bar().snapshot().label).unwrap();
    assert_eq!(label, "groudon | Despawns in: 01:29");
}

#[test]
fn proximity_visibility_tracks_players() {
    let mut settings = RaidSettings::default();
    settings.after_battle_only = false;
    let registry = RaidRegistry::new();
    registry.bind(settings);

    let mut world = MockWorld::new();
    let actor = spawn_raid(&registry, &mut world, 1000, 0);
    world.add_player(10, Vec3::new(5.0, 64.0, 5.0));
    world.add_player(11, Vec3::new(500.0, 64.0, 500.0));

    registry.tick(&mut world, 100);
    assert!(registry.with_raid(actor, |r| r.bar().has_viewer(10)).unwrap());
    assert!(!registry.with_raid(actor, |r| r.bar().has_viewer(11)).unwrap());

    // Player walks away; next refresh cadence drops them
    world.players.get_mut(&10).unwrap().position = Vec3::new(1000.0, 64.0, 0.0);
    registry.tick(&mut world, 200);
    assert!(!registry.with_raid(actor, |r| r.bar().has_viewer(10)).unwrap());
}

#[test]
fn after_battle_policy_disables_proximity_subscription() {
    let registry = bound_registry(); // default: after_battle_only = true
    let mut world = MockWorld::new();
    let actor = spawn_raid(&registry, &mut world, 1000, 0);
    world.add_player(10, Vec3::new(5.0, 64.0, 5.0));

    registry.tick(&mut world, 100);
    assert!(!registry.with_raid(actor, |r| r.bar().has_viewer(10)).unwrap());

    // Battling qualifies the player and shows the bar
    registry.mark_battled(10, actor);
    assert!(registry.with_raid(actor, |r| r.bar().has_viewer(10)).unwrap());
    assert!(registry.with_raid(actor, |r| r.has_battled(10)).unwrap());
}

#[test]
fn end_and_end_all_are_idempotent() {
    let registry = bound_registry();
    registry.create(make_seed(1, 1000, 0), 0);
    registry.create(make_seed(2, 1000, 0), 0);

    assert!(registry.end(1));
    assert!(!registry.end(1), "second end is a no-op");

    assert_eq!(registry.end_all(), 1);
    assert_eq!(registry.end_all(), 0);
}

#[test]
fn end_clears_bar_subscriptions() {
    let registry = bound_registry();
    registry.create(make_seed(1, 1000, 0), 0);
    registry.mark_battled(10, 1);

    let bar = registry.with_raid(1, |r| r.bar().clone()).unwrap();
    assert_eq!(bar.viewer_count(), 1);

    registry.end(1);
    assert_eq!(bar.viewer_count(), 0);
}
