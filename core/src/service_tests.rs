//! End-to-end service tests
//!
//! Exercise the full defeat → reward flow and the scheduled spawn gates
//! through the same entry points the host uses.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::boss::{BossDefinition, SpawnPoint};
use crate::config::RaidSettings;
use crate::reward::RewardPhaseKind;
use crate::service::{RaidService, SpawnError, SpawnParams};
use crate::signal::RaidSignal;
use crate::world::mock::MockWorld;
use crate::world::{TICKS_PER_SECOND, Vec3, WorldHost};

fn make_roster() -> Vec<BossDefinition> {
    vec![BossDefinition {
        species: "pikachu".to_string(),
        level: 50,
        shiny: false,
        max_health: 10_000,
        scale: 2.0,
        spawn_weight: 1.0,
        damage_per_win: 500,
        despawn_secs: 1800,
        spawn_points: vec![SpawnPoint { x: 0.0, y: 64.0, z: 0.0 }],
    }]
}

fn make_service() -> RaidService {
    RaidService::with_rng(
        RaidSettings::default(),
        make_roster(),
        StdRng::seed_from_u64(7),
    )
}

fn make_world() -> MockWorld {
    let mut world = MockWorld::new();
    world.add_player(10, Vec3::new(1.0, 64.0, 1.0));
    world
}

#[tokio::test(start_paused = true)]
async fn admin_spawn_registers_a_raid() {
    let service = make_service();
    let mut world = make_world();

    let receipt = service
        .spawn_boss(
            &mut world,
            SpawnParams {
                species: "mewtwo".to_string(),
                level: 90,
                max_health: 20_000,
                scale: 1.5,
                damage_per_win: 1000,
                despawn_secs: 0,
            },
            Vec3::new(10.0, 70.0, -10.0),
        )
        .unwrap();

    assert_eq!(receipt.species, "mewtwo");
    assert!(service.registry().contains(receipt.raid_id));
    let spec = world.actors.get(&receipt.raid_id).unwrap();
    assert!(!spec.catchable, "boss actors are not capturable");
    assert_eq!(spec.scale, 1.5);
}

#[tokio::test(start_paused = true)]
async fn twenty_victories_defeat_and_open_a_window() {
    let service = make_service();
    let mut world = make_world();

    let receipt = service.attempt_scheduled_spawn(&mut world).unwrap();
    let raid_id = receipt.raid_id;

    // 19 victories weaken; each flashes the boss
    for _ in 0..19 {
        service.handle_signal(
            &mut world,
            RaidSignal::VictoryReported { player: 10, raid_id },
        );
    }
    assert_eq!(world.flashes.len(), 19);
    assert!(service.registry().contains(raid_id));
    assert!(!service.rewards().any_window_open());

    // 20th defeats: raid ends, reward window opens, corpse poses
    service.handle_signal(
        &mut world,
        RaidSignal::VictoryReported { player: 10, raid_id },
    );
    assert!(!service.registry().contains(raid_id));
    assert_eq!(service.rewards().phase_of(10), Some(RewardPhaseKind::Anticipation));
    assert_eq!(world.defeated_poses, vec![raid_id]);
    assert!(
        world
            .messages
            .iter()
            .any(|(p, m)| *p == 10 && m.contains("defeated"))
    );

    // 21st is a no-op: no duplicate defeat, no second window
    service.handle_signal(
        &mut world,
        RaidSignal::VictoryReported { player: 10, raid_id },
    );
    assert_eq!(service.rewards().open_window_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn scheduled_spawn_fires_on_cadence_and_broadcasts() {
    let service = make_service();
    let mut world = make_world();

    // Interval is 30s; the tick just before the cadence does nothing
    let interval_ticks = 30 * TICKS_PER_SECOND;
    service.on_tick(&mut world, interval_ticks - 1);
    assert!(service.registry().is_empty());

    service.on_tick(&mut world, interval_ticks);
    assert_eq!(service.registry().len(), 1);
    assert_eq!(
        world.broadcasts,
        vec![
            "A new Raid Boss has appeared!",
            "A wild pikachu has spawned at 0, 64, 0."
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn scheduled_spawn_respects_the_active_cap() {
    let service = make_service();
    let mut world = make_world();

    service.attempt_scheduled_spawn(&mut world).unwrap();
    assert!(matches!(
        service.attempt_scheduled_spawn(&mut world),
        Err(SpawnError::MaxActiveRaids(1))
    ));
}

#[tokio::test(start_paused = true)]
async fn open_reward_window_suppresses_spawns_process_wide() {
    let service = make_service();
    let mut world = make_world();

    let receipt = service.attempt_scheduled_spawn(&mut world).unwrap();
    for _ in 0..20 {
        service.handle_signal(
            &mut world,
            RaidSignal::VictoryReported { player: 10, raid_id: receipt.raid_id },
        );
    }
    assert!(service.rewards().any_window_open());

    // Registry is empty again, but the gate still holds
    assert!(service.registry().is_empty());
    assert!(matches!(
        service.attempt_scheduled_spawn(&mut world),
        Err(SpawnError::RewardWindowOpen)
    ));
}

#[tokio::test(start_paused = true)]
async fn disconnect_signal_cleans_raid_and_reward_state() {
    let service = make_service();
    let mut world = make_world();

    let receipt = service.attempt_scheduled_spawn(&mut world).unwrap();
    service.handle_signal(
        &mut world,
        RaidSignal::BattleJoined { player: 10, raid_id: receipt.raid_id },
    );
    let raid_bar = service
        .registry()
        .with_raid(receipt.raid_id, |r| r.bar().clone())
        .unwrap();
    assert!(raid_bar.has_viewer(10));

    // Defeat, then drop the player mid-anticipation
    for _ in 0..20 {
        service.handle_signal(
            &mut world,
            RaidSignal::VictoryReported { player: 10, raid_id: receipt.raid_id },
        );
    }
    let reward_bar = service.rewards().bar_of(10).unwrap();

    world.disconnect_player(10);
    service.handle_signal(&mut world, RaidSignal::PlayerDisconnected { player: 10 });

    assert!(!raid_bar.has_viewer(10));
    assert!(!reward_bar.has_viewer(10));
    assert!(!service.rewards().any_window_open());
}

#[tokio::test(start_paused = true)]
async fn victory_against_unknown_raid_is_a_noop() {
    let service = make_service();
    let mut world = make_world();

    service.handle_signal(
        &mut world,
        RaidSignal::VictoryReported { player: 10, raid_id: 404 },
    );
    assert!(world.flashes.is_empty());
    assert!(world.messages.is_empty());
}

#[tokio::test(start_paused = true)]
async fn corpse_despawns_after_the_anticipation_period() {
    let service = make_service();
    let mut world = make_world();

    let receipt = service.attempt_scheduled_spawn(&mut world).unwrap();
    for _ in 0..20 {
        service.handle_signal(
            &mut world,
            RaidSignal::VictoryReported { player: 10, raid_id: receipt.raid_id },
        );
    }
    assert!(world.actor_exists(receipt.raid_id));

    // anticipation (15s) + 1s buffer elapses on the wall clock
    tokio::time::sleep(std::time::Duration::from_secs(17)).await;

    // The one-shot only enqueued work; the world changes on the next tick
    assert!(world.actor_exists(receipt.raid_id));
    service.on_tick(&mut world, 1);
    assert!(!world.actor_exists(receipt.raid_id));
    assert!(world.despawned.contains(&receipt.raid_id));
}

#[tokio::test(start_paused = true)]
async fn capture_signal_resolves_the_window() {
    let service = make_service();
    let mut world = make_world();

    let receipt = service.attempt_scheduled_spawn(&mut world).unwrap();
    for _ in 0..20 {
        service.handle_signal(
            &mut world,
            RaidSignal::VictoryReported { player: 10, raid_id: receipt.raid_id },
        );
    }

    // Walk the window into Catchable on the wall clock
    tokio::time::sleep(std::time::Duration::from_secs(16)).await;
    service.on_tick(&mut world, 1);
    assert_eq!(service.rewards().phase_of(10), Some(RewardPhaseKind::Catchable));

    let actor = service.rewards().views()[0].reward_actor.unwrap();
    service.handle_signal(&mut world, RaidSignal::CaptureReported { player: 10, actor });
    assert!(!service.rewards().any_window_open());
}
