use std::io::Write;

use incursion_core::{RaidSignal, SpawnParams, Vec3};

use crate::context::CliContext;

pub async fn spawn_boss(
    ctx: &CliContext,
    species: &str,
    level: u32,
    health: i64,
    scale: f32,
    damage_per_win: i64,
    despawn_secs: u64,
    position: Vec3,
) {
    let params = SpawnParams {
        species: species.to_string(),
        level,
        max_health: health,
        scale,
        damage_per_win,
        despawn_secs,
    };

    let mut world = ctx.world.lock().await;
    match ctx.service.spawn_boss(&mut *world, params, position) {
        Ok(receipt) => println!(
            "Spawned a level {} {} raid boss (raid #{}).",
            receipt.level, receipt.species, receipt.raid_id
        ),
        Err(err) => println!("Failed to spawn raid boss: {err}"),
    }
}

pub async fn despawn_all(ctx: &CliContext) {
    let count = ctx.service.despawn_all();
    if count > 0 {
        println!("Despawned {count} raid boss(es).");
    } else {
        println!("No active raid bosses found to despawn.");
    }
}

pub async fn show_status(ctx: &CliContext) {
    let registry = ctx.service.registry();
    println!("tick {}", ctx.current_tick());

    let ids = registry.raid_ids();
    if ids.is_empty() {
        println!("no active raids");
    }
    for id in ids {
        let line = registry.with_raid(id, |raid| {
            format!(
                "raid #{id}: {} lv{}  {}/{} hp  {} viewer(s)",
                raid.species,
                raid.level,
                raid.current_health(),
                raid.max_health(),
                raid.bar().viewer_count(),
            )
        });
        if let Some(line) = line {
            println!("{line}");
        }
    }

    let windows = ctx.service.rewards().views();
    if windows.is_empty() {
        println!("no open reward windows");
    }
    for view in windows {
        println!(
            "reward window: player {} {:?} {}s left ({})",
            view.player, view.phase, view.remaining_secs, view.species
        );
    }
}

pub async fn show_settings(ctx: &CliContext) {
    let settings = ctx.service.settings();
    println!("max_active_raids     = {}", settings.max_active_raids);
    println!("spawn_interval_secs  = {}", settings.spawn_interval_secs);
    println!("after_battle_only    = {}", settings.after_battle_only);
    println!("proximity_radius     = {}", settings.proximity_radius);
    println!("anticipation_secs    = {}", settings.anticipation_secs);
    println!("flee_secs            = {}", settings.flee_secs);
    println!("pulse_interval_ms    = {}", settings.pulse_interval_ms);
}

pub async fn connect_player(ctx: &CliContext, player: u64, position: Vec3) {
    ctx.world.lock().await.connect_player(player, position);
}

pub async fn disconnect_player(ctx: &CliContext, player: u64) {
    let mut world = ctx.world.lock().await;
    world.mark_disconnected(player);
    ctx.service
        .handle_signal(&mut *world, RaidSignal::PlayerDisconnected { player });
}

pub async fn join_battle(ctx: &CliContext, player: u64, raid_id: u64) {
    let mut world = ctx.world.lock().await;
    ctx.service
        .handle_signal(&mut *world, RaidSignal::BattleJoined { player, raid_id });
    println!("player {player} joined battle against raid #{raid_id}");
}

pub async fn report_victory(ctx: &CliContext, player: u64, raid_id: u64) {
    let mut world = ctx.world.lock().await;
    ctx.service
        .handle_signal(&mut *world, RaidSignal::VictoryReported { player, raid_id });
}

pub async fn catch_reward(ctx: &CliContext, player: u64) {
    let Some(actor) = ctx
        .service
        .rewards()
        .views()
        .into_iter()
        .find(|view| view.player == player)
        .and_then(|view| view.reward_actor)
    else {
        println!("player {player} has no catchable reward right now");
        return;
    };

    let mut world = ctx.world.lock().await;
    if !world.capture_actor(actor) {
        println!("reward actor #{actor} is already gone");
        return;
    }
    ctx.service
        .handle_signal(&mut *world, RaidSignal::CaptureReported { player, actor });
    println!("player {player} caught reward actor #{actor}");
}

pub async fn show_bars(ctx: &CliContext, player: u64) {
    let mut shown = 0;
    let registry = ctx.service.registry();
    for id in registry.raid_ids() {
        let snapshot = registry.with_raid(id, |raid| {
            raid.bar()
                .has_viewer(player)
                .then(|| raid.bar().snapshot())
        });
        if let Some(Some(snapshot)) = snapshot {
            println!("[{:?}] {} ({:.0}%)", snapshot.color, snapshot.label, snapshot.percent * 100.0);
            shown += 1;
        }
    }

    if let Some(bar) = ctx.service.rewards().bar_of(player) {
        let snapshot = bar.snapshot();
        if bar.has_viewer(player) {
            println!("[{:?}] {} ({:.0}%)", snapshot.color, snapshot.label, snapshot.percent * 100.0);
            shown += 1;
        }
    }

    if shown == 0 {
        println!("no bars visible to player {player}");
    }
}

pub fn exit() {
    write!(std::io::stdout(), "quitting...").expect("error exiting");
    std::io::stdout().flush().expect("error flushing stdout");
}
