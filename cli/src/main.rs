use clap::{Parser, Subcommand};
use incursion_cli::commands;
use incursion_cli::readline;
use incursion_cli::CliContext;
use incursion_core::Vec3;
use std::io::Write;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let ctx = CliContext::new();

    // Drive the simulation at the fixed tick rate
    let handle = ctx.start_tick_loop();
    ctx.tasks.lock().await.tick_loop = Some(handle);

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    ctx.tasks.lock().await.abort_all();
    Ok(())
}

#[derive(Parser)]
#[command(version, about = "raid admin console")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Spawn a raid boss with explicit parameters
    Spawn {
        species: String,
        level: u32,
        health: i64,
        scale: f32,
        damage_per_win: i64,
        /// 0 = never despawns
        despawn_secs: u64,
        x: f64,
        y: f64,
        z: f64,
    },
    /// Despawn all active raid bosses
    Despawn,
    /// Show live raids and reward windows
    Status,
    /// Show the loaded settings
    Config,
    /// Connect a simulated player
    Connect { player: u64, x: f64, y: f64, z: f64 },
    /// Disconnect a simulated player (fires the disconnect hook)
    Disconnect { player: u64 },
    /// Report a player joining battle with a raid boss
    Join { player: u64, raid: u64 },
    /// Report a victory against a raid boss clone
    Victory { player: u64, raid: u64 },
    /// Capture the player's catchable reward actor
    Catch { player: u64 },
    /// Show the bars currently visible to a player
    Bars { player: u64 },
    Exit,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "incursion".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Spawn {
            species,
            level,
            health,
            scale,
            damage_per_win,
            despawn_secs,
            x,
            y,
            z,
        }) => {
            commands::spawn_boss(
                ctx,
                species,
                *level,
                *health,
                *scale,
                *damage_per_win,
                *despawn_secs,
                Vec3::new(*x, *y, *z),
            )
            .await
        }
        Some(Commands::Despawn) => commands::despawn_all(ctx).await,
        Some(Commands::Status) => commands::show_status(ctx).await,
        Some(Commands::Config) => commands::show_settings(ctx).await,
        Some(Commands::Connect { player, x, y, z }) => {
            commands::connect_player(ctx, *player, Vec3::new(*x, *y, *z)).await
        }
        Some(Commands::Disconnect { player }) => commands::disconnect_player(ctx, *player).await,
        Some(Commands::Join { player, raid }) => commands::join_battle(ctx, *player, *raid).await,
        Some(Commands::Victory { player, raid }) => {
            commands::report_victory(ctx, *player, *raid).await
        }
        Some(Commands::Catch { player }) => commands::catch_reward(ctx, *player).await,
        Some(Commands::Bars { player }) => commands::show_bars(ctx, *player).await,
        Some(Commands::Exit) => {
            commands::exit();
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
