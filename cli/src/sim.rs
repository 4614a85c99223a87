//! In-memory demo world
//!
//! A small [`WorldHost`] implementation so the admin console can run the
//! engine without a real simulation server. Broadcasts and player messages
//! go to stdout; actors and players live in plain maps.

use std::collections::HashMap;

use incursion_core::{ActorId, ActorSpec, ParticleEffect, PlayerId, Vec3, WorldHost};

#[derive(Debug, Clone)]
struct SimPlayer {
    position: Vec3,
    facing: Vec3,
    yaw: f32,
    online: bool,
}

/// Console-backed world: every side effect is printed with a timestamp.
#[derive(Debug, Default)]
pub struct SimWorld {
    next_actor: ActorId,
    actors: HashMap<ActorId, ActorSpec>,
    players: HashMap<PlayerId, SimPlayer>,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_player(&mut self, player: PlayerId, position: Vec3) {
        self.players.insert(
            player,
            SimPlayer {
                position,
                facing: Vec3::new(0.0, 0.0, 1.0),
                yaw: 0.0,
                online: true,
            },
        );
        stamp(&format!("player {player} connected at {}", position.display_coords()));
    }

    pub fn mark_disconnected(&mut self, player: PlayerId) {
        if let Some(p) = self.players.get_mut(&player) {
            p.online = false;
        }
        stamp(&format!("player {player} disconnected"));
    }

    /// Simulate a successful capture: the actor leaves the world.
    pub fn capture_actor(&mut self, actor: ActorId) -> bool {
        self.actors.remove(&actor).is_some()
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }
}

fn stamp(message: &str) {
    let now = chrono::Local::now().format("%H:%M:%S");
    println!("[{now}] {message}");
}

impl WorldHost for SimWorld {
    fn spawn_actor(&mut self, spec: &ActorSpec) -> Option<ActorId> {
        self.next_actor += 1;
        let id = self.next_actor;
        self.actors.insert(id, spec.clone());
        stamp(&format!(
            "spawned actor #{id}: {} lv{} at {}",
            spec.species,
            spec.level,
            spec.position.display_coords()
        ));
        Some(id)
    }

    fn despawn_actor(&mut self, actor: ActorId) {
        if let Some(spec) = self.actors.remove(&actor) {
            stamp(&format!("despawned actor #{actor} ({})", spec.species));
        }
    }

    fn actor_exists(&self, actor: ActorId) -> bool {
        self.actors.contains_key(&actor)
    }

    fn actor_position(&self, actor: ActorId) -> Option<Vec3> {
        self.actors.get(&actor).map(|spec| spec.position)
    }

    fn set_defeated_pose(&mut self, actor: ActorId) {
        stamp(&format!("actor #{actor} collapses"));
    }

    fn flash_hurt(&mut self, actor: ActorId) {
        stamp(&format!("actor #{actor} flashes red"));
    }

    fn emit_particles(&mut self, effect: ParticleEffect, position: Vec3) {
        stamp(&format!("particles {effect:?} at {}", position.display_coords()));
    }

    fn broadcast(&mut self, message: &str) {
        stamp(&format!("[broadcast] {message}"));
    }

    fn send_message(&mut self, player: PlayerId, message: &str) {
        if self.player_online(player) {
            stamp(&format!("[to {player}] {message}"));
        }
    }

    fn player_online(&self, player: PlayerId) -> bool {
        self.players.get(&player).is_some_and(|p| p.online)
    }

    fn player_position(&self, player: PlayerId) -> Option<Vec3> {
        self.players
            .get(&player)
            .filter(|p| p.online)
            .map(|p| p.position)
    }

    fn player_facing(&self, player: PlayerId) -> Option<Vec3> {
        self.players
            .get(&player)
            .filter(|p| p.online)
            .map(|p| p.facing)
    }

    fn player_yaw(&self, player: PlayerId) -> Option<f32> {
        self.players.get(&player).filter(|p| p.online).map(|p| p.yaw)
    }

    fn players_within(&self, position: Vec3, radius: f64) -> Vec<PlayerId> {
        let r2 = radius * radius;
        self.players
            .iter()
            .filter(|(_, p)| p.online)
            .filter(|(_, p)| {
                let dx = p.position.x - position.x;
                let dy = p.position.y - position.y;
                let dz = p.position.z - position.z;
                dx * dx + dy * dy + dz * dz <= r2
            })
            .map(|(&id, _)| id)
            .collect()
    }
}
