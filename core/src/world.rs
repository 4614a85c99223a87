//! Host-world collaborator seam
//!
//! The engine never touches the simulation directly. Everything that spawns,
//! removes, or decorates world state goes through [`WorldHost`], implemented
//! by the embedding server (or by an in-memory world in the CLI and tests).
//! All operations are fire-and-forget: failures are logged by the caller and
//! never retried.

use serde::{Deserialize, Serialize};

/// Fixed simulation rate of the host tick loop.
pub const TICKS_PER_SECOND: u64 = 20;

/// Handle to a spawned actor. Stable for the actor's lifetime.
pub type ActorId = u64;

/// Handle to a connected (or recently connected) player.
pub type PlayerId = u64;

/// World position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn add(&self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn scaled(&self, factor: f64) -> Vec3 {
        Vec3::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Project onto the horizontal plane and normalize.
    ///
    /// Returns `None` for a (near-)vertical vector, where no horizontal
    /// direction exists.
    pub fn horizontal_unit(&self) -> Option<Vec3> {
        let len = (self.x * self.x + self.z * self.z).sqrt();
        if len < 1e-6 {
            return None;
        }
        Some(Vec3::new(self.x / len, 0.0, self.z / len))
    }

    /// Coordinates rendered for chat templates, e.g. `"120, 64, -35"`.
    pub fn display_coords(&self) -> String {
        format!("{:.0}, {:.0}, {:.0}", self.x, self.y, self.z)
    }
}

/// Particle bursts the engine may request from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleEffect {
    /// Small puff used when an actor despawns.
    Despawn,
    /// Large burst played when a boss falls.
    Defeat,
    /// Ambient smoke pulsed during the reward anticipation phase.
    AnticipationPulse,
    /// Celebration burst when a reward actor materializes.
    RewardSpawn,
}

/// Everything needed to materialize an actor in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorSpec {
    pub species: String,
    pub level: u32,
    pub shiny: bool,
    /// Visual scale multiplier (1.0 = normal size).
    pub scale: f32,
    /// Whether players may capture this actor. Boss actors are not
    /// capturable; reward actors are.
    pub catchable: bool,
    pub position: Vec3,
    /// Facing in degrees.
    pub yaw: f32,
}

/// Mutation and query surface of the simulation host.
///
/// Must only be called from the tick thread; background timers marshal
/// through the tick queue instead (see [`crate::sched`]).
pub trait WorldHost: Send {
    /// Spawn an immobile actor. `None` means the host rejected the spawn.
    fn spawn_actor(&mut self, spec: &ActorSpec) -> Option<ActorId>;

    fn despawn_actor(&mut self, actor: ActorId);

    /// Whether the actor is still present (not removed by external forces).
    fn actor_exists(&self, actor: ActorId) -> bool;

    fn actor_position(&self, actor: ActorId) -> Option<Vec3>;

    /// Put a fallen boss into its defeated pose (AI off, collapsed).
    fn set_defeated_pose(&mut self, actor: ActorId);

    /// Brief red hit-flash on an actor that took damage.
    fn flash_hurt(&mut self, actor: ActorId);

    fn emit_particles(&mut self, effect: ParticleEffect, position: Vec3);

    /// Message to every connected player.
    fn broadcast(&mut self, message: &str);

    /// Message to a single player. No-op if offline.
    fn send_message(&mut self, player: PlayerId, message: &str);

    fn player_online(&self, player: PlayerId) -> bool;

    fn player_position(&self, player: PlayerId) -> Option<Vec3>;

    /// Unit-length look direction of the player.
    fn player_facing(&self, player: PlayerId) -> Option<Vec3>;

    fn player_yaw(&self, player: PlayerId) -> Option<f32>;

    /// Players within `radius` of `position`.
    fn players_within(&self, position: Vec3, radius: f64) -> Vec<PlayerId>;
}

#[cfg(test)]
pub mod mock {
    //! Recording world used by the engine tests.

    use super::*;
    use hashbrown::HashMap;

    #[derive(Debug, Clone)]
    pub struct MockPlayer {
        pub position: Vec3,
        pub facing: Vec3,
        pub yaw: f32,
        pub online: bool,
    }

    #[derive(Debug, Default)]
    pub struct MockWorld {
        next_actor: ActorId,
        pub actors: HashMap<ActorId, ActorSpec>,
        pub players: HashMap<PlayerId, MockPlayer>,
        pub broadcasts: Vec<String>,
        pub messages: Vec<(PlayerId, String)>,
        pub particles: Vec<(ParticleEffect, Vec3)>,
        pub flashes: Vec<ActorId>,
        pub defeated_poses: Vec<ActorId>,
        pub despawned: Vec<ActorId>,
        /// When true, `spawn_actor` refuses every request.
        pub reject_spawns: bool,
    }

    impl MockWorld {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_player(&mut self, player: PlayerId, position: Vec3) {
            self.players.insert(
                player,
                MockPlayer {
                    position,
                    facing: Vec3::new(0.0, 0.0, 1.0),
                    yaw: 0.0,
                    online: true,
                },
            );
        }

        pub fn disconnect_player(&mut self, player: PlayerId) {
            if let Some(p) = self.players.get_mut(&player) {
                p.online = false;
            }
        }

        /// Remove an actor behind the engine's back (external vanish).
        pub fn vanish_actor(&mut self, actor: ActorId) {
            self.actors.remove(&actor);
        }

        pub fn spawned_count(&self) -> usize {
            self.actors.len()
        }
    }

    impl WorldHost for MockWorld {
        fn spawn_actor(&mut self, spec: &ActorSpec) -> Option<ActorId> {
            if self.reject_spawns {
                return None;
            }
            self.next_actor += 1;
            let id = self.next_actor;
            self.actors.insert(id, spec.clone());
            Some(id)
        }

        fn despawn_actor(&mut self, actor: ActorId) {
            self.actors.remove(&actor);
            self.despawned.push(actor);
        }

        fn actor_exists(&self, actor: ActorId) -> bool {
            self.actors.contains_key(&actor)
        }

        fn actor_position(&self, actor: ActorId) -> Option<Vec3> {
            self.actors.get(&actor).map(|spec| spec.position)
        }

        fn set_defeated_pose(&mut self, actor: ActorId) {
            self.defeated_poses.push(actor);
        }

        fn flash_hurt(&mut self, actor: ActorId) {
            self.flashes.push(actor);
        }

        fn emit_particles(&mut self, effect: ParticleEffect, position: Vec3) {
            self.particles.push((effect, position));
        }

        fn broadcast(&mut self, message: &str) {
            self.broadcasts.push(message.to_string());
        }

        fn send_message(&mut self, player: PlayerId, message: &str) {
            self.messages.push((player, message.to_string()));
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
}
