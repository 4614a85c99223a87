//! Inbound collaborator events
//!
//! Signals emitted by the host's combat, capture, and connection
//! collaborators. These represent "interesting things that happened" at a
//! higher level than raw world events; the [`crate::service::RaidService`]
//! routes them on the tick thread.

use crate::world::{ActorId, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaidSignal {
    /// A participant defeated a battle clone of the boss. The engine
    /// applies the raid's configured damage-per-victory.
    VictoryReported {
        player: PlayerId,
        raid_id: ActorId,
    },

    /// A participant entered battle with the boss (qualifies them for the
    /// after-battle visibility policy).
    BattleJoined {
        player: PlayerId,
        raid_id: ActorId,
    },

    /// A participant captured an actor; only relevant when it is their
    /// reward actor.
    CaptureReported {
        player: PlayerId,
        actor: ActorId,
    },

    /// A participant disconnected. Must be delivered synchronously from
    /// the host's disconnect hook.
    PlayerDisconnected { player: PlayerId },
}
