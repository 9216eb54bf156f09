//! Events emitted by the simulation for the presentation layer

use serde::{Deserialize, Serialize};

use super::combat::{AttackKind, HitResult};
use super::fighter::Side;
use super::round::RoundEndReason;

/// Something that happened during a tick or a control action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A fighter started an attack
    AttackStarted { side: Side, kind: AttackKind },

    /// An attack connected (possibly blocked)
    Hit(HitResult),

    /// The round was decided
    RoundOver {
        round: u32,
        winner: Option<Side>,
        reason: RoundEndReason,
    },

    /// A new round began after "continue"
    RoundStarted { round: u32 },

    /// A side reached the round-win threshold
    MatchOver { champion: Side, p1_rounds: u32, p2_rounds: u32 },

    /// The match was reset to its initial state
    MatchReset,

    /// World advancement was paused or resumed
    PauseToggled { paused: bool },
}
