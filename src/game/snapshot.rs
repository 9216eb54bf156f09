//! Read-only views of the world for the presentation layer

use serde::{Deserialize, Serialize};

use super::combat::AttackKind;
use super::fighter::{Facing, Fighter, Side};
use super::round::RoundPhase;
use super::world::World;

/// What a renderer needs to draw one fighter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterSnapshot {
    pub side: Side,
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    pub hp: i32,
    pub rounds: u32,
    pub attacking: Option<AttackKind>,
    pub blocking: bool,
    pub airborne: bool,
    pub hit_flash: bool,
    pub block_flash: bool,
}

impl From<&Fighter> for FighterSnapshot {
    fn from(f: &Fighter) -> Self {
        Self {
            side: f.side,
            x: f.x,
            y: f.y,
            facing: f.facing,
            hp: f.hp,
            rounds: f.rounds,
            attacking: if f.attacking { f.attack_type } else { None },
            blocking: f.block,
            airborne: !f.on_ground,
            hit_flash: f.hitflash > 0.0,
            block_flash: f.blockflash > 0.0,
        }
    }
}

/// Whole-world view for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub round: u32,
    /// Whole seconds shown on the round clock
    pub timer_display: u32,
    pub phase: RoundPhase,
    pub winner: Option<Side>,
    pub match_winner: Option<Side>,
    pub match_point: bool,
    pub paused: bool,
    pub fighters: [FighterSnapshot; 2],
}

impl From<&World> for WorldSnapshot {
    fn from(world: &World) -> Self {
        Self {
            tick: world.tick,
            round: world.round.round,
            timer_display: world.round.timer.ceil() as u32,
            phase: world.phase(),
            winner: world.round.winner,
            match_winner: world.round.match_winner,
            match_point: world.match_point(),
            paused: world.paused,
            fighters: [
                FighterSnapshot::from(&world.p1),
                FighterSnapshot::from(&world.p2),
            ],
        }
    }
}

/// Decides which frames get a published snapshot
pub struct SnapshotBuilder {
    /// Frames since last snapshot
    frames_since_snapshot: u32,
    /// Snapshot interval in frames
    snapshot_interval: u32,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        let snapshot_interval = snapshot_interval.max(1);
        Self {
            frames_since_snapshot: 0,
            snapshot_interval,
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.frames_since_snapshot += 1;
        if self.frames_since_snapshot >= self.snapshot_interval {
            self.frames_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force snapshot on next check (round/match transitions)
    pub fn force_next(&mut self) {
        self.frames_since_snapshot = self.snapshot_interval;
    }

    pub fn build(&self, world: &World) -> WorldSnapshot {
        WorldSnapshot::from(world)
    }
}
