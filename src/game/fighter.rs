//! Fighter state (one per side)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::combat::{AttackKind, Rect};
use super::physics::{ARENA_WIDTH, FIGHTER_HEIGHT, FIGHTER_WIDTH, FLOOR_Y};

/// Maximum (and starting) health
pub const MAX_HP: i32 = 100;

/// Which side of the duel a fighter plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    P1,
    P2,
}

/// Horizontal facing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Right,
    Left,
}

impl Facing {
    /// +1 for right, -1 for left
    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }
}

/// Authoritative state of one fighter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    pub side: Side,

    // Position and movement. `x` is the horizontal center, `y` the feet (grows downward).
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub facing: Facing,
    pub on_ground: bool,

    // Attack state
    pub attacking: bool,
    pub attack_type: Option<AttackKind>,
    /// Milliseconds left in the current attack's active + recovery window
    pub attack_timer: f32,
    /// The current swing already connected
    pub attack_connected: bool,
    /// Simulated-clock timestamp (ms) before which each attack cannot start again
    pub cooldowns: BTreeMap<AttackKind, f64>,

    pub block: bool,
    /// Reserved for stun / hit-lock states
    pub can_act: bool,

    pub hp: i32,
    pub rounds: u32,

    // Visual flash countdowns (ms)
    pub hitflash: f32,
    pub blockflash: f32,
}

impl Fighter {
    /// Fresh fighter at its side's spawn point
    pub fn new(side: Side) -> Self {
        let (x, facing) = match side {
            Side::P1 => (ARENA_WIDTH * 0.25, Facing::Right),
            Side::P2 => (ARENA_WIDTH * 0.75, Facing::Left),
        };

        Self {
            side,
            x,
            y: FLOOR_Y,
            vx: 0.0,
            vy: 0.0,
            facing,
            on_ground: true,
            attacking: false,
            attack_type: None,
            attack_timer: 0.0,
            attack_connected: false,
            cooldowns: BTreeMap::new(),
            block: false,
            can_act: true,
            hp: MAX_HP,
            rounds: 0,
            hitflash: 0.0,
            blockflash: 0.0,
        }
    }

    /// Fresh fighter for the next round, keeping the round tally
    pub fn for_next_round(&self) -> Self {
        Self {
            rounds: self.rounds,
            ..Self::new(self.side)
        }
    }

    pub fn is_ko(&self) -> bool {
        self.hp <= 0
    }

    /// Whether `kind` may start at simulated time `now_ms`
    pub fn cooldown_ready(&self, kind: AttackKind, now_ms: f64) -> bool {
        self.cooldowns
            .get(&kind)
            .map_or(true, |&ready_at| now_ms >= ready_at)
    }

    /// True while any attack type is still cooling down
    pub fn any_cooldown_active(&self, now_ms: f64) -> bool {
        self.cooldowns.values().any(|&ready_at| now_ms < ready_at)
    }

    /// Full body rectangle
    pub fn hurtbox(&self) -> Rect {
        Rect {
            left: self.x - FIGHTER_WIDTH / 2.0,
            right: self.x + FIGHTER_WIDTH / 2.0,
            top: self.y - FIGHTER_HEIGHT,
            bottom: self.y,
        }
    }

    /// Vertical center of the body
    pub fn center_y(&self) -> f32 {
        self.y - FIGHTER_HEIGHT / 2.0
    }
}
