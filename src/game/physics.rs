//! Fighter movement, attack initiation and arena constraints

use super::combat::{AttackKind, AttackStats};
use super::fighter::Fighter;
use super::input::InputSnapshot;

/// Arena width in world units
pub const ARENA_WIDTH: f32 = 800.0;
/// Floor level; `y` grows downward and never goes below this line
pub const FLOOR_Y: f32 = 360.0;
pub const FIGHTER_WIDTH: f32 = 48.0;
pub const FIGHTER_HEIGHT: f32 = 96.0;
/// Distance kept between a fighter's center and the arena walls
pub const HALF_MARGIN: f32 = FIGHTER_WIDTH / 2.0;

/// Extra push added when separating overlapping bodies
const SEPARATION_EPSILON: f32 = 0.01;

/// Movement tuning, applied once per frame
#[derive(Debug, Clone, Copy)]
pub struct MovementStats {
    /// Maximum horizontal speed (units per frame)
    pub max_speed: f32,
    /// Horizontal acceleration while a direction is held
    pub acceleration: f32,
    /// Multiplicative velocity decay when no direction is held
    pub friction: f32,
    /// Speeds below this snap to zero while decaying
    pub stop_epsilon: f32,
    /// Downward acceleration per frame
    pub gravity: f32,
    /// Vertical launch velocity (negative is up)
    pub jump_velocity: f32,
}

impl MovementStats {
    pub const STANDARD: MovementStats = MovementStats {
        max_speed: 5.0,
        acceleration: 0.8,
        friction: 0.8,
        stop_epsilon: 0.05,
        gravity: 0.6,
        jump_velocity: -12.0,
    };
}

/// Attack types in initiation priority order
const ATTACK_PRIORITY: [AttackKind; 3] =
    [AttackKind::Special, AttackKind::Heavy, AttackKind::Light];

/// Per-fighter simulation step
pub struct FighterSimulation;

impl FighterSimulation {
    /// Advance one fighter by one tick and return its next state.
    ///
    /// `now_ms` is the simulated clock used for cooldown timestamps. Facing is
    /// not touched here; the combat resolver owns it.
    pub fn step(fighter: &Fighter, intents: &InputSnapshot, delta_ms: f32, now_ms: f64) -> Fighter {
        debug_assert!(delta_ms >= 0.0, "elapsed time must not be negative");

        let stats = MovementStats::STANDARD;
        let mut next = fighter.clone();

        // Flash timers
        next.hitflash = (next.hitflash - delta_ms).max(0.0);
        next.blockflash = (next.blockflash - delta_ms).max(0.0);

        // Attack window decay; an expired attack ends before new input is read
        if next.attacking {
            next.attack_timer -= delta_ms;
            if next.attack_timer <= 0.0 {
                next.attacking = false;
                next.attack_type = None;
                next.attack_timer = 0.0;
            }
        }

        // Horizontal control; a held direction also pulls knockback speed back under the cap
        let max_speed = stats.max_speed;
        next.vx = match (intents.move_left, intents.move_right) {
            (true, false) => (next.vx - stats.acceleration).clamp(-max_speed, max_speed),
            (false, true) => (next.vx + stats.acceleration).clamp(-max_speed, max_speed),
            _ => {
                let decayed = next.vx * stats.friction;
                if decayed.abs() < stats.stop_epsilon {
                    0.0
                } else {
                    decayed
                }
            }
        };

        // Jump
        if intents.jump && next.on_ground {
            next.vy = stats.jump_velocity;
            next.on_ground = false;
        }

        // Block never overrides an attack already in progress
        next.block = intents.block && !next.attacking;

        if !next.attacking && !next.block && next.can_act {
            let chosen = ATTACK_PRIORITY
                .into_iter()
                .find(|&kind| intents.wants(kind) && next.cooldown_ready(kind, now_ms));

            if let Some(kind) = chosen {
                let attack = AttackStats::for_kind(kind);
                next.attacking = true;
                next.attack_type = Some(kind);
                next.attack_timer = attack.duration_ms;
                next.attack_connected = false;
                next.cooldowns.insert(kind, now_ms + attack.cooldown_ms);
            }
        }

        // Integrate
        next.vy += stats.gravity;
        next.x = Self::clamp_x(next.x + next.vx);
        next.y += next.vy;
        if next.y >= FLOOR_Y {
            next.y = FLOOR_Y;
            next.vy = 0.0;
            next.on_ground = true;
        } else {
            next.on_ground = false;
        }

        next
    }

    /// Keep a center position inside the arena walls
    pub fn clamp_x(x: f32) -> f32 {
        x.clamp(HALF_MARGIN, ARENA_WIDTH - HALF_MARGIN)
    }

    /// Check whether two bodies overlap horizontally
    pub fn bodies_overlap(x1: f32, x2: f32) -> bool {
        (x2 - x1).abs() < FIGHTER_WIDTH
    }

    /// Push two overlapping bodies apart symmetrically, keeping their left/right order.
    /// On equal positions the first body is treated as the left one.
    /// Returns (new_x1, new_x2).
    pub fn separate(x1: f32, x2: f32) -> (f32, f32) {
        let dist = (x2 - x1).abs();
        let overlap = FIGHTER_WIDTH - dist;

        if overlap <= 0.0 {
            return (x1, x2);
        }

        let push = overlap / 2.0 + SEPARATION_EPSILON;
        if x1 <= x2 {
            (Self::clamp_x(x1 - push), Self::clamp_x(x2 + push))
        } else {
            (Self::clamp_x(x1 + push), Self::clamp_x(x2 - push))
        }
    }
}
