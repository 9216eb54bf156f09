//! Computer-controlled opponent.
//!
//! Decisions are re-rolled every frame from the current fighter states; the only
//! memory carried between frames is what already lives on the fighters
//! (cooldowns and attack state). Randomness comes from an injected RNG so a
//! seeded controller replays identically.

use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::fighter::Fighter;
use super::input::InputSnapshot;

/// Beyond this distance the AI may close in
const FAR_DISTANCE: f32 = 120.0;
/// Inside this distance the AI backs off
const NEAR_DISTANCE: f32 = 72.0;
/// Chance per airborne frame to press jump
const AIR_JUMP_CHANCE: f64 = 0.02;
/// Incoming attacks inside this distance may be blocked
const BLOCK_DISTANCE: f32 = 100.0;

const LIGHT_DISTANCE: f32 = 60.0;
const LIGHT_CHANCE: f64 = 0.6;
const HEAVY_DISTANCE: f32 = 80.0;
const HEAVY_CHANCE: f64 = 0.4;
const SPECIAL_DISTANCE: f32 = 110.0;

/// Named difficulty presets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

impl FromStr for Difficulty {
    type Err = DifficultyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(DifficultyParseError(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown difficulty: {0}")]
pub struct DifficultyParseError(pub String);

/// Tuning for one difficulty preset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Reaction time range in ms. Informational only: decisions are per-frame rolls.
    pub reaction_ms: (u32, u32),
    pub block_chance: f64,
    pub special_chance: f64,
    pub aggression: f64,
}

impl DifficultyProfile {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                reaction_ms: (400, 700),
                block_chance: 0.15,
                special_chance: 0.05,
                aggression: 0.35,
            },
            Difficulty::Normal => Self {
                reaction_ms: (250, 450),
                block_chance: 0.35,
                special_chance: 0.12,
                aggression: 0.6,
            },
            Difficulty::Hard => Self {
                reaction_ms: (120, 250),
                block_chance: 0.6,
                special_chance: 0.22,
                aggression: 0.85,
            },
        }
    }
}

/// Produces intents for a computer-controlled fighter
#[derive(Debug, Clone)]
pub struct AiController<R = ChaCha8Rng> {
    difficulty: Difficulty,
    profile: DifficultyProfile,
    rng: R,
}

impl AiController<ChaCha8Rng> {
    /// Controller with a reproducible random stream
    pub fn seeded(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_rng(difficulty, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> AiController<R> {
    pub fn with_rng(difficulty: Difficulty, rng: R) -> Self {
        Self {
            difficulty,
            profile: DifficultyProfile::for_difficulty(difficulty),
            rng,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    /// Decide this frame's intents for `me` against `opponent`.
    ///
    /// `now_ms` is the simulated clock, used to read cooldowns. Neither fighter is
    /// modified; everything flows back through the returned snapshot.
    pub fn decide(&mut self, me: &Fighter, opponent: &Fighter, now_ms: f64) -> InputSnapshot {
        let profile = self.profile;
        let mut intents = InputSnapshot::idle();

        let offset = opponent.x - me.x;
        let distance = offset.abs();
        let toward_right = offset >= 0.0;

        // Movement
        if distance > FAR_DISTANCE && self.rng.gen_bool(profile.aggression) {
            intents.move_right = toward_right;
            intents.move_left = !toward_right;
        } else if distance < NEAR_DISTANCE {
            intents.move_right = !toward_right;
            intents.move_left = toward_right;
        }

        if !me.on_ground && self.rng.gen_bool(AIR_JUMP_CHANCE) {
            intents.jump = true;
        }

        if opponent.attacking
            && distance < BLOCK_DISTANCE
            && self.rng.gen_bool(profile.block_chance)
        {
            intents.block = true;
        }

        if !me.attacking && !me.any_cooldown_active(now_ms) {
            if distance < LIGHT_DISTANCE {
                intents.light = self.rng.gen_bool(LIGHT_CHANCE);
            } else if distance < HEAVY_DISTANCE {
                intents.heavy = self.rng.gen_bool(HEAVY_CHANCE);
            } else if distance < SPECIAL_DISTANCE {
                intents.special = self.rng.gen_bool(profile.special_chance);
            }
        }

        intents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::combat::AttackKind;
    use crate::game::fighter::Side;
    use rand::rngs::mock::StepRng;

    /// Every Bernoulli draw succeeds
    fn always() -> StepRng {
        StepRng::new(0, 0)
    }

    /// Every Bernoulli draw fails (except certain events)
    fn never() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn pair(me_x: f32, opp_x: f32) -> (Fighter, Fighter) {
        let mut me = Fighter::new(Side::P2);
        me.x = me_x;
        let mut opp = Fighter::new(Side::P1);
        opp.x = opp_x;
        (me, opp)
    }

    #[test]
    fn approaches_from_far_when_aggressive() {
        let mut ai = AiController::with_rng(Difficulty::Hard, always());
        let (me, opp) = pair(600.0, 200.0);
        let intents = ai.decide(&me, &opp, 0.0);
        assert!(intents.move_left);
        assert!(!intents.move_right);
    }

    #[test]
    fn holds_position_when_aggression_roll_fails() {
        let mut ai = AiController::with_rng(Difficulty::Hard, never());
        let (me, opp) = pair(600.0, 200.0);
        assert_eq!(ai.decide(&me, &opp, 0.0), InputSnapshot::idle());
    }

    #[test]
    fn backs_off_when_too_close_and_attacks() {
        let mut ai = AiController::with_rng(Difficulty::Normal, always());
        let (me, opp) = pair(250.0, 200.0);
        let intents = ai.decide(&me, &opp, 0.0);
        assert!(intents.move_right);
        assert!(intents.light);
        assert!(!intents.heavy && !intents.special);
    }

    #[test]
    fn attack_choice_follows_distance_bands() {
        let mut ai = AiController::with_rng(Difficulty::Normal, always());
        let (me, opp) = pair(270.0, 200.0);
        let intents = ai.decide(&me, &opp, 0.0);
        assert!(intents.heavy && !intents.light);

        let (me, opp) = pair(300.0, 200.0);
        let intents = ai.decide(&me, &opp, 0.0);
        assert!(intents.special && !intents.heavy);

        let (me, opp) = pair(315.0, 200.0);
        let intents = ai.decide(&me, &opp, 0.0);
        assert!(!intents.special && !intents.heavy && !intents.light);
    }

    #[test]
    fn no_attack_while_any_cooldown_runs() {
        let mut ai = AiController::with_rng(Difficulty::Normal, always());
        let (mut me, opp) = pair(250.0, 200.0);
        me.cooldowns.insert(AttackKind::Special, 1_000.0);
        let intents = ai.decide(&me, &opp, 500.0);
        assert!(!intents.light);
        let intents = ai.decide(&me, &opp, 1_000.0);
        assert!(intents.light);
    }

    #[test]
    fn blocks_incoming_attacks_in_range() {
        let mut ai = AiController::with_rng(Difficulty::Hard, always());
        let (me, mut opp) = pair(290.0, 200.0);
        opp.attacking = true;
        opp.attack_type = Some(AttackKind::Heavy);
        opp.attack_timer = 100.0;
        assert!(ai.decide(&me, &opp, 0.0).block);

        let mut cautious = AiController::with_rng(Difficulty::Hard, never());
        assert!(!cautious.decide(&me, &opp, 0.0).block);
    }

    #[test]
    fn airborne_dodge_jump() {
        let mut ai = AiController::with_rng(Difficulty::Easy, always());
        let (mut me, opp) = pair(400.0, 300.0);
        assert!(!ai.decide(&me, &opp, 0.0).jump);
        me.on_ground = false;
        assert!(ai.decide(&me, &opp, 0.0).jump);
    }

    #[test]
    fn seeded_controllers_agree() {
        let (me, opp) = pair(330.0, 200.0);
        let mut a = AiController::seeded(Difficulty::Normal, 42);
        let mut b = AiController::seeded(Difficulty::Normal, 42);
        for _ in 0..200 {
            assert_eq!(a.decide(&me, &opp, 0.0), b.decide(&me, &opp, 0.0));
        }
    }

    #[test]
    fn difficulty_names_parse() {
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(Difficulty::Easy.to_string(), "easy");
        assert!("brutal".parse::<Difficulty>().is_err());
    }

    #[test]
    fn default_difficulty_is_normal() {
        assert_eq!(Difficulty::default(), Difficulty::Normal);
    }
}
