//! Match driver and frame loop

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::util::time::{frame_period, unix_millis, Timer};

use super::ai::{AiController, Difficulty};
use super::events::GameEvent;
use super::fighter::Side;
use super::input::{InputSnapshot, TickInputs};
use super::round::RoundPhase;
use super::snapshot::{SnapshotBuilder, WorldSnapshot};
use super::world::{Advance, IntentSource, World};

/// Who plays P2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "difficulty", rename_all = "snake_case")]
pub enum Opponent {
    /// Local versus: P2 intents come from the input collector
    Human,
    /// Computer opponent
    Cpu(Difficulty),
}

/// Tick driver errors
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    #[error("Elapsed time must be finite and non-negative, got {0} ms")]
    NegativeElapsed(f32),
}

/// Per-side statistics for the current match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideStats {
    pub attacks_thrown: u32,
    pub hits_landed: u32,
    pub hits_blocked: u32,
    pub damage_dealt: u32,
    pub damage_taken: u32,
    pub rounds_won: u32,
}

/// Match summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStats {
    pub match_id: Uuid,
    pub seed: u64,
    pub opponent: Opponent,
    pub champion: Option<Side>,
    pub rounds_played: u32,
    /// Simulated match time
    pub sim_duration_ms: u64,
    pub started_at_ms: u64,
    pub p1: SideStats,
    pub p2: SideStats,
}

/// Frame loop settings
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub frame_tps: u32,
    pub snapshot_tps: u32,
    /// Stop after this many frames
    pub max_frames: Option<u64>,
    /// Wall-clock safety cap
    pub max_duration: Duration,
    /// Press "continue" automatically when a round ends
    pub auto_continue: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frame_tps: crate::util::time::DEFAULT_FRAME_TPS,
            snapshot_tps: crate::util::time::DEFAULT_SNAPSHOT_TPS,
            max_frames: None,
            max_duration: Duration::from_secs(600),
            auto_continue: true,
        }
    }
}

/// A running duel: the world plus everything around it that is not pure state
pub struct GameMatch {
    id: Uuid,
    seed: u64,
    opponent: Opponent,
    world: World,
    cpu: Option<AiController>,
    p1_stats: SideStats,
    p2_stats: SideStats,
    snapshot_builder: SnapshotBuilder,
    started_at_ms: u64,
}

impl GameMatch {
    /// Create a new match; `seed` drives the CPU opponent's decisions
    pub fn new(opponent: Opponent, seed: u64) -> Self {
        let cpu = match opponent {
            Opponent::Cpu(difficulty) => Some(AiController::seeded(difficulty, seed)),
            Opponent::Human => None,
        };

        Self {
            id: Uuid::new_v4(),
            seed,
            opponent,
            world: World::new(),
            cpu,
            p1_stats: SideStats::default(),
            p2_stats: SideStats::default(),
            snapshot_builder: SnapshotBuilder::new(1),
            started_at_ms: unix_millis(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        self.snapshot_builder.build(&self.world)
    }

    /// Advance one frame. Rejects negative or non-finite elapsed time before it
    /// reaches the simulation.
    pub fn tick(
        &mut self,
        elapsed_ms: f32,
        inputs: &TickInputs,
    ) -> Result<Vec<GameEvent>, TickError> {
        if !elapsed_ms.is_finite() || elapsed_ms < 0.0 {
            warn!(match_id = %self.id, elapsed_ms, "Rejected frame with invalid elapsed time");
            return Err(TickError::NegativeElapsed(elapsed_ms));
        }

        let cpu = self.cpu.as_mut().map(|ai| ai as &mut dyn IntentSource);
        let step = self.world.advance(elapsed_ms, inputs, cpu);
        Ok(self.apply(step))
    }

    /// "Continue" after a round ends
    pub fn continue_round(&mut self) -> Vec<GameEvent> {
        let step = self.world.continue_round();
        self.apply(step)
    }

    /// Start the match over from any state
    pub fn reset_match(&mut self) -> Vec<GameEvent> {
        let step = self.world.reset_match();
        self.apply(step)
    }

    pub fn toggle_pause(&mut self) -> Vec<GameEvent> {
        let step = self.world.toggle_pause();
        self.apply(step)
    }

    fn apply(&mut self, step: Advance) -> Vec<GameEvent> {
        self.world = step.world;
        for event in &step.events {
            self.record(event);
        }
        step.events
    }

    fn side_stats(&mut self, side: Side) -> &mut SideStats {
        match side {
            Side::P1 => &mut self.p1_stats,
            Side::P2 => &mut self.p2_stats,
        }
    }

    /// Update stats and log a single event
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::AttackStarted { side, kind } => {
                self.side_stats(*side).attacks_thrown += 1;
                debug!(match_id = %self.id, side = ?side, kind = ?kind, "Attack started");
            }
            GameEvent::Hit(hit) => {
                let damage = hit.damage.max(0) as u32;
                let attacker = self.side_stats(hit.attacker);
                attacker.hits_landed += 1;
                attacker.damage_dealt += damage;

                let defender = self.side_stats(hit.defender);
                defender.damage_taken += damage;
                if hit.blocked {
                    defender.hits_blocked += 1;
                }

                debug!(
                    match_id = %self.id,
                    attacker = ?hit.attacker,
                    kind = ?hit.kind,
                    damage = hit.damage,
                    blocked = hit.blocked,
                    defender_hp = hit.defender_hp,
                    "Hit landed"
                );
            }
            GameEvent::RoundOver { round, winner, reason } => {
                self.snapshot_builder.force_next();
                info!(
                    match_id = %self.id,
                    round,
                    winner = ?winner,
                    reason = ?reason,
                    p1_hp = self.world.p1.hp,
                    p2_hp = self.world.p2.hp,
                    "Round over"
                );
            }
            GameEvent::RoundStarted { round } => {
                self.snapshot_builder.force_next();
                info!(
                    match_id = %self.id,
                    round,
                    match_point = self.world.match_point(),
                    "Round started"
                );
            }
            GameEvent::MatchOver { champion, p1_rounds, p2_rounds } => {
                self.snapshot_builder.force_next();
                info!(
                    match_id = %self.id,
                    champion = ?champion,
                    p1_rounds,
                    p2_rounds,
                    "Match over"
                );
            }
            GameEvent::MatchReset => {
                self.p1_stats = SideStats::default();
                self.p2_stats = SideStats::default();
                self.started_at_ms = unix_millis();
                info!(match_id = %self.id, "Match reset");
            }
            GameEvent::PauseToggled { paused } => {
                info!(match_id = %self.id, paused, "Pause toggled");
            }
        }
    }

    /// Build match stats
    pub fn stats(&self) -> MatchStats {
        let mut p1 = self.p1_stats.clone();
        let mut p2 = self.p2_stats.clone();
        p1.rounds_won = self.world.p1.rounds;
        p2.rounds_won = self.world.p2.rounds;

        MatchStats {
            match_id: self.id,
            seed: self.seed,
            opponent: self.opponent,
            champion: self.world.round.match_winner,
            rounds_played: self.rounds_played(),
            sim_duration_ms: self.world.clock_ms as u64,
            started_at_ms: self.started_at_ms,
            p1,
            p2,
        }
    }

    fn rounds_played(&self) -> u32 {
        let round = &self.world.round;
        if round.phase() == RoundPhase::Active {
            round.round - 1
        } else {
            round.round
        }
    }

    /// Run the frame loop until the match ends, the frame budget runs out or
    /// `shutdown` is notified.
    ///
    /// P1 is driven by `p1`; P2 is the match's opponent (the CPU, or an idle
    /// human in a headless run). Elapsed time is measured between frames, so
    /// the simulation follows real time whatever the actual cadence.
    pub async fn run(
        mut self,
        p1: &mut dyn IntentSource,
        config: RunConfig,
        shutdown: Arc<Notify>,
    ) -> MatchStats {
        info!(
            match_id = %self.id,
            seed = self.seed,
            opponent = ?self.opponent,
            frame_tps = config.frame_tps,
            "Match started"
        );

        if let Some(ai) = &self.cpu {
            info!(
                match_id = %self.id,
                difficulty = %ai.difficulty(),
                reaction_ms = ?ai.profile().reaction_ms,
                "CPU opponent ready"
            );
        }

        self.snapshot_builder = SnapshotBuilder::new(config.frame_tps / config.snapshot_tps.max(1));

        let mut ticker = interval(frame_period(config.frame_tps));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately
        ticker.tick().await;

        let wall = Timer::new();
        let mut frame_timer = Timer::new();
        let max_duration_ms = config.max_duration.as_secs_f32() * 1000.0;
        let mut frames: u64 = 0;

        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    info!(match_id = %self.id, "Shutdown requested, stopping match");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let elapsed_ms = frame_timer.lap_ms();
            frames += 1;

            match self.world.phase() {
                RoundPhase::RoundOver if config.auto_continue => {
                    self.continue_round();
                }
                RoundPhase::RoundOver | RoundPhase::MatchOver => {}
                RoundPhase::Active => {
                    let now_ms = self.world.clock_ms + elapsed_ms as f64;
                    let p1_intents = p1.intents(&self.world.p1, &self.world.p2, now_ms);
                    let inputs = TickInputs::new(p1_intents, InputSnapshot::idle());
                    if let Err(err) = self.tick(elapsed_ms, &inputs) {
                        warn!(match_id = %self.id, %err, "Dropping frame");
                    }
                }
            }

            if self.snapshot_builder.should_send() {
                match serde_json::to_string(&self.snapshot()) {
                    Ok(json) => debug!(match_id = %self.id, snapshot = %json, "Snapshot"),
                    Err(err) => warn!(match_id = %self.id, %err, "Failed to encode snapshot"),
                }
            }

            if self.world.phase() == RoundPhase::MatchOver {
                break;
            }

            if config.max_frames.is_some_and(|max| frames >= max) {
                info!(match_id = %self.id, frames, "Frame budget reached, stopping match");
                break;
            }

            if wall.elapsed_ms() >= max_duration_ms {
                warn!(match_id = %self.id, frames, "Wall-clock cap reached, stopping match");
                break;
            }
        }

        let stats = self.stats();
        info!(match_id = %self.id, champion = ?stats.champion, frames, "Match finished");
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::input::Action;
    use crate::util::time::frame_delta_ms;

    fn p1_presses(actions: &[Action]) -> TickInputs {
        TickInputs::new(InputSnapshot::from_actions(actions.iter().copied()), InputSnapshot::idle())
    }

    #[test]
    fn rejects_invalid_elapsed_time() {
        let mut game = GameMatch::new(Opponent::Human, 1);
        assert!(matches!(
            game.tick(-1.0, &TickInputs::default()),
            Err(TickError::NegativeElapsed(_))
        ));
        assert!(game.tick(f32::NAN, &TickInputs::default()).is_err());
        assert_eq!(game.world().tick, 0);

        assert!(game.tick(0.0, &TickInputs::default()).is_ok());
        assert_eq!(game.world().tick, 1);
    }

    #[test]
    fn stats_follow_hits() {
        let mut game = GameMatch::new(Opponent::Human, 1);
        game.world.p1.x = 300.0;
        game.world.p2.x = 360.0;
        game.world.p2.block = true;

        let events = game
            .tick(frame_delta_ms(60), &TickInputs::new(
                InputSnapshot::from_actions([Action::LightAttack]),
                InputSnapshot::from_actions([Action::Block]),
            ))
            .unwrap();
        assert_eq!(events.len(), 2);

        let stats = game.stats();
        assert_eq!(stats.p1.attacks_thrown, 1);
        assert_eq!(stats.p1.hits_landed, 1);
        assert_eq!(stats.p1.damage_dealt, 3);
        assert_eq!(stats.p2.hits_blocked, 1);
        assert_eq!(stats.p2.damage_taken, 3);
        assert_eq!(stats.rounds_played, 0);
    }

    #[test]
    fn cpu_match_is_reproducible_from_seed() {
        let mut a = GameMatch::new(Opponent::Cpu(Difficulty::Hard), 99);
        let mut b = GameMatch::new(Opponent::Cpu(Difficulty::Hard), 99);
        let inputs = p1_presses(&[Action::MoveRight]);
        for _ in 0..600 {
            a.tick(frame_delta_ms(60), &inputs).unwrap();
            b.tick(frame_delta_ms(60), &inputs).unwrap();
        }
        assert_eq!(a.world(), b.world());
    }

    #[test]
    fn pause_blocks_ticks_until_resumed() {
        let mut game = GameMatch::new(Opponent::Human, 1);
        game.toggle_pause();
        game.tick(frame_delta_ms(60), &p1_presses(&[Action::MoveRight])).unwrap();
        assert_eq!(game.world().tick, 0);
        game.toggle_pause();
        game.tick(frame_delta_ms(60), &p1_presses(&[Action::MoveRight])).unwrap();
        assert_eq!(game.world().tick, 1);
    }

    #[test]
    fn reset_clears_stats() {
        let mut game = GameMatch::new(Opponent::Human, 1);
        game.tick(frame_delta_ms(60), &p1_presses(&[Action::HeavyAttack])).unwrap();
        assert_eq!(game.stats().p1.attacks_thrown, 1);

        let events = game.reset_match();
        assert_eq!(events, vec![GameEvent::MatchReset]);
        assert_eq!(game.stats().p1, SideStats::default());
        assert_eq!(game.world(), &World::new());
    }

    #[test]
    fn run_stops_at_frame_budget() {
        let game = GameMatch::new(Opponent::Cpu(Difficulty::Easy), 5);
        let mut p1 = AiController::seeded(Difficulty::Easy, 6);
        let config = RunConfig {
            frame_tps: 500,
            snapshot_tps: 50,
            max_frames: Some(12),
            ..RunConfig::default()
        };

        let stats = tokio_test::block_on(game.run(&mut p1, config, Arc::new(Notify::new())));
        assert_eq!(stats.champion, None);
        assert!(stats.sim_duration_ms < 10_000);
    }

    #[test]
    fn run_honors_shutdown() {
        let game = GameMatch::new(Opponent::Human, 5);
        let mut p1 = AiController::seeded(Difficulty::Normal, 6);
        let shutdown = Arc::new(Notify::new());
        shutdown.notify_one();

        let stats = tokio_test::block_on(game.run(&mut p1, RunConfig::default(), shutdown));
        assert_eq!(stats.sim_duration_ms, 0);
    }
}
