//! Whole-world state and the per-frame transition

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ai::AiController;
use super::combat::{AttackKind, CombatResolver};
use super::events::GameEvent;
use super::fighter::{Fighter, Side};
use super::input::{InputSnapshot, TickInputs};
use super::physics::FighterSimulation;
use super::round::{RoundController, RoundPhase, RoundState};

/// Anything that can produce intents for one side from the current fighters
pub trait IntentSource {
    fn intents(&mut self, me: &Fighter, opponent: &Fighter, now_ms: f64) -> InputSnapshot;
}

impl<R: Rng> IntentSource for AiController<R> {
    fn intents(&mut self, me: &Fighter, opponent: &Fighter, now_ms: f64) -> InputSnapshot {
        self.decide(me, opponent, now_ms)
    }
}

/// Complete simulation state. Every transition returns a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub p1: Fighter,
    pub p2: Fighter,
    pub round: RoundState,
    /// Simulated milliseconds since the match started; the clock cooldowns are measured on
    pub clock_ms: f64,
    /// Ticks that actually advanced the world
    pub tick: u64,
    pub paused: bool,
}

/// A world transition plus what happened during it
#[derive(Debug, Clone)]
pub struct Advance {
    pub world: World,
    pub events: Vec<GameEvent>,
}

impl World {
    pub fn new() -> Self {
        Self {
            p1: Fighter::new(Side::P1),
            p2: Fighter::new(Side::P2),
            round: RoundState::new(),
            clock_ms: 0.0,
            tick: 0,
            paused: false,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.round.phase()
    }

    /// Whether `advance` currently moves the world forward
    pub fn is_running(&self) -> bool {
        !self.paused && self.round.is_active()
    }

    pub fn match_point(&self) -> bool {
        RoundController::match_point(&self.round, &self.p1, &self.p2)
    }

    /// Advance the world by one frame.
    ///
    /// With a `cpu` source, P2's intents come from it for this tick only and
    /// `inputs.p2` is ignored. A no-op while paused, between rounds or after the match.
    pub fn advance(
        &self,
        elapsed_ms: f32,
        inputs: &TickInputs,
        cpu: Option<&mut dyn IntentSource>,
    ) -> Advance {
        debug_assert!(elapsed_ms >= 0.0, "elapsed time must not be negative");

        if !self.is_running() {
            return Advance {
                world: self.clone(),
                events: Vec::new(),
            };
        }

        let clock_ms = self.clock_ms + elapsed_ms as f64;
        let p2_intents = match cpu {
            Some(source) => source.intents(&self.p2, &self.p1, clock_ms),
            None => inputs.p2,
        };

        let p1 = FighterSimulation::step(&self.p1, &inputs.p1, elapsed_ms, clock_ms);
        let p2 = FighterSimulation::step(&self.p2, &p2_intents, elapsed_ms, clock_ms);

        let mut events = Vec::new();
        for (prev, next) in [(&self.p1, &p1), (&self.p2, &p2)] {
            if let Some(kind) = started_attack(prev, next) {
                events.push(GameEvent::AttackStarted {
                    side: next.side,
                    kind,
                });
            }
        }

        let resolution = CombatResolver::resolve(&p1, &p2);
        events.extend(resolution.hits.into_iter().map(GameEvent::Hit));

        let round =
            RoundController::update(&self.round, &resolution.p1, &resolution.p2, elapsed_ms);
        if round.round_over && !self.round.round_over {
            if let Some(reason) = round.end_reason {
                events.push(GameEvent::RoundOver {
                    round: round.round,
                    winner: round.winner,
                    reason,
                });
            }
        }

        Advance {
            world: World {
                p1: resolution.p1,
                p2: resolution.p2,
                round,
                clock_ms,
                tick: self.tick + 1,
                paused: self.paused,
            },
            events,
        }
    }

    /// "Continue" control action: only meaningful once a round is over
    pub fn continue_round(&self) -> Advance {
        let Some(transition) = RoundController::continue_round(&self.round, &self.p1, &self.p2)
        else {
            return Advance {
                world: self.clone(),
                events: Vec::new(),
            };
        };

        let event = match transition.round.match_winner {
            Some(champion) => GameEvent::MatchOver {
                champion,
                p1_rounds: transition.p1.rounds,
                p2_rounds: transition.p2.rounds,
            },
            None => GameEvent::RoundStarted {
                round: transition.round.round,
            },
        };

        Advance {
            world: World {
                p1: transition.p1,
                p2: transition.p2,
                round: transition.round,
                ..self.clone()
            },
            events: vec![event],
        }
    }

    /// "Reset match" control action, valid from any state
    pub fn reset_match(&self) -> Advance {
        Advance {
            world: World::new(),
            events: vec![GameEvent::MatchReset],
        }
    }

    /// Pause or resume world advancement
    pub fn toggle_pause(&self) -> Advance {
        let paused = !self.paused;
        Advance {
            world: World {
                paused,
                ..self.clone()
            },
            events: vec![GameEvent::PauseToggled { paused }],
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Attack started during this step: initiation is the only writer of cooldowns
fn started_attack(prev: &Fighter, next: &Fighter) -> Option<AttackKind> {
    next.attack_type
        .filter(|kind| prev.cooldowns.get(kind) != next.cooldowns.get(kind))
}
