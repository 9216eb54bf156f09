//! Round timer, KO / time-up detection and best-of-N match progression

use serde::{Deserialize, Serialize};

use super::fighter::{Fighter, Side};

/// Length of one round in seconds
pub const ROUND_SECONDS: f32 = 60.0;
/// Round wins needed to take the match (best of three)
pub const ROUNDS_TO_WIN: u32 = 2;

/// Where the match currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    /// Round in progress
    Active,
    /// Round decided, waiting for "continue"
    RoundOver,
    /// A side reached the win threshold
    MatchOver,
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundEndReason {
    Ko,
    /// Both fighters dropped to zero on the same tick; scored as a draw
    DoubleKo,
    TimeUp,
}

/// Round bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    /// Seconds left in the round
    pub timer: f32,
    pub round_over: bool,
    /// Winner of the finished round; `None` while active or on a draw
    pub winner: Option<Side>,
    pub match_winner: Option<Side>,
    pub end_reason: Option<RoundEndReason>,
    /// 1-based number of the current round
    pub round: u32,
}

impl RoundState {
    pub fn new() -> Self {
        Self {
            timer: ROUND_SECONDS,
            round_over: false,
            winner: None,
            match_winner: None,
            end_reason: None,
            round: 1,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        if self.match_winner.is_some() {
            RoundPhase::MatchOver
        } else if self.round_over {
            RoundPhase::RoundOver
        } else {
            RoundPhase::Active
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase() == RoundPhase::Active
    }
}

impl Default for RoundState {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a "continue" or "reset" control action
#[derive(Debug, Clone, PartialEq)]
pub struct RoundTransition {
    pub round: RoundState,
    pub p1: Fighter,
    pub p2: Fighter,
}

/// Round/match state machine
pub struct RoundController;

impl RoundController {
    /// Count the round timer down and decide the round if it just ended.
    /// A no-op unless the round is active.
    pub fn update(state: &RoundState, p1: &Fighter, p2: &Fighter, elapsed_ms: f32) -> RoundState {
        if !state.is_active() {
            return state.clone();
        }

        let mut next = state.clone();
        next.timer = (next.timer - elapsed_ms / 1000.0).max(0.0);

        if let Some((winner, reason)) = Self::decide(next.timer, p1, p2) {
            next.round_over = true;
            next.winner = winner;
            next.end_reason = Some(reason);
        }

        next
    }

    /// KO rules first, then time-up. Returns `None` while the round goes on.
    fn decide(timer: f32, p1: &Fighter, p2: &Fighter) -> Option<(Option<Side>, RoundEndReason)> {
        match (p1.is_ko(), p2.is_ko()) {
            (true, true) => return Some((None, RoundEndReason::DoubleKo)),
            (true, false) => return Some((Some(Side::P2), RoundEndReason::Ko)),
            (false, true) => return Some((Some(Side::P1), RoundEndReason::Ko)),
            (false, false) => {}
        }

        if timer <= 0.0 {
            let winner = match p1.hp.cmp(&p2.hp) {
                std::cmp::Ordering::Greater => Some(Side::P1),
                std::cmp::Ordering::Less => Some(Side::P2),
                std::cmp::Ordering::Equal => None,
            };
            return Some((winner, RoundEndReason::TimeUp));
        }

        None
    }

    /// Credit the round winner and set up the next round, or end the match.
    /// Returns `None` unless the round is over.
    pub fn continue_round(
        state: &RoundState,
        p1: &Fighter,
        p2: &Fighter,
    ) -> Option<RoundTransition> {
        if state.phase() != RoundPhase::RoundOver {
            return None;
        }

        let mut p1 = p1.clone();
        let mut p2 = p2.clone();
        match state.winner {
            Some(Side::P1) => p1.rounds += 1,
            Some(Side::P2) => p2.rounds += 1,
            None => {}
        }

        let p1 = p1.for_next_round();
        let p2 = p2.for_next_round();

        let champion = if p1.rounds >= ROUNDS_TO_WIN {
            Some(Side::P1)
        } else if p2.rounds >= ROUNDS_TO_WIN {
            Some(Side::P2)
        } else {
            None
        };

        let round = match champion {
            Some(side) => RoundState {
                match_winner: Some(side),
                ..state.clone()
            },
            None => RoundState {
                round: state.round + 1,
                ..RoundState::new()
            },
        };

        Some(RoundTransition { round, p1, p2 })
    }

    /// Fresh match from any state
    pub fn reset_match() -> RoundTransition {
        RoundTransition {
            round: RoundState::new(),
            p1: Fighter::new(Side::P1),
            p2: Fighter::new(Side::P2),
        }
    }

    /// One side is a single round win from taking the match
    pub fn match_point(state: &RoundState, p1: &Fighter, p2: &Fighter) -> bool {
        state.match_winner.is_none()
            && (p1.rounds + 1 == ROUNDS_TO_WIN || p2.rounds + 1 == ROUNDS_TO_WIN)
    }
}
