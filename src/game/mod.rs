//! Duel simulation modules

pub mod ai;
pub mod combat;
pub mod events;
pub mod fighter;
pub mod input;
pub mod r#match;
pub mod physics;
pub mod round;
pub mod snapshot;
pub mod world;

pub use ai::{AiController, Difficulty, DifficultyProfile};
pub use combat::{AttackKind, CombatResolver, HitResult, Resolution};
pub use events::GameEvent;
pub use fighter::{Facing, Fighter, Side};
pub use input::{Action, InputSnapshot, TickInputs};
pub use physics::FighterSimulation;
pub use r#match::{GameMatch, MatchStats, Opponent, RunConfig, TickError};
pub use round::{RoundController, RoundPhase, RoundState};
pub use snapshot::{SnapshotBuilder, WorldSnapshot};
pub use world::{Advance, IntentSource, World};
