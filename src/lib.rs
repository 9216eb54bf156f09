//! Arena Duel - deterministic two-fighter arena simulation
//!
//! The simulation core is a set of pure transitions over immutable snapshots:
//! - `FighterSimulation::step` moves one fighter and starts attacks
//! - `CombatResolver::resolve` handles facing, hits and body separation
//! - `RoundController` runs the round timer and best-of-three progression
//! - `AiController` picks intents for a computer opponent from an injected RNG
//!
//! `World::advance` ties them together per frame and `GameMatch` drives a world
//! in real time.

pub mod config;
pub mod game;
pub mod util;
