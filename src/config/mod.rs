//! Configuration module - environment variable parsing

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::game::Difficulty;
use crate::util::time::{DEFAULT_FRAME_TPS, DEFAULT_SNAPSHOT_TPS};

/// Runner configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,

    /// Seed for the AI controllers
    pub seed: u64,
    /// Simulation frames per second
    pub frame_tps: u32,
    /// Snapshot log rate
    pub snapshot_tps: u32,

    /// Difficulty of the AI playing P1 in headless runs
    pub p1_difficulty: Difficulty,
    /// Difficulty of the CPU opponent (P2)
    pub p2_difficulty: Difficulty,

    /// Wall-clock cap for a headless match
    pub max_duration: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let frame_tps: u32 = parse_or(&lookup, "DUEL_TPS", DEFAULT_FRAME_TPS)?;
        if frame_tps == 0 {
            return Err(ConfigError::Invalid {
                key: "DUEL_TPS",
                value: "0".to_string(),
            });
        }

        let seed = match lookup("DUEL_SEED") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "DUEL_SEED",
                value,
            })?,
            None => rand::random::<u64>(),
        };

        Ok(Self {
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_json: parse_or(&lookup, "LOG_JSON", false)?,
            seed,
            frame_tps,
            snapshot_tps: parse_or(&lookup, "DUEL_SNAPSHOT_TPS", DEFAULT_SNAPSHOT_TPS)?,
            p1_difficulty: parse_or(&lookup, "DUEL_P1_DIFFICULTY", Difficulty::Normal)?,
            p2_difficulty: parse_or(&lookup, "DUEL_P2_DIFFICULTY", Difficulty::Normal)?,
            max_duration: Duration::from_secs(parse_or(&lookup, "DUEL_MAX_SECONDS", 600u64)?),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
