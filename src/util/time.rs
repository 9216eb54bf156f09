//! Time utilities for the frame driver

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Frame rate configuration
pub const DEFAULT_FRAME_TPS: u32 = 60; // one simulation tick per rendered frame
pub const DEFAULT_SNAPSHOT_TPS: u32 = 10;

/// Nominal frame length in milliseconds for a given frame rate
pub fn frame_delta_ms(tps: u32) -> f32 {
    1000.0 / tps.max(1) as f32
}

/// Frame period as a `Duration`, for interval timers
pub fn frame_period(tps: u32) -> Duration {
    Duration::from_micros(1_000_000 / tps.max(1) as u64)
}

/// Measures the real time elapsed between consecutive frames
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.start.elapsed().as_secs_f32() * 1000.0
    }

    /// Elapsed milliseconds since the last lap, restarting the timer
    pub fn lap_ms(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.start);
        self.start = now;
        elapsed.as_secs_f32() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
