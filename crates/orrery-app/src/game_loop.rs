//! Fixed-timestep loop implementing the "Fix Your Timestep" pattern.
//!
//! Decouples the simulation (fixed 50 Hz) from rendering (variable rate)
//! with an accumulator.

use std::time::Instant;
use tracing::warn;

/// Fixed simulation timestep in seconds.
pub const FIXED_DT: f64 = 0.02;

/// Maximum frame time clamp to prevent spiral of death. Slower frames accept
/// simulation slowdown instead of trying to catch up with dozens of steps.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Fixed-timestep loop state.
///
/// Call [`tick`](Self::tick) once per frame; the update closure runs zero or
/// more times at the fixed rate.
pub struct GameLoop {
    previous_time: Instant,
    accumulator: f64,
    update_count: u64,
}

impl GameLoop {
    /// Create a loop starting from the current instant.
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            accumulator: 0.0,
            update_count: 0,
        }
    }

    /// Measure elapsed time and run `update_fn(FIXED_DT)` once per elapsed
    /// fixed step.
    pub fn tick(&mut self, mut update_fn: impl FnMut(f64)) {
        let current_time = Instant::now();
        let mut frame_time = current_time
            .duration_since(self.previous_time)
            .as_secs_f64();
        self.previous_time = current_time;

        if frame_time > MAX_FRAME_TIME {
            warn!(
                "frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            frame_time = MAX_FRAME_TIME;
        }

        self.accumulator += frame_time;
        while self.accumulator >= FIXED_DT {
            update_fn(FIXED_DT);
            self.accumulator -= FIXED_DT;
            self.update_count += 1;
        }
    }

    /// Total fixed updates run so far.
    pub fn update_count(&self) -> u64 {
        self.update_count
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulator_runs_expected_steps() {
        let mut game_loop = GameLoop::new();
        // Simulate 100ms having passed.
        game_loop.previous_time = Instant::now() - std::time::Duration::from_millis(100);
        let mut steps = 0;
        game_loop.tick(|dt| {
            assert_eq!(dt, FIXED_DT);
            steps += 1;
        });
        // 100ms at 20ms per step is five updates, give or take timer jitter.
        assert!((4..=6).contains(&steps), "ran {steps} steps");
    }

    #[test]
    fn test_frame_time_clamped() {
        let mut game_loop = GameLoop::new();
        game_loop.previous_time = Instant::now() - std::time::Duration::from_secs(10);
        let mut steps = 0u32;
        game_loop.tick(|_| steps += 1);
        let max_steps = (MAX_FRAME_TIME / FIXED_DT) as u32 + 1;
        assert!(steps <= max_steps, "spiral of death: {steps} steps");
    }
}
