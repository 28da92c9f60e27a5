//! Time management for the simulation loop.

use std::time::Duration;

/// Highest accepted physics rate. Faster rates would round the step towards zero.
pub const MAX_FIXED_RATE_HZ: f64 = 10_000.0;

/// Frame timing plus a fixed-step accumulator for physics.
///
/// The host drives it with [`Time::advance`]; nothing here reads a wall clock,
/// so a headless run is reproducible.
#[derive(Debug)]
pub struct Time {
    /// Duration of the last frame.
    delta: Duration,
    /// Total elapsed time since start.
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
    /// Fixed timestep for physics (default 60 Hz).
    fixed_timestep: Duration,
    /// Accumulated time for fixed updates.
    accumulator: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        Self {
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            fixed_timestep: Duration::from_secs_f64(1.0 / 60.0),
            accumulator: Duration::ZERO,
        }
    }

    /// Start a new frame that lasted `delta`.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
        self.accumulator += delta;
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the fixed timestep in seconds.
    pub fn fixed_timestep_seconds(&self) -> f32 {
        self.fixed_timestep.as_secs_f32()
    }

    /// Check if a fixed update should run and consume the time.
    pub fn should_fixed_update(&mut self) -> bool {
        if self.accumulator >= self.fixed_timestep {
            self.accumulator -= self.fixed_timestep;
            true
        } else {
            false
        }
    }

    /// Set the fixed timestep rate in Hz. Rates outside `(0, MAX_FIXED_RATE_HZ]`
    /// are ignored.
    pub fn set_fixed_rate(&mut self, hz: f64) {
        if !(hz > 0.0 && hz <= MAX_FIXED_RATE_HZ) {
            log::warn!("Ignoring fixed rate {} Hz, keeping {:?}", hz, self.fixed_timestep);
            return;
        }
        self.fixed_timestep = Duration::from_secs_f64(1.0 / hz);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_yields_whole_fixed_steps() {
        let mut time = Time::new();
        time.set_fixed_rate(50.0);
        time.advance(Duration::from_millis(50));

        let mut steps = 0;
        while time.should_fixed_update() {
            steps += 1;
        }
        assert_eq!(steps, 2);
        assert_eq!(time.frame_count(), 1);
        assert!((time.delta_seconds() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn absurd_rate_keeps_previous_step() {
        let mut time = Time::new();
        time.set_fixed_rate(1e10);
        time.set_fixed_rate(f64::INFINITY);
        time.set_fixed_rate(f64::NAN);
        assert!((time.fixed_timestep_seconds() - 1.0 / 60.0).abs() < 1e-6);

        time.advance(Duration::from_millis(50));
        let mut steps = 0;
        while time.should_fixed_update() {
            steps += 1;
        }
        assert_eq!(steps, 3);
    }

    #[test]
    fn zero_rate_keeps_previous_step() {
        let mut time = Time::new();
        time.set_fixed_rate(0.0);
        assert!((time.fixed_timestep_seconds() - 1.0 / 60.0).abs() < 1e-6);
    }
}
