//! Frame timing: the delta-time source that drives animation playback

use std::time::{Duration, Instant};

/// Source of the time elapsed since the previous simulation tick.
pub trait DeltaTime {
    /// Seconds elapsed since the previous tick
    fn delta_secs(&self) -> f32;
}

/// Constant timestep, for headless simulation and tests
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedTimestep(pub f32);

impl FixedTimestep {
    /// Timestep for the given tick rate (e.g. 60.0 for 60 Hz)
    pub fn from_hz(hz: f32) -> Self {
        Self(if hz > 0.0 { 1.0 / hz } else { 0.0 })
    }
}

impl DeltaTime for FixedTimestep {
    fn delta_secs(&self) -> f32 {
        self.0
    }
}

/// Tracks wall-clock frame timing and calculates FPS
pub struct FrameTimer {
    last_frame: Instant,
    delta: Duration,
    frame_count: u64,
    fps_timer: Instant,
    fps: f32,
    fps_frame_count: u32,
}

impl FrameTimer {
    /// Create a new frame timer
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
            fps_timer: now,
            fps: 0.0,
            fps_frame_count: 0,
        }
    }

    /// Call once per frame to update timing
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_frame;
        self.last_frame = now;
        self.frame_count += 1;
        self.fps_frame_count += 1;

        // Update FPS every second
        let fps_elapsed = now - self.fps_timer;
        if fps_elapsed >= Duration::from_secs(1) {
            self.fps = self.fps_frame_count as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = 0;
            self.fps_timer = now;
        }
    }

    /// Get delta time as Duration
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Get current FPS (updated every second)
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Get total frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl DeltaTime for FrameTimer {
    fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_timestep() {
        let step = FixedTimestep::from_hz(50.0);
        assert!((step.delta_secs() - 0.02).abs() < 1e-6);
        assert_eq!(FixedTimestep::from_hz(0.0).delta_secs(), 0.0);
    }

    #[test]
    fn test_frame_timer_tick() {
        let mut timer = FrameTimer::new();
        assert_eq!(timer.delta_secs(), 0.0);

        timer.tick();
        timer.tick();

        assert_eq!(timer.frame_count(), 2);
        assert!(timer.delta_secs() >= 0.0);
    }
}
