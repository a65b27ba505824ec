//! Frame pacing
//!
//! The browser calls back once per display refresh. `FrameThrottle` lets a
//! callback through only when at least one frame duration has passed since
//! the last executed frame; skipped callbacks do nothing and are not caught
//! up later.

use crate::consts::TARGET_FPS;

/// Frames in the FPS averaging window
const FPS_WINDOW: usize = 30;

#[derive(Debug, Clone)]
pub struct FrameThrottle {
    frame_duration_ms: f64,
    last_frame_ms: f64,
    fps: FpsCounter,
}

impl Default for FrameThrottle {
    fn default() -> Self {
        Self::new(TARGET_FPS)
    }
}

impl FrameThrottle {
    pub fn new(target_fps: u32) -> Self {
        Self {
            frame_duration_ms: 1000.0 / target_fps.max(1) as f64,
            last_frame_ms: 0.0,
            fps: FpsCounter::default(),
        }
    }

    pub fn frame_duration_ms(&self) -> f64 {
        self.frame_duration_ms
    }

    /// Whether the frame at `now_ms` should run update + render
    pub fn should_run(&mut self, now_ms: f64) -> bool {
        if now_ms - self.last_frame_ms < self.frame_duration_ms {
            return false;
        }
        self.last_frame_ms = now_ms;
        self.fps.record(now_ms);
        true
    }

    /// Measured rate of executed frames
    pub fn fps(&self) -> u32 {
        self.fps.fps()
    }
}

/// Rolling average over the last `FPS_WINDOW` frame timestamps
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frame_times: [f64; FPS_WINDOW],
    frame_index: usize,
    recorded: usize,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self {
            frame_times: [0.0; FPS_WINDOW],
            frame_index: 0,
            recorded: 0,
        }
    }
}

impl FpsCounter {
    pub fn record(&mut self, time_ms: f64) {
        self.frame_times[self.frame_index] = time_ms;
        self.frame_index = (self.frame_index + 1) % FPS_WINDOW;
        self.recorded = (self.recorded + 1).min(FPS_WINDOW);
    }

    pub fn fps(&self) -> u32 {
        if self.recorded < 2 {
            return 0;
        }
        let newest = self.frame_times[(self.frame_index + FPS_WINDOW - 1) % FPS_WINDOW];
        let oldest = if self.recorded == FPS_WINDOW {
            self.frame_times[self.frame_index]
        } else {
            self.frame_times[0]
        };
        let elapsed = newest - oldest;
        if elapsed <= 0.0 {
            return 0;
        }
        ((self.recorded - 1) as f64 * 1000.0 / elapsed).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_until_duration_elapsed() {
        let mut throttle = FrameThrottle::new(30);
        assert!((throttle.frame_duration_ms() - 1000.0 / 30.0).abs() < 1e-9);
        assert!(throttle.should_run(100.0));
        assert!(!throttle.should_run(110.0));
        assert!(!throttle.should_run(133.0));
        assert!(throttle.should_run(134.0));
    }

    #[test]
    fn test_no_catch_up_after_stall() {
        let mut throttle = FrameThrottle::new(30);
        assert!(throttle.should_run(100.0));
        // Long stall runs exactly one frame, then paces from the new time
        assert!(throttle.should_run(1000.0));
        assert!(!throttle.should_run(1016.0));
        assert!(throttle.should_run(1034.0));
    }

    #[test]
    fn test_60hz_callbacks_run_at_30() {
        let mut throttle = FrameThrottle::new(30);
        let mut executed = 0;
        for i in 1..=600 {
            if throttle.should_run(i as f64 * 1000.0 / 60.0) {
                executed += 1;
            }
        }
        // 10 seconds of callbacks: every second or third callback runs
        assert!(executed <= 300, "{executed}");
        assert!(executed >= 200, "{executed}");
    }

    #[test]
    fn test_fps_counter() {
        let mut counter = FpsCounter::default();
        assert_eq!(counter.fps(), 0);
        for i in 0..100 {
            counter.record(i as f64 * 40.0);
        }
        assert_eq!(counter.fps(), 25);
    }
}
