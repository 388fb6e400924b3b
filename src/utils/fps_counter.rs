use std::time::{Duration, Instant};

/// Rolling frames-per-second counter over a one-second window.
pub struct FpsCounter {
    window_start: Instant,
    frames_in_window: u32,
    fps: f32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frames_in_window: 0,
            fps: 0.0,
        }
    }

    /// Counts one frame; returns the refreshed average once per second.
    pub fn tick(&mut self) -> Option<f32> {
        self.frames_in_window += 1;
        let elapsed = self.window_start.elapsed();
        if elapsed >= Duration::from_secs(1) {
            self.fps = self.frames_in_window as f32 / elapsed.as_secs_f32();
            self.frames_in_window = 0;
            self.window_start = Instant::now();
            log::debug!("fps: {:.1}", self.fps);
            return Some(self.fps);
        }
        None
    }

    #[must_use]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}
