use std::time::Duration;

/// Frames-per-second readout for overlays.
///
/// The instantaneous rate (`1 / dt`) flickers too much to read, so the displayed
/// value is only refreshed once `display_delay` has accumulated.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    display_delay: f32,
    since_refresh: f32,
    frames: u32,
    displayed: f32,
}

impl FpsCounter {
    pub fn new(display_delay: Duration) -> Self {
        Self {
            display_delay: display_delay.as_secs_f32(),
            since_refresh: 0.0,
            frames: 0,
            displayed: 0.0,
        }
    }

    /// Feeds one frame's delta time (seconds).
    pub fn record(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }

        self.frames += 1;
        self.since_refresh += dt;

        if self.since_refresh >= self.display_delay {
            self.displayed = self.frames as f32 / self.since_refresh;
            self.frames = 0;
            self.since_refresh = 0.0;
        }
    }

    /// Last refreshed rate; 0 until the first refresh.
    pub fn fps(&self) -> f32 {
        self.displayed
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(Duration::from_millis(50))
    }
}
