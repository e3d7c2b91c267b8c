use std::time::{Duration, Instant};

/// Measures the interval between render steps.
///
/// Deltas are clamped to `max_delta` so a stalled process does not hand the
/// playback scheduler a huge catch-up interval.
pub struct FrameTimer {
    start_time: Instant,
    last_update: Instant,
    max_delta: Duration,
    /// Time since last tick, after clamping
    pub delta: Duration,
    /// Total elapsed time since creation
    pub elapsed: Duration,
    /// Total number of ticks
    pub frame_count: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

impl FrameTimer {
    #[must_use]
    pub fn new(max_delta: Duration) -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_update: now,
            max_delta,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    pub fn tick(&mut self) {
        let now = Instant::now();
        let raw = now - self.last_update;
        if raw > self.max_delta {
            log::debug!("Frame delta {raw:?} clamped to {:?}", self.max_delta);
        }
        self.delta = raw.min(self.max_delta);
        self.elapsed = now - self.start_time;
        self.last_update = now;
        self.frame_count += 1;
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}
