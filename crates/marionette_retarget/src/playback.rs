//! Playback Scheduler
//!
//! Walks a loaded sequence at a fixed sample rate.
//!
//! ```text
//! Idle --load(n > 0)--> Playing --last frame ticked / stop()--> Finished
//! ```
//!
//! Tick `k` hands out frame `k`. After the tick that delivered the final
//! frame the scheduler is `Finished` and the cursor stays on that frame.

use crate::settings::PlaybackSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Finished,
}

#[derive(Debug, Clone)]
pub struct PlaybackScheduler {
    state: PlaybackState,
    frame_count: usize,
    cursor: usize,
    next_frame: usize,
    accumulator: f32,
    settings: PlaybackSettings,
}

impl PlaybackScheduler {
    #[must_use]
    pub fn new(settings: PlaybackSettings) -> Self {
        Self {
            state: PlaybackState::Idle,
            frame_count: 0,
            cursor: 0,
            next_frame: 0,
            accumulator: 0.0,
            settings,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Frame most recently handed out (0 before the first tick).
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Starts playback of a sequence with `frame_count` frames.
    ///
    /// An empty sequence leaves the scheduler `Idle`.
    pub fn load(&mut self, frame_count: usize) {
        self.frame_count = frame_count;
        self.cursor = 0;
        self.next_frame = 0;
        self.accumulator = 0.0;

        if frame_count == 0 {
            log::warn!("No frames loaded, playback stays idle.");
            self.state = PlaybackState::Idle;
        } else {
            log::info!("Playback started: {frame_count} frames at {} Hz", self.settings.sample_rate);
            self.state = PlaybackState::Playing;
        }
    }

    /// Advances by one sample and returns the frame index to apply.
    pub fn tick(&mut self) -> Option<usize> {
        if self.state != PlaybackState::Playing {
            return None;
        }

        self.cursor = self.next_frame;
        self.next_frame += 1;
        if self.next_frame >= self.frame_count {
            log::info!("Playback finished at frame {}", self.cursor);
            self.state = PlaybackState::Finished;
        }
        Some(self.cursor)
    }

    /// Accumulates `dt` seconds and returns how many ticks are due.
    ///
    /// At most `max_ticks_per_update` ticks are reported per call; the
    /// backlog beyond that is dropped.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if self.state != PlaybackState::Playing || !dt.is_finite() || dt <= 0.0 {
            return 0;
        }

        let period = self.settings.tick_period();
        self.accumulator += dt;

        let mut due = 0;
        while self.accumulator >= period && due < self.settings.max_ticks_per_update {
            self.accumulator -= period;
            due += 1;
        }
        if due == self.settings.max_ticks_per_update {
            self.accumulator = self.accumulator.min(period);
        }
        due
    }

    /// Halts advancement. Targets and bone rotations are left as they are.
    pub fn stop(&mut self) {
        if self.state == PlaybackState::Playing {
            log::info!("Playback stopped at frame {}", self.cursor);
            self.state = PlaybackState::Finished;
        }
    }

    /// Drops the loaded sequence and returns to `Idle`.
    pub fn reset(&mut self) {
        self.state = PlaybackState::Idle;
        self.frame_count = 0;
        self.cursor = 0;
        self.next_frame = 0;
        self.accumulator = 0.0;
    }
}
