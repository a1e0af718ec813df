use std::time::{Duration, Instant};

/// Timing snapshot for one loop iteration.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick (or since `reset` for the first one).
    pub dt: f32,

    pub now: Instant,

    /// Number of ticks before this one.
    pub frame_index: u64,
}

/// Monotonic delta-time source.
///
/// Deltas are raw elapsed wall time unless clamps are installed with
/// [`FrameClock::with_clamps`]; either way they are never negative.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    clamps: Option<(Duration, Duration)>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            frame_index: 0,
            clamps: None,
        }
    }

    /// Clock whose deltas are clamped to `[dt_min, dt_max]`.
    ///
    /// Useful for simulations that explode after a debugger pause.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            clamps: Some((dt_min, dt_max)),
            ..Self::new()
        }
    }

    /// Moves the baseline to now and restarts the frame counter.
    pub fn reset(&mut self) {
        self.last = Instant::now();
        self.frame_index = 0;
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let mut dt = now.saturating_duration_since(self.last);

        if let Some((lo, hi)) = self.clamps {
            dt = dt.clamp(lo, hi);
        }

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
