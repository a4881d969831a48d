#![forbid(unsafe_code)]

//! Fixed-duration eased interpolation between two positions.
//!
//! Used for modal enter/exit transitions, where the host expects a known
//! transition duration up front.

use std::time::Duration;

use super::{Animation, EasingFn, ease_out};

/// Eased motion from `from` to `to` over a fixed duration.
#[derive(Debug, Clone)]
pub struct Tween {
    from: f64,
    to: f64,
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl Tween {
    /// Zero durations are clamped to 1ns so progress stays defined.
    #[must_use]
    pub fn new(from: f64, to: f64, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration: duration.max(Duration::from_nanos(1)),
            easing: ease_out,
        }
    }

    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Linear time progress in `[0, 1]`.
    #[must_use]
    pub fn time_progress(&self) -> f32 {
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0) as f32
    }

    /// Current eased position.
    #[must_use]
    pub fn position(&self) -> f64 {
        let eased = f64::from((self.easing)(self.time_progress()));
        self.from + (self.to - self.from) * eased
    }

    #[must_use]
    pub fn target(&self) -> f64 {
        self.to
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        (self.easing)(self.time_progress())
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}
