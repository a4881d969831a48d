#![forbid(unsafe_code)]

//! Drag tracking: raw translation samples to clamped panel positions.
//!
//! # State Machine
//!
//! ```text
//! Possible -> Began -> Changed* -> Ended | Cancelled | Failed
//! ```
//!
//! Only `Changed` produces a position. `Possible`/`Began` arm the session
//! and the terminal phases hand off to settle resolution.
//!
//! # Invariants
//!
//! 1. Every position returned by [`DragTracker::on_sample`] lies in
//!    `[final_top, screen_bottom]`.
//! 2. Samples are absolute translations from the gesture origin, so a
//!    dropped sample never accumulates error.

use serde::{Deserialize, Serialize};

use crate::offsets::OffsetConfiguration;

/// Host gesture recognizer phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GesturePhase {
    Possible,
    Began,
    Changed,
    Ended,
    Cancelled,
    Failed,
}

impl GesturePhase {
    /// Phases after which the session is consumed and settled.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled | Self::Failed)
    }
}

/// Stateless clamp from translation samples to panel Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragTracker {
    offsets: OffsetConfiguration,
}

impl DragTracker {
    #[must_use]
    pub const fn new(offsets: OffsetConfiguration) -> Self {
        Self { offsets }
    }

    #[must_use]
    pub const fn offsets(&self) -> &OffsetConfiguration {
        &self.offsets
    }

    /// Map one gesture sample to a new absolute panel Y.
    ///
    /// Returns `None` for every phase except [`GesturePhase::Changed`].
    #[must_use]
    pub fn on_sample(&self, phase: GesturePhase, translation_y: f64, origin_y: f64) -> Option<f64> {
        match phase {
            GesturePhase::Changed => {
                let expected = origin_y + translation_y;
                if !expected.is_finite() {
                    return None;
                }
                Some(self.offsets.clamp(expected))
            }
            _ => None,
        }
    }
}

/// Per-gesture state, created on `Began` and consumed on a terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragSession {
    origin_y: f64,
    translation_y: f64,
    velocity_y: f64,
    samples: u32,
}

impl DragSession {
    #[must_use]
    pub const fn begin(origin_y: f64) -> Self {
        Self {
            origin_y,
            translation_y: 0.0,
            velocity_y: 0.0,
            samples: 0,
        }
    }

    /// Record the latest sample. Non-finite values are ignored.
    pub fn record(&mut self, translation_y: f64, velocity_y: f64) {
        if translation_y.is_finite() {
            self.translation_y = translation_y;
        }
        if velocity_y.is_finite() {
            self.velocity_y = velocity_y;
        }
        self.samples = self.samples.saturating_add(1);
    }

    #[inline]
    #[must_use]
    pub const fn origin_y(&self) -> f64 {
        self.origin_y
    }

    #[inline]
    #[must_use]
    pub const fn translation_y(&self) -> f64 {
        self.translation_y
    }

    #[inline]
    #[must_use]
    pub const fn velocity_y(&self) -> f64 {
        self.velocity_y
    }

    #[inline]
    #[must_use]
    pub const fn samples(&self) -> u32 {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> DragTracker {
        DragTracker::new(OffsetConfiguration::new(48.0, 440.0, 800.0).unwrap())
    }

    #[test]
    fn arming_phases_produce_no_position() {
        let t = tracker();
        assert_eq!(t.on_sample(GesturePhase::Possible, 10.0, 440.0), None);
        assert_eq!(t.on_sample(GesturePhase::Began, 10.0, 440.0), None);
    }

    #[test]
    fn terminal_phases_produce_no_position() {
        let t = tracker();
        for phase in [GesturePhase::Ended, GesturePhase::Cancelled, GesturePhase::Failed] {
            assert!(phase.is_terminal());
            assert_eq!(t.on_sample(phase, 10.0, 440.0), None);
        }
    }

    #[test]
    fn changed_adds_translation_to_origin() {
        assert_eq!(tracker().on_sample(GesturePhase::Changed, -40.0, 440.0), Some(400.0));
    }

    #[test]
    fn changed_clamps_both_ends() {
        let t = tracker();
        assert_eq!(t.on_sample(GesturePhase::Changed, -1_000.0, 440.0), Some(48.0));
        assert_eq!(t.on_sample(GesturePhase::Changed, 1_000.0, 440.0), Some(800.0));
    }

    #[test]
    fn non_finite_translation_is_dropped() {
        assert_eq!(tracker().on_sample(GesturePhase::Changed, f64::NAN, 440.0), None);
    }

    #[test]
    fn session_records_latest_sample() {
        let mut session = DragSession::begin(440.0);
        session.record(12.0, 300.0);
        session.record(20.0, f64::NAN);
        assert_eq!(session.origin_y(), 440.0);
        assert_eq!(session.translation_y(), 20.0);
        assert_eq!(session.velocity_y(), 300.0);
        assert_eq!(session.samples(), 2);
    }
}
