#![forbid(unsafe_code)]

//! Deterministic gesture scripts.
//!
//! ```rust,ignore
//! let samples = GestureScript::new().drag_by(60.0, 6).release(0.0).build();
//! ```

use pullsheet_core::arbitration::NestedScrollState;
use pullsheet_core::drag::GesturePhase;
use pullsheet_runtime::controller::GestureSample;

/// Builder for a single gesture's sample sequence.
#[derive(Debug, Clone)]
pub struct GestureScript {
    samples: Vec<GestureSample>,
    translation: f64,
    velocity: f64,
}

impl Default for GestureScript {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureScript {
    /// Starts with a `Began` sample at zero translation.
    #[must_use]
    pub fn new() -> Self {
        Self::with_velocity(0.0)
    }

    /// Starts with a `Began` sample reporting `velocity` (admission uses it).
    #[must_use]
    pub fn with_velocity(velocity: f64) -> Self {
        Self {
            samples: vec![GestureSample::new(GesturePhase::Began, 0.0, velocity)],
            translation: 0.0,
            velocity,
        }
    }

    /// Attach nested scroll state to the `Began` sample.
    #[must_use]
    pub fn nested(mut self, nested: NestedScrollState) -> Self {
        if let Some(first) = self.samples.first_mut() {
            *first = first.with_nested(nested);
        }
        self
    }

    /// Move by `delta` points across `steps` evenly spaced `Changed` samples.
    #[must_use]
    pub fn drag_by(mut self, delta: f64, steps: usize) -> Self {
        let steps = steps.max(1);
        let step = delta / steps as f64;
        for _ in 0..steps {
            self.translation += step;
            self.samples.push(GestureSample::new(
                GesturePhase::Changed,
                self.translation,
                self.velocity,
            ));
        }
        self
    }

    /// Finish with `Ended` at `velocity`.
    #[must_use]
    pub fn release(self, velocity: f64) -> Self {
        self.finish(GesturePhase::Ended, Some(velocity))
    }

    /// Finish with `Ended` and no velocity reading.
    #[must_use]
    pub fn release_without_velocity(self) -> Self {
        self.finish(GesturePhase::Ended, None)
    }

    /// Finish with `Cancelled` at `velocity`.
    #[must_use]
    pub fn cancel(self, velocity: f64) -> Self {
        self.finish(GesturePhase::Cancelled, Some(velocity))
    }

    fn finish(mut self, phase: GesturePhase, velocity: Option<f64>) -> Self {
        let sample = GestureSample::new(phase, self.translation, velocity.unwrap_or(0.0));
        self.samples.push(match velocity {
            Some(_) => sample,
            None => sample.without_velocity(),
        });
        self
    }

    #[must_use]
    pub fn build(self) -> Vec<GestureSample> {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_shape() {
        let samples = GestureScript::new().drag_by(60.0, 3).release(250.0).build();
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0].phase, GesturePhase::Began);
        assert_eq!(samples[3].translation_y, 60.0);
        assert_eq!(samples[4].phase, GesturePhase::Ended);
        assert_eq!(samples[4].velocity_y, Some(250.0));
    }

    #[test]
    fn missing_velocity_is_none() {
        let samples = GestureScript::new().drag_by(10.0, 1).release_without_velocity().build();
        assert_eq!(samples.last().map(|s| s.velocity_y), Some(None));
    }
}
