#![forbid(unsafe_code)]

//! Damped spring used to settle the panel.
//!
//! The integrator follows the classical damped oscillator with unit mass:
//!
//!   a = -stiffness × (position - target) - damping × velocity
//!
//! Springs are described to callers by [`SpringParams`]: a damping ratio
//! `ζ` and a frequency response (the undamped period, in seconds). They map
//! onto physical coefficients as
//!
//! ```text
//! ω         = 2π / response
//! stiffness = ω²
//! damping   = 2ζω
//! ```
//!
//! # Invariants
//!
//! 1. `SpringParams` can only be built with `ζ ∈ [0, 1]` and `response > 0`.
//! 2. A spring at rest stays at rest until `set_target`, `impulse`, or
//!    `reset` is called.
//! 3. On coming to rest the position snaps exactly onto the target.
//!
//! # Failure Modes
//!
//! - Very large dt: integration is subdivided into 4ms steps, so a long
//!   frame hitch costs CPU but never diverges.
//! - `ζ = 0`: the spring oscillates forever and never reports rest.

use std::f64::consts::TAU;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Animation;
use crate::error::ConfigError;

/// Maximum dt per integration step (4ms).
const MAX_STEP_SECS: f64 = 0.004;

/// Position delta (points) below which the spring may come to rest.
const DEFAULT_REST_THRESHOLD: f64 = 0.05;

/// Speed (points/s) below which the spring may come to rest.
const DEFAULT_VELOCITY_THRESHOLD: f64 = 1.0;

/// Envelope decay treated as "settled" for duration estimates (e^-6.9 ≈ 0.001).
const SETTLE_LOG_DECAY: f64 = 6.907_755_278_982_137;

/// Damping ratio and frequency response of a spring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSpringParams", into = "RawSpringParams")]
pub struct SpringParams {
    damping_ratio: f64,
    response: f64,
}

#[derive(Serialize, Deserialize)]
struct RawSpringParams {
    damping_ratio: f64,
    response: f64,
}

impl TryFrom<RawSpringParams> for SpringParams {
    type Error = ConfigError;

    fn try_from(raw: RawSpringParams) -> Result<Self, Self::Error> {
        Self::new(raw.damping_ratio, raw.response)
    }
}

impl From<SpringParams> for RawSpringParams {
    fn from(params: SpringParams) -> Self {
        Self {
            damping_ratio: params.damping_ratio,
            response: params.response,
        }
    }
}

impl Default for SpringParams {
    /// Slightly elastic arrival without visible oscillation.
    fn default() -> Self {
        Self {
            damping_ratio: 0.9,
            response: 0.4,
        }
    }
}

impl SpringParams {
    pub fn new(damping_ratio: f64, response: f64) -> Result<Self, ConfigError> {
        let in_range = damping_ratio.is_finite()
            && (0.0..=1.0).contains(&damping_ratio)
            && response.is_finite()
            && response > 0.0;
        if !in_range {
            return Err(ConfigError::InvalidSpring {
                damping_ratio,
                response,
            });
        }
        Ok(Self {
            damping_ratio,
            response,
        })
    }

    #[must_use]
    pub const fn damping_ratio(&self) -> f64 {
        self.damping_ratio
    }

    #[must_use]
    pub const fn response(&self) -> f64 {
        self.response
    }

    /// Undamped angular frequency ω.
    #[must_use]
    pub fn angular_frequency(&self) -> f64 {
        TAU / self.response
    }

    #[must_use]
    pub fn stiffness(&self) -> f64 {
        let omega = self.angular_frequency();
        omega * omega
    }

    #[must_use]
    pub fn damping(&self) -> f64 {
        2.0 * self.damping_ratio * self.angular_frequency()
    }

    /// Time for the oscillation envelope to decay to 0.1% of its start.
    ///
    /// Undamped springs never settle; they report ten response periods.
    #[must_use]
    pub fn settling_duration(&self) -> Duration {
        let decay_rate = self.damping_ratio * self.angular_frequency();
        if decay_rate <= f64::EPSILON {
            return Duration::from_secs_f64(self.response * 10.0);
        }
        Duration::from_secs_f64(SETTLE_LOG_DECAY / decay_rate)
    }
}

/// A damped harmonic oscillator over absolute positions (points).
#[derive(Debug, Clone)]
pub struct Spring {
    position: f64,
    velocity: f64,
    target: f64,
    initial: f64,
    initial_velocity: f64,
    stiffness: f64,
    damping: f64,
    rest_threshold: f64,
    velocity_threshold: f64,
    at_rest: bool,
}

impl Spring {
    /// Spring from `initial` toward `target` with the given parameters.
    #[must_use]
    pub fn new(params: SpringParams, initial: f64, target: f64) -> Self {
        Self {
            position: initial,
            velocity: 0.0,
            target,
            initial,
            initial_velocity: 0.0,
            stiffness: params.stiffness(),
            damping: params.damping(),
            rest_threshold: DEFAULT_REST_THRESHOLD,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            at_rest: false,
        }
    }

    /// Start moving at `velocity` (points/s). Non-finite values are ignored.
    #[must_use]
    pub fn with_velocity(mut self, velocity: f64) -> Self {
        if velocity.is_finite() {
            self.velocity = velocity;
            self.initial_velocity = velocity;
        }
        self
    }

    #[must_use]
    pub fn with_rest_threshold(mut self, threshold: f64) -> Self {
        self.rest_threshold = threshold.abs();
        self
    }

    #[must_use]
    pub fn with_velocity_threshold(mut self, threshold: f64) -> Self {
        self.velocity_threshold = threshold.abs();
        self
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[inline]
    #[must_use]
    pub fn initial(&self) -> f64 {
        self.initial
    }

    #[inline]
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    /// Change the target. Wakes the spring if it moved meaningfully.
    pub fn set_target(&mut self, target: f64) {
        if (self.target - target).abs() > self.rest_threshold {
            self.target = target;
            self.at_rest = false;
        }
    }

    /// Add to velocity and wake the spring.
    pub fn impulse(&mut self, velocity_delta: f64) {
        self.velocity += velocity_delta;
        self.at_rest = false;
    }

    /// Fraction of the initial distance already covered, clamped to `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        let span = self.target - self.initial;
        if span.abs() <= f64::EPSILON {
            return if self.at_rest { 1.0 } else { 0.0 };
        }
        ((self.position - self.initial) / span).clamp(0.0, 1.0)
    }

    // Semi-implicit Euler: velocity first, then position from the new velocity.
    fn step(&mut self, dt: f64) {
        let displacement = self.position - self.target;
        let acceleration = -self.stiffness * displacement - self.damping * self.velocity;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }

    /// Advance by `dt`, subdividing for stability.
    pub fn advance(&mut self, dt: Duration) {
        if self.at_rest {
            return;
        }
        let mut remaining = dt.as_secs_f64();
        if remaining <= 0.0 {
            return;
        }
        while remaining > 0.0 {
            let step_dt = remaining.min(MAX_STEP_SECS);
            self.step(step_dt);
            remaining -= step_dt;
        }

        let settled = (self.position - self.target).abs() < self.rest_threshold
            && self.velocity.abs() < self.velocity_threshold;
        if settled {
            self.position = self.target;
            self.velocity = 0.0;
            self.at_rest = true;
        }
    }
}

impl Animation for Spring {
    fn tick(&mut self, dt: Duration) {
        self.advance(dt);
    }

    fn is_complete(&self) -> bool {
        self.at_rest
    }

    fn value(&self) -> f32 {
        self.progress() as f32
    }

    fn reset(&mut self) {
        self.position = self.initial;
        self.velocity = self.initial_velocity;
        self.at_rest = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    fn run(spring: &mut Spring, frames: usize) {
        for _ in 0..frames {
            spring.tick(FRAME);
        }
    }

    #[test]
    fn params_reject_out_of_range() {
        assert!(SpringParams::new(1.2, 0.4).is_err());
        assert!(SpringParams::new(-0.1, 0.4).is_err());
        assert!(SpringParams::new(0.9, 0.0).is_err());
        assert!(SpringParams::new(0.9, -1.0).is_err());
        assert!(SpringParams::new(f64::NAN, 0.4).is_err());
        assert!(SpringParams::new(0.0, 0.4).is_ok());
        assert!(SpringParams::new(1.0, 0.4).is_ok());
    }

    #[test]
    fn params_convert_to_physical_coefficients() {
        let p = SpringParams::new(1.0, 1.0).unwrap();
        assert!((p.stiffness() - TAU * TAU).abs() < 1e-9);
        assert!((p.damping() - 2.0 * TAU).abs() < 1e-9);
    }

    #[test]
    fn default_params() {
        let p = SpringParams::default();
        assert_eq!(p.damping_ratio(), 0.9);
        assert_eq!(p.response(), 0.4);
        let secs = p.settling_duration().as_secs_f64();
        assert!(secs > 0.3 && secs < 0.8, "settling: {secs}");
    }

    #[test]
    fn undamped_settling_duration_is_bounded() {
        let p = SpringParams::new(0.0, 0.5).unwrap();
        assert_eq!(p.settling_duration(), Duration::from_secs(5));
    }

    #[test]
    fn reaches_target_and_snaps() {
        let mut spring = Spring::new(SpringParams::default(), 440.0, 48.0);
        run(&mut spring, 120);
        assert!(spring.is_complete());
        assert_eq!(spring.position(), 48.0);
        assert_eq!(spring.velocity(), 0.0);
        assert!((spring.value() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn initial_velocity_carries_forward() {
        let mut still = Spring::new(SpringParams::default(), 440.0, 800.0);
        let mut flung = Spring::new(SpringParams::default(), 440.0, 800.0).with_velocity(2_000.0);
        still.tick(FRAME);
        flung.tick(FRAME);
        assert!(flung.position() > still.position());
    }

    #[test]
    fn opposing_velocity_briefly_moves_away() {
        let mut spring = Spring::new(SpringParams::default(), 440.0, 800.0).with_velocity(-1_500.0);
        spring.tick(FRAME);
        assert!(spring.position() < 440.0, "position: {}", spring.position());
        run(&mut spring, 200);
        assert_eq!(spring.position(), 800.0);
    }

    #[test]
    fn near_critical_damping_overshoots_little() {
        let mut spring = Spring::new(SpringParams::default(), 440.0, 48.0);
        let mut min_pos = f64::MAX;
        for _ in 0..200 {
            spring.tick(FRAME);
            min_pos = min_pos.min(spring.position());
        }
        assert!(48.0 - min_pos < 2.0, "overshoot: {}", 48.0 - min_pos);
    }

    #[test]
    fn zero_damping_never_rests() {
        let mut spring = Spring::new(SpringParams::new(0.0, 0.4).unwrap(), 0.0, 100.0);
        run(&mut spring, 500);
        assert!(!spring.is_complete());
    }

    #[test]
    fn large_dt_is_subdivided() {
        let mut spring = Spring::new(SpringParams::default(), 0.0, 100.0);
        spring.tick(Duration::from_secs(5));
        assert_eq!(spring.position(), 100.0);
    }

    #[test]
    fn zero_dt_is_noop() {
        let mut spring = Spring::new(SpringParams::default(), 10.0, 100.0).with_velocity(50.0);
        spring.tick(Duration::ZERO);
        assert_eq!(spring.position(), 10.0);
        assert_eq!(spring.velocity(), 50.0);
    }

    #[test]
    fn set_target_wakes_only_beyond_threshold() {
        let mut spring = Spring::new(SpringParams::default(), 0.0, 100.0);
        run(&mut spring, 200);
        assert!(spring.is_complete());
        spring.set_target(100.01);
        assert!(spring.is_complete());
        spring.set_target(120.0);
        assert!(!spring.is_complete());
    }

    #[test]
    fn reset_restores_initial_velocity() {
        let mut spring = Spring::new(SpringParams::default(), 0.0, 100.0).with_velocity(30.0);
        run(&mut spring, 10);
        spring.reset();
        assert_eq!(spring.position(), 0.0);
        assert_eq!(spring.velocity(), 30.0);
        assert!(!spring.is_complete());
    }

    #[test]
    fn deterministic_across_runs() {
        let trace = || {
            let mut spring = Spring::new(SpringParams::default(), 440.0, 48.0).with_velocity(-900.0);
            (0..40)
                .map(|_| {
                    spring.tick(FRAME);
                    spring.position()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(trace(), trace());
    }

    #[test]
    fn params_serde_validates() {
        let ok: SpringParams =
            serde_json::from_str(r#"{"damping_ratio":0.8,"response":0.3}"#).unwrap();
        assert_eq!(ok.damping_ratio(), 0.8);
        assert!(serde_json::from_str::<SpringParams>(r#"{"damping_ratio":2.0,"response":0.3}"#).is_err());
    }
}
