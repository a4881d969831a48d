#![forbid(unsafe_code)]

//! Settle resolution: where a released panel comes to rest.
//!
//! # Policies
//!
//! - [`SettlePolicy::VelocityProjected`] projects the release velocity
//!   forward with an exponential-decay model and buckets the projected rest
//!   position against divides placed at `divide_fraction` of each zone:
//!
//!   ```text
//!   projected = (velocity / 1000) * k / (1 - k)
//!   expected  = end + projected
//!   upper     = final   + (initial - final)   * fraction
//!   lower     = initial + (screen  - initial) * fraction
//!   ```
//!
//!   When the panel is released strictly between final and initial while
//!   moving down, the decision is restricted to `{Final, Initial}` so a slow
//!   downward flick from the upper band never dismisses.
//!
//! - [`SettlePolicy::Midpoint`] ignores velocity and buckets the end position
//!   at the arithmetic midpoints of each zone.
//!
//! # Invariants
//!
//! 1. Resolution is total: every input, including non-finite velocity,
//!    yields exactly one [`SettleTarget`].
//! 2. With zero velocity the target is monotone in end position.
//! 3. Divides are inclusive on the upper side: `expected <= upper` is Final,
//!    `expected <= lower` is Initial.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::offsets::{OffsetConfiguration, SettleTarget};

/// Default fraction of each zone at which the divide sits.
pub const DEFAULT_DIVIDE_FRACTION: f64 = 0.6;

/// Per-millisecond velocity retention used for fling projection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecelerationRate {
    /// 0.998: long, gliding flings.
    #[default]
    Normal,
    /// 0.99: short flings.
    Fast,
    Custom(f64),
}

impl DecelerationRate {
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::Normal => 0.998,
            Self::Fast => 0.99,
            Self::Custom(k) => k,
        }
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        let k = self.value();
        if k.is_finite() && k > 0.0 && k < 1.0 {
            Ok(self)
        } else {
            Err(ConfigError::tunable(
                "deceleration",
                format!("rate must be in (0, 1), got {k}"),
            ))
        }
    }

    /// Distance travelled before a fling at `velocity` (points/s) decays to rest.
    #[must_use]
    pub fn project(self, velocity: f64) -> f64 {
        if !velocity.is_finite() {
            return 0.0;
        }
        let k = self.value();
        (velocity / 1_000.0) * k / (1.0 - k)
    }
}

/// Which bucketing rule to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlePolicy {
    #[default]
    VelocityProjected,
    Midpoint,
}

/// The rule that produced a decision, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleRule {
    /// Released in the upper band while moving down.
    UpperBandDownward,
    /// Projected position bucketed against the fractional divides.
    Projected,
    /// End position bucketed against zone midpoints.
    Midpoint,
}

/// Full settle decision with the numbers that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettleDecision {
    pub target: SettleTarget,
    pub end_y: f64,
    pub expected_y: f64,
    pub upper_divide: f64,
    pub lower_divide: f64,
    pub rule: SettleRule,
}

/// Maps a drag's end state to a settle target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettleResolver {
    policy: SettlePolicy,
    deceleration: DecelerationRate,
    divide_fraction: f64,
}

impl Default for SettleResolver {
    fn default() -> Self {
        Self {
            policy: SettlePolicy::VelocityProjected,
            deceleration: DecelerationRate::Normal,
            divide_fraction: DEFAULT_DIVIDE_FRACTION,
        }
    }
}

impl SettleResolver {
    pub fn new(
        policy: SettlePolicy,
        deceleration: DecelerationRate,
        divide_fraction: f64,
    ) -> Result<Self, ConfigError> {
        let deceleration = deceleration.validate()?;
        if !(divide_fraction.is_finite() && (0.0..=1.0).contains(&divide_fraction)) {
            return Err(ConfigError::tunable(
                "divide_fraction",
                format!("must be in [0, 1], got {divide_fraction}"),
            ));
        }
        Ok(Self {
            policy,
            deceleration,
            divide_fraction,
        })
    }

    #[must_use]
    pub const fn policy(&self) -> SettlePolicy {
        self.policy
    }

    #[must_use]
    pub const fn deceleration(&self) -> DecelerationRate {
        self.deceleration
    }

    /// Resolve a target under the configured policy.
    #[must_use]
    pub fn resolve(&self, end_y: f64, velocity_y: f64, offsets: &OffsetConfiguration) -> SettleTarget {
        self.decide(end_y, velocity_y, offsets).target
    }

    /// Resolve a target when the host may not report velocity.
    ///
    /// A missing velocity always uses the midpoint rule.
    #[must_use]
    pub fn resolve_with_optional_velocity(
        &self,
        end_y: f64,
        velocity_y: Option<f64>,
        offsets: &OffsetConfiguration,
    ) -> SettleTarget {
        match velocity_y {
            Some(v) => self.resolve(end_y, v, offsets),
            None => midpoint(end_y, offsets).target,
        }
    }

    /// Resolve and report how the target was chosen.
    #[must_use]
    pub fn decide(&self, end_y: f64, velocity_y: f64, offsets: &OffsetConfiguration) -> SettleDecision {
        let end_y = if end_y.is_finite() {
            offsets.clamp(end_y)
        } else {
            offsets.initial_top_offset()
        };
        let decision = match self.policy {
            SettlePolicy::Midpoint => midpoint(end_y, offsets),
            SettlePolicy::VelocityProjected => self.projected(end_y, velocity_y, offsets),
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: "pullsheet.settle",
            end_y = decision.end_y,
            expected_y = decision.expected_y,
            upper = decision.upper_divide,
            lower = decision.lower_divide,
            rule = ?decision.rule,
            target_kind = ?decision.target,
            "settle resolved"
        );

        decision
    }

    fn projected(&self, end_y: f64, velocity_y: f64, offsets: &OffsetConfiguration) -> SettleDecision {
        let expected_y = end_y + self.deceleration.project(velocity_y);
        let upper_divide = offsets.upper_divide(self.divide_fraction);
        let lower_divide = offsets.lower_divide(self.divide_fraction);

        let moving_down = velocity_y.is_finite() && velocity_y > 0.0;
        let (target, rule) = if offsets.in_upper_band(end_y) && moving_down {
            let target = if expected_y <= upper_divide {
                SettleTarget::Final
            } else {
                SettleTarget::Initial
            };
            (target, SettleRule::UpperBandDownward)
        } else {
            (
                bucket(expected_y, upper_divide, lower_divide),
                SettleRule::Projected,
            )
        };

        SettleDecision {
            target,
            end_y,
            expected_y,
            upper_divide,
            lower_divide,
            rule,
        }
    }
}

fn midpoint(end_y: f64, offsets: &OffsetConfiguration) -> SettleDecision {
    let upper_divide = offsets.upper_divide(0.5);
    let lower_divide = offsets.lower_divide(0.5);
    SettleDecision {
        target: bucket(end_y, upper_divide, lower_divide),
        end_y,
        expected_y: end_y,
        upper_divide,
        lower_divide,
        rule: SettleRule::Midpoint,
    }
}

fn bucket(y: f64, upper_divide: f64, lower_divide: f64) -> SettleTarget {
    if y <= upper_divide {
        SettleTarget::Final
    } else if y <= lower_divide {
        SettleTarget::Initial
    } else {
        SettleTarget::Dismissed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets() -> OffsetConfiguration {
        OffsetConfiguration::new(48.0, 440.0, 800.0).unwrap()
    }

    #[test]
    fn normal_projection_constant() {
        // 0.998 / 0.002 = 499 points per 1000 points/s.
        let p = DecelerationRate::Normal.project(1_000.0);
        assert!((p - 499.0).abs() < 1e-6, "projection: {p}");
        assert_eq!(DecelerationRate::Normal.project(f64::NAN), 0.0);
    }

    #[test]
    fn at_rest_release_in_middle_zone_is_initial() {
        let d = SettleResolver::default().decide(500.0, 0.0, &offsets());
        assert_eq!(d.target, SettleTarget::Initial);
        assert_eq!(d.rule, SettleRule::Projected);
        assert!((d.upper_divide - 283.2).abs() < 1e-9);
        assert!((d.lower_divide - 656.0).abs() < 1e-9);
    }

    #[test]
    fn at_rest_release_below_lower_divide_dismisses() {
        assert_eq!(
            SettleResolver::default().resolve(700.0, 0.0, &offsets()),
            SettleTarget::Dismissed
        );
    }

    #[test]
    fn divides_are_inclusive() {
        let resolver = SettleResolver::default();
        assert_eq!(resolver.resolve(656.0, 0.0, &offsets()), SettleTarget::Initial);
        assert_eq!(resolver.resolve(656.01, 0.0, &offsets()), SettleTarget::Dismissed);
    }

    #[test]
    fn upward_fling_from_initial_reaches_final() {
        // 440 - 499 * 0.5 = 190.5 <= 283.2
        assert_eq!(
            SettleResolver::default().resolve(440.0, -500.0, &offsets()),
            SettleTarget::Final
        );
    }

    #[test]
    fn hard_downward_fling_from_initial_dismisses() {
        assert_eq!(
            SettleResolver::default().resolve(450.0, 1_000.0, &offsets()),
            SettleTarget::Dismissed
        );
    }

    #[test]
    fn downward_fling_from_upper_band_never_dismisses() {
        let d = SettleResolver::default().decide(300.0, 3_000.0, &offsets());
        assert!(d.expected_y > d.lower_divide);
        assert_eq!(d.rule, SettleRule::UpperBandDownward);
        assert_eq!(d.target, SettleTarget::Initial);
    }

    #[test]
    fn gentle_downward_motion_in_upper_band_can_stay_final() {
        let d = SettleResolver::default().decide(100.0, 50.0, &offsets());
        assert_eq!(d.rule, SettleRule::UpperBandDownward);
        assert_eq!(d.target, SettleTarget::Final);
    }

    #[test]
    fn upward_motion_in_upper_band_uses_general_rule() {
        let d = SettleResolver::default().decide(300.0, -10.0, &offsets());
        assert_eq!(d.rule, SettleRule::Projected);
    }

    #[test]
    fn midpoint_policy_ignores_velocity() {
        let resolver =
            SettleResolver::new(SettlePolicy::Midpoint, DecelerationRate::Normal, 0.6).unwrap();
        assert_eq!(resolver.resolve(600.0, 5_000.0, &offsets()), SettleTarget::Initial);
        assert_eq!(resolver.resolve(621.0, -5_000.0, &offsets()), SettleTarget::Dismissed);
        assert_eq!(resolver.resolve(244.0, 0.0, &offsets()), SettleTarget::Final);
    }

    #[test]
    fn missing_velocity_falls_back_to_midpoints() {
        let resolver = SettleResolver::default();
        // 630 is Initial under 0.6 divides but Dismissed under midpoints.
        assert_eq!(resolver.resolve(630.0, 0.0, &offsets()), SettleTarget::Initial);
        assert_eq!(
            resolver.resolve_with_optional_velocity(630.0, None, &offsets()),
            SettleTarget::Dismissed
        );
    }

    #[test]
    fn non_finite_inputs_still_resolve() {
        let resolver = SettleResolver::default();
        assert_eq!(resolver.resolve(f64::NAN, 0.0, &offsets()), SettleTarget::Initial);
        assert_eq!(
            resolver.resolve(500.0, f64::INFINITY, &offsets()),
            SettleTarget::Initial
        );
    }

    #[test]
    fn fixed_height_panel_only_settles_or_dismisses() {
        let fixed = OffsetConfiguration::fixed(440.0, 800.0).unwrap();
        let resolver = SettleResolver::default();
        assert_eq!(resolver.resolve(440.0, 0.0, &fixed), SettleTarget::Final);
        assert_eq!(resolver.resolve(700.0, 0.0, &fixed), SettleTarget::Dismissed);
    }

    #[test]
    fn rejects_bad_tunables() {
        assert!(
            SettleResolver::new(SettlePolicy::VelocityProjected, DecelerationRate::Custom(1.0), 0.6)
                .is_err()
        );
        assert!(
            SettleResolver::new(SettlePolicy::VelocityProjected, DecelerationRate::Normal, 1.5)
                .is_err()
        );
        assert!(
            SettleResolver::new(SettlePolicy::VelocityProjected, DecelerationRate::Fast, 0.5).is_ok()
        );
    }
}
