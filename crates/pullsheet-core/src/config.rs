#![forbid(unsafe_code)]

//! Engine tunables as data.
//!
//! [`SheetConfig`] gathers every constant the engine uses so it can be
//! loaded from TOML or JSON at startup instead of being compiled in.
//!
//! ```toml
//! # pullsheet.toml
//! peek_constant = 12.0
//! settle_policy = "midpoint"
//!
//! [spring]
//! damping_ratio = 0.85
//! response = 0.35
//! ```
//!
//! ```rust,ignore
//! let config = SheetConfig::from_toml_file("pullsheet.toml")?.into_validated()?;
//! ```
//!
//! # Defaults
//!
//! `SheetConfig::default()` reproduces the built-in constants exactly, and
//! every field is optional in files.

#[cfg(feature = "config-files")]
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::{Easing, SpringParams};
use crate::arbitration::{DEFAULT_COLLAPSED_EPSILON, DEFAULT_IDLE_VELOCITY_EPSILON, GestureArbitration};
use crate::coupling::{
    DEFAULT_MAX_ANCESTOR_DEPTH, DEFAULT_MIDDLE_FALLBACK_FRACTION, DEFAULT_MIN_SCALE_FLOOR,
    DEFAULT_PEEK_CONSTANT, TransformCoupling,
};
use crate::error::ConfigError;
use crate::settle::{DEFAULT_DIVIDE_FRACTION, DecelerationRate, SettlePolicy, SettleResolver};

/// Modal enter/exit timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionTuning {
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Default for TransitionTuning {
    fn default() -> Self {
        Self {
            duration_ms: 400,
            easing: Easing::EaseOut,
        }
    }
}

impl TransitionTuning {
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Every engine tunable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub peek_constant: f64,
    pub divide_fraction: f64,
    pub deceleration: DecelerationRate,
    pub settle_policy: SettlePolicy,
    pub spring: SpringParams,
    pub idle_velocity_epsilon: f64,
    pub collapsed_epsilon: f64,
    pub max_ancestor_depth: usize,
    pub middle_fallback_fraction: f64,
    pub min_scale_floor: f64,
    pub transition: TransitionTuning,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            peek_constant: DEFAULT_PEEK_CONSTANT,
            divide_fraction: DEFAULT_DIVIDE_FRACTION,
            deceleration: DecelerationRate::Normal,
            settle_policy: SettlePolicy::VelocityProjected,
            spring: SpringParams::default(),
            idle_velocity_epsilon: DEFAULT_IDLE_VELOCITY_EPSILON,
            collapsed_epsilon: DEFAULT_COLLAPSED_EPSILON,
            max_ancestor_depth: DEFAULT_MAX_ANCESTOR_DEPTH,
            middle_fallback_fraction: DEFAULT_MIDDLE_FALLBACK_FRACTION,
            min_scale_floor: DEFAULT_MIN_SCALE_FLOOR,
            transition: TransitionTuning::default(),
        }
    }
}

impl SheetConfig {
    #[cfg(feature = "config-files")]
    pub fn from_toml_str(s: &str) -> Result<Self, SheetConfigError> {
        toml::from_str(s).map_err(SheetConfigError::Toml)
    }

    #[cfg(feature = "config-files")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, SheetConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    #[cfg(feature = "config-files")]
    pub fn from_json_str(s: &str) -> Result<Self, SheetConfigError> {
        serde_json::from_str(s).map_err(SheetConfigError::Json)
    }

    #[cfg(feature = "config-files")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SheetConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Every problem with this configuration; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Err(err) = self.resolver() {
            errors.push(err.to_string());
        }
        if let Err(err) = self.coupling() {
            errors.push(err.to_string());
        }
        if let Err(err) = self.arbitration() {
            errors.push(err.to_string());
        }
        if self.transition.duration_ms == 0 {
            errors.push("transition.duration_ms must be > 0".into());
        }
        errors
    }

    pub fn into_validated(self) -> Result<Self, SheetConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(SheetConfigError::Validation(errors))
        }
    }

    pub fn resolver(&self) -> Result<SettleResolver, ConfigError> {
        SettleResolver::new(self.settle_policy, self.deceleration, self.divide_fraction)
    }

    pub fn coupling(&self) -> Result<TransformCoupling, ConfigError> {
        TransformCoupling::new(
            self.peek_constant,
            self.middle_fallback_fraction,
            self.min_scale_floor,
            self.max_ancestor_depth,
        )
    }

    pub fn arbitration(&self) -> Result<GestureArbitration, ConfigError> {
        GestureArbitration::new(self.idle_velocity_epsilon, self.collapsed_epsilon)
    }
}

/// Failure to load or validate a [`SheetConfig`].
#[derive(Debug, Error)]
pub enum SheetConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "config-files")]
    #[error("TOML parse error: {0}")]
    Toml(toml::de::Error),

    #[cfg(feature = "config-files")]
    #[error("JSON parse error: {0}")]
    Json(serde_json::Error),

    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
