#![forbid(unsafe_code)]

//! Configuration error taxonomy.
//!
//! Every constructor that accepts offsets or tunables validates them and
//! returns [`ConfigError`] on failure. An engine object holding invalid
//! configuration can therefore never exist; integrators should treat any
//! `Err` here as a programming error rather than a runtime condition.

use thiserror::Error;

/// Invalid offsets, spring parameters, or tunables.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error(
        "offsets must satisfy final <= initial <= screen bottom \
         (final={final_top}, initial={initial_top}, screen={screen_bottom})"
    )]
    InvalidOffsets {
        final_top: f64,
        initial_top: f64,
        screen_bottom: f64,
    },

    #[error("{field} must be finite")]
    NonFinite { field: &'static str },

    #[error(
        "spring parameters out of range: damping ratio must be in [0, 1] \
         and response > 0 (damping_ratio={damping_ratio}, response={response})"
    )]
    InvalidSpring { damping_ratio: f64, response: f64 },

    #[error("invalid {field}: {reason}")]
    InvalidTunable { field: &'static str, reason: String },
}

impl ConfigError {
    #[must_use]
    pub fn tunable(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidTunable {
            field,
            reason: reason.into(),
        }
    }
}

/// Reject NaN and infinities for a named field.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { field })
    }
}
