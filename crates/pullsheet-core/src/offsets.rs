#![forbid(unsafe_code)]

//! Boundary offsets for a resizable panel.
//!
//! All offsets are panel top-edge Y coordinates measured from the top of the
//! screen, so a *smaller* value means a *taller* panel.
//!
//! ```text
//!  0 ─────────────── screen top
//!  final_top      ── collapsed / tallest          (SettleTarget::Final)
//!  initial_top    ── expanded / resting height    (SettleTarget::Initial)
//!  screen_bottom  ── off-screen                   (SettleTarget::Dismissed)
//! ```
//!
//! # Invariants
//!
//! 1. `final_top <= initial_top <= screen_bottom`, all finite.
//! 2. The configuration is immutable once built; overriding it with content
//!    preferences produces a new validated value.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ensure_finite};
use crate::preferences::PositionPreferences;

/// One of the three discrete resting offsets.
///
/// Ordering follows the offsets: `Final < Initial < Dismissed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleTarget {
    Final,
    Initial,
    Dismissed,
}

impl SettleTarget {
    pub const ALL: [Self; 3] = [Self::Final, Self::Initial, Self::Dismissed];

    #[must_use]
    pub const fn is_dismissal(self) -> bool {
        matches!(self, Self::Dismissed)
    }
}

/// Validated boundary offsets, owned by one panel controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOffsets", into = "RawOffsets")]
pub struct OffsetConfiguration {
    final_top: f64,
    initial_top: f64,
    screen_bottom: f64,
}

#[derive(Serialize, Deserialize)]
struct RawOffsets {
    final_top_offset: f64,
    initial_top_offset: f64,
    screen_bottom_offset: f64,
}

impl TryFrom<RawOffsets> for OffsetConfiguration {
    type Error = ConfigError;

    fn try_from(raw: RawOffsets) -> Result<Self, Self::Error> {
        Self::new(
            raw.final_top_offset,
            raw.initial_top_offset,
            raw.screen_bottom_offset,
        )
    }
}

impl From<OffsetConfiguration> for RawOffsets {
    fn from(config: OffsetConfiguration) -> Self {
        Self {
            final_top_offset: config.final_top,
            initial_top_offset: config.initial_top,
            screen_bottom_offset: config.screen_bottom,
        }
    }
}

impl OffsetConfiguration {
    /// Build a configuration, rejecting non-finite or misordered offsets.
    pub fn new(final_top: f64, initial_top: f64, screen_bottom: f64) -> Result<Self, ConfigError> {
        let final_top = ensure_finite("final_top_offset", final_top)?;
        let initial_top = ensure_finite("initial_top_offset", initial_top)?;
        let screen_bottom = ensure_finite("screen_bottom_offset", screen_bottom)?;
        if final_top > initial_top || initial_top > screen_bottom {
            return Err(ConfigError::InvalidOffsets {
                final_top,
                initial_top,
                screen_bottom,
            });
        }
        Ok(Self {
            final_top,
            initial_top,
            screen_bottom,
        })
    }

    /// A fixed-height panel: `final == initial`.
    pub fn fixed(top: f64, screen_bottom: f64) -> Result<Self, ConfigError> {
        Self::new(top, top, screen_bottom)
    }

    /// Apply offsets declared by the presented content.
    ///
    /// Offsets the content leaves undeclared keep their current value; the
    /// screen bottom is never overridden.
    pub fn with_preferences(self, prefs: &PositionPreferences) -> Result<Self, ConfigError> {
        Self::new(
            prefs.declared_final_top_offset().unwrap_or(self.final_top),
            prefs
                .declared_initial_top_offset()
                .unwrap_or(self.initial_top),
            self.screen_bottom,
        )
    }

    #[inline]
    #[must_use]
    pub const fn final_top_offset(&self) -> f64 {
        self.final_top
    }

    #[inline]
    #[must_use]
    pub const fn initial_top_offset(&self) -> f64 {
        self.initial_top
    }

    #[inline]
    #[must_use]
    pub const fn screen_bottom_offset(&self) -> f64 {
        self.screen_bottom
    }

    /// Whether the panel can never change height by dragging upward.
    #[inline]
    #[must_use]
    pub fn is_fixed_height(&self) -> bool {
        self.initial_top == self.final_top
    }

    /// Offset for a settle target.
    #[must_use]
    pub const fn offset(&self, target: SettleTarget) -> f64 {
        match target {
            SettleTarget::Final => self.final_top,
            SettleTarget::Initial => self.initial_top,
            SettleTarget::Dismissed => self.screen_bottom,
        }
    }

    /// Clamp a raw position into `[final_top, screen_bottom]`.
    #[inline]
    #[must_use]
    pub fn clamp(&self, y: f64) -> f64 {
        y.max(self.final_top).min(self.screen_bottom)
    }

    /// Divide between the Final and Initial zones at `fraction` of the way down.
    #[must_use]
    pub fn upper_divide(&self, fraction: f64) -> f64 {
        self.final_top + (self.initial_top - self.final_top) * fraction
    }

    /// Divide between the Initial and Dismissed zones at `fraction` of the way down.
    #[must_use]
    pub fn lower_divide(&self, fraction: f64) -> f64 {
        self.initial_top + (self.screen_bottom - self.initial_top) * fraction
    }

    /// Whether `y` is at `target`'s offset within `epsilon`.
    #[must_use]
    pub fn is_at(&self, target: SettleTarget, y: f64, epsilon: f64) -> bool {
        (self.offset(target) - y).abs() <= epsilon
    }

    /// Whether `y` lies strictly between the Final and Initial offsets.
    #[must_use]
    pub fn in_upper_band(&self, y: f64) -> bool {
        y > self.final_top && y < self.initial_top
    }
}
