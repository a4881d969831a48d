#![forbid(unsafe_code)]

//! Transform coupling: the companion surface follows the panel.
//!
//! While the panel moves between its initial and final offsets, the surface
//! behind it (the *companion*) recedes: it shrinks toward a minimum scale and
//! slides so that its top edge peeks `peek_constant` points above the
//! panel's final offset.
//!
//! # Interpolation
//!
//! ```text
//! presented_max = initial            (or screen * (1 + 0.06) / 2 when fixed-height)
//! presented_min = final
//! percentage    = (presented_max - min(y, presented_max)) / (presented_max - presented_min)
//! scale         = lerp(1.0, min_scale, percentage)
//! top           = lerp(rest_y, peek_y, percentage)
//! ```
//!
//! Scale is applied about the surface center, which pushes the top edge down
//! by `height * (1 - scale) / 2`. [`TransformState::translate_y`] already
//! subtracts that shift, so the visual top edge lands exactly on `top`.
//!
//! # Nesting
//!
//! A panel presented from another panel couples to the parent panel, which in
//! turn couples to its own companion. [`TransformCoupling::couple_chain`]
//! walks those levels iteratively and stops at `max_depth`.
//!
//! # Invariants
//!
//! 1. `percentage` is always in `[0, 1]`, including for positions outside
//!    `[presented_min, presented_max]` and non-finite input.
//! 2. Every function here is pure; identical inputs give identical outputs.
//! 3. `min_scale` is in `[min_scale_floor, 1]`.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::offsets::OffsetConfiguration;

/// Points the companion peeks above the panel's final offset.
pub const DEFAULT_PEEK_CONSTANT: f64 = 10.0;

/// Fraction used for the fixed-height "middle" fallback offset.
pub const DEFAULT_MIDDLE_FALLBACK_FRACTION: f64 = 0.06;

/// Smallest scale the companion may shrink to.
pub const DEFAULT_MIN_SCALE_FLOOR: f64 = 0.5;

/// Maximum nesting levels walked before giving up on a malformed chain.
pub const DEFAULT_MAX_ANCESTOR_DEPTH: usize = 8;

const SPAN_EPSILON: f64 = 1e-9;

/// Vertical translation plus uniform scale about the surface center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    pub translate_y: f64,
    pub scale: f64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TransformState {
    pub const IDENTITY: Self = Self {
        translate_y: 0.0,
        scale: 1.0,
    };

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.translate_y == 0.0 && self.scale == 1.0
    }

    /// Visual top edge of a surface whose untransformed top is `rest_y`.
    #[must_use]
    pub fn visual_top(&self, rest_y: f64, height: f64) -> f64 {
        rest_y + height * (1.0 - self.scale) / 2.0 + self.translate_y
    }
}

/// How the parent panel recedes when a nested panel is presented over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestedSubMode {
    /// The parent lifts one peek step above its own top while shrinking.
    PopUp,
    /// The parent moves flush with the top of the screen while shrinking.
    FullScreen,
}

/// Geometry of a parent panel captured when the nested panel is presented.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParentPanel {
    pub offsets: OffsetConfiguration,
    pub top_y: f64,
}

/// Who the companion is and how it should be moved.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PresentationMode {
    /// Standalone: transform only the immediate presenter.
    #[default]
    None,
    /// Presented under host chrome: also reposition non-zero-origin ancestors.
    Default,
    /// Presented from another resizable panel.
    Custom {
        sub_mode: NestedSubMode,
        parent: ParentPanel,
    },
}

/// One level of a coupled chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoupledLevel {
    /// 0 is the immediate presenter.
    pub depth: usize,
    pub percentage: f64,
    /// Interpolated visual top edge.
    pub top_y: f64,
    pub transform: TransformState,
}

/// Pure interpolation engine for companion transforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformCoupling {
    peek_constant: f64,
    middle_fallback_fraction: f64,
    min_scale_floor: f64,
    max_depth: usize,
}

impl Default for TransformCoupling {
    fn default() -> Self {
        Self {
            peek_constant: DEFAULT_PEEK_CONSTANT,
            middle_fallback_fraction: DEFAULT_MIDDLE_FALLBACK_FRACTION,
            min_scale_floor: DEFAULT_MIN_SCALE_FLOOR,
            max_depth: DEFAULT_MAX_ANCESTOR_DEPTH,
        }
    }
}

impl TransformCoupling {
    pub fn new(
        peek_constant: f64,
        middle_fallback_fraction: f64,
        min_scale_floor: f64,
        max_depth: usize,
    ) -> Result<Self, ConfigError> {
        if !(peek_constant.is_finite() && peek_constant >= 0.0) {
            return Err(ConfigError::tunable(
                "peek_constant",
                format!("must be finite and >= 0, got {peek_constant}"),
            ));
        }
        if !(middle_fallback_fraction.is_finite() && (0.0..1.0).contains(&middle_fallback_fraction)) {
            return Err(ConfigError::tunable(
                "middle_fallback_fraction",
                format!("must be in [0, 1), got {middle_fallback_fraction}"),
            ));
        }
        if !(min_scale_floor.is_finite() && min_scale_floor > 0.0 && min_scale_floor <= 1.0) {
            return Err(ConfigError::tunable(
                "min_scale_floor",
                format!("must be in (0, 1], got {min_scale_floor}"),
            ));
        }
        if max_depth == 0 {
            return Err(ConfigError::tunable("max_ancestor_depth", "must be >= 1"));
        }
        Ok(Self {
            peek_constant,
            middle_fallback_fraction,
            min_scale_floor,
            max_depth,
        })
    }

    #[must_use]
    pub const fn peek_constant(&self) -> f64 {
        self.peek_constant
    }

    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Upper bound of the interpolation range.
    #[must_use]
    pub fn presented_max(&self, offsets: &OffsetConfiguration) -> f64 {
        if offsets.is_fixed_height() {
            offsets.screen_bottom_offset() * (1.0 + self.middle_fallback_fraction) / 2.0
        } else {
            offsets.initial_top_offset()
        }
    }

    /// How far the panel has travelled from `presented_max` toward final, in `[0, 1]`.
    #[must_use]
    pub fn percentage(&self, offsets: &OffsetConfiguration, panel_y: f64) -> f64 {
        if !panel_y.is_finite() {
            return 0.0;
        }
        let presented_max = self.presented_max(offsets);
        let presented_min = offsets.final_top_offset();
        let span = presented_max - presented_min;
        // A fixed-height panel placed at or below the middle fallback has
        // nothing to interpolate across.
        if span <= SPAN_EPSILON {
            return 0.0;
        }
        let clamped = panel_y.min(presented_max);
        ((presented_max - clamped) / span).clamp(0.0, 1.0)
    }

    /// Smallest companion scale for these offsets.
    ///
    /// Chosen so the scaled companion spans exactly from its peek position
    /// to the bottom of the screen.
    #[must_use]
    pub fn min_scale(&self, offsets: &OffsetConfiguration) -> f64 {
        let screen = offsets.screen_bottom_offset();
        if screen <= 0.0 {
            return 1.0;
        }
        let visible = screen - self.peek_y(offsets);
        (visible / screen).clamp(self.min_scale_floor, 1.0)
    }

    /// Top edge the companion reaches when the panel is fully collapsed.
    #[must_use]
    pub fn peek_y(&self, offsets: &OffsetConfiguration) -> f64 {
        offsets.final_top_offset() - self.peek_constant
    }

    /// Interpolated companion top for a surface resting at `rest_y`.
    #[must_use]
    pub fn companion_offset(&self, offsets: &OffsetConfiguration, panel_y: f64, rest_y: f64, peek_y: f64) -> f64 {
        lerp(rest_y, peek_y, self.percentage(offsets, panel_y))
    }

    /// Transform for the immediate presenter under `mode`.
    #[must_use]
    pub fn compute_companion_transform(
        &self,
        offsets: &OffsetConfiguration,
        panel_y: f64,
        mode: &PresentationMode,
    ) -> TransformState {
        self.level(offsets, panel_y, mode, 0).transform
    }

    /// Transform for a host-chrome ancestor whose captured top is `origin_y`.
    ///
    /// The ancestor shares the panel's percentage and shrinks by the same
    /// scale; its top edge is kept anchored on the interpolated offset.
    #[must_use]
    pub fn reposition_ancestor(
        &self,
        offsets: &OffsetConfiguration,
        panel_y: f64,
        origin_y: f64,
        height: f64,
    ) -> TransformState {
        let percentage = self.percentage(offsets, panel_y);
        let scale = lerp(1.0, self.min_scale(offsets), percentage);
        let top = lerp(origin_y, self.peek_y(offsets), percentage);
        anchored(top, origin_y, height, scale)
    }

    /// Walk nested panels outward from the immediate presenter.
    ///
    /// `outer_modes[i]` is the presentation mode of the parent panel at
    /// depth `i`; it is consulted only when depth `i` is itself a
    /// [`PresentationMode::Custom`] level. The walk stops at the first
    /// non-custom level, when `outer_modes` runs out, or at `max_depth`.
    #[must_use]
    pub fn couple_chain(
        &self,
        offsets: &OffsetConfiguration,
        panel_y: f64,
        mode: &PresentationMode,
        outer_modes: &[PresentationMode],
    ) -> Vec<CoupledLevel> {
        let mut levels = Vec::with_capacity(outer_modes.len() + 1);
        let mut offsets = *offsets;
        let mut panel_y = panel_y;
        let mut mode = *mode;

        for depth in 0..self.max_depth {
            let level = self.level(&offsets, panel_y, &mode, depth);
            levels.push(level);

            let PresentationMode::Custom { parent, .. } = mode else {
                break;
            };
            let Some(next_mode) = outer_modes.get(depth) else {
                break;
            };
            offsets = parent.offsets;
            panel_y = level.top_y;
            mode = *next_mode;
        }

        levels
    }

    fn level(
        &self,
        offsets: &OffsetConfiguration,
        panel_y: f64,
        mode: &PresentationMode,
        depth: usize,
    ) -> CoupledLevel {
        let percentage = self.percentage(offsets, panel_y);
        let scale = lerp(1.0, self.min_scale(offsets), percentage);
        let (rest_y, height, peek_y) = match mode {
            PresentationMode::None | PresentationMode::Default => {
                (0.0, offsets.screen_bottom_offset(), self.peek_y(offsets))
            }
            PresentationMode::Custom { sub_mode, parent } => {
                let height = (parent.offsets.screen_bottom_offset() - parent.top_y).max(0.0);
                let peek_y = match sub_mode {
                    NestedSubMode::PopUp => parent.top_y - self.peek_constant,
                    NestedSubMode::FullScreen => 0.0,
                };
                (parent.top_y, height, peek_y)
            }
        };
        let top_y = lerp(rest_y, peek_y, percentage);
        CoupledLevel {
            depth,
            percentage,
            top_y,
            transform: anchored(top_y, rest_y, height, scale),
        }
    }
}

/// Translation that puts the visual top of a centered-scaled surface at `top`.
fn anchored(top: f64, rest_y: f64, height: f64, scale: f64) -> TransformState {
    TransformState {
        translate_y: top - rest_y - height * (1.0 - scale) / 2.0,
        scale,
    }
}

#[inline]
fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}
