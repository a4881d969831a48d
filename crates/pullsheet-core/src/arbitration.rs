#![forbid(unsafe_code)]

//! Gesture arbitration: may a panel drag begin, and must it yield?
//!
//! # Rules
//!
//! | Direction | Begins when |
//! |-----------|-------------|
//! | Up        | not at collapsed height and the panel is resizable |
//! | Down      | always |
//! | Idle      | not at collapsed height |
//!
//! A nested scrollable view keeps its own gesture while it is scrolled away
//! from its top. Once it reaches the top, the panel drag wins so a continued
//! pull resizes the panel instead of over-scrolling the content.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::offsets::{OffsetConfiguration, SettleTarget};

/// Velocity (points/s) below which a drag is considered idle.
pub const DEFAULT_IDLE_VELOCITY_EPSILON: f64 = 20.0;

/// Distance (points) within which the panel counts as at collapsed height.
pub const DEFAULT_COLLAPSED_EPSILON: f64 = 0.5;

/// Net vertical direction of a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragDirection {
    Up,
    Down,
    Idle,
}

impl DragDirection {
    /// Classify a vertical velocity; screen Y grows downward.
    #[must_use]
    pub fn from_velocity(velocity_y: f64, idle_epsilon: f64) -> Self {
        if !velocity_y.is_finite() || velocity_y.abs() < idle_epsilon {
            Self::Idle
        } else if velocity_y < 0.0 {
            Self::Up
        } else {
            Self::Down
        }
    }
}

/// Scroll state of a nested view competing for the same touch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NestedScrollState {
    /// The competing recognizer belongs to a descendant of the panel.
    pub is_descendant: bool,
    pub is_scrollable: bool,
    pub offset_y: f64,
}

impl NestedScrollState {
    #[must_use]
    pub const fn scrollable(offset_y: f64) -> Self {
        Self {
            is_descendant: true,
            is_scrollable: true,
            offset_y,
        }
    }
}

/// Decides drag admission against panel state and nested content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureArbitration {
    idle_velocity_epsilon: f64,
    collapsed_epsilon: f64,
}

impl Default for GestureArbitration {
    fn default() -> Self {
        Self {
            idle_velocity_epsilon: DEFAULT_IDLE_VELOCITY_EPSILON,
            collapsed_epsilon: DEFAULT_COLLAPSED_EPSILON,
        }
    }
}

impl GestureArbitration {
    pub fn new(idle_velocity_epsilon: f64, collapsed_epsilon: f64) -> Result<Self, ConfigError> {
        for (field, value) in [
            ("idle_velocity_epsilon", idle_velocity_epsilon),
            ("collapsed_epsilon", collapsed_epsilon),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::tunable(
                    field,
                    format!("must be finite and >= 0, got {value}"),
                ));
            }
        }
        Ok(Self {
            idle_velocity_epsilon,
            collapsed_epsilon,
        })
    }

    #[must_use]
    pub fn direction(&self, velocity_y: f64) -> DragDirection {
        DragDirection::from_velocity(velocity_y, self.idle_velocity_epsilon)
    }

    #[must_use]
    pub fn is_at_collapsed_height(&self, panel_y: f64, offsets: &OffsetConfiguration) -> bool {
        offsets.is_at(SettleTarget::Final, panel_y, self.collapsed_epsilon)
    }

    /// Whether a panel drag in `direction` may begin.
    #[must_use]
    pub fn should_begin(
        &self,
        direction: DragDirection,
        is_at_collapsed_height: bool,
        offsets: &OffsetConfiguration,
    ) -> bool {
        match direction {
            DragDirection::Up => !is_at_collapsed_height && !offsets.is_fixed_height(),
            DragDirection::Down => true,
            DragDirection::Idle => !is_at_collapsed_height,
        }
    }

    /// Whether the panel drag should give way to a nested recognizer.
    #[must_use]
    pub fn should_yield_to(&self, other: &NestedScrollState) -> bool {
        other.is_descendant
            && other.is_scrollable
            && other.offset_y.is_finite()
            && other.offset_y != 0.0
    }
}
