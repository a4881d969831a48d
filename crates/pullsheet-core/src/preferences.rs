#![forbid(unsafe_code)]

//! Presentation preferences declared by the presented content.
//!
//! Values here are plain data resolved once when a panel controller is
//! built. Lifecycle callbacks live in `pullsheet-runtime`.

use serde::{Deserialize, Serialize};

use crate::offsets::OffsetConfiguration;

/// Straight RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Dark gray (one-third white).
    pub const DARK_GRAY: Self = Self::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0, 1.0);

    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::DARK_GRAY.with_alpha(0.5)
    }
}

/// Offsets and indicator styling declared by presented content.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionPreferences {
    initial_top_offset: Option<f64>,
    final_top_offset: Option<f64>,
    show_slide_up_indication: Option<bool>,
    slider_color: Rgba,
}

impl PositionPreferences {
    #[must_use]
    pub fn with_initial_top_offset(mut self, value: f64) -> Self {
        self.initial_top_offset = Some(value);
        self
    }

    #[must_use]
    pub fn with_final_top_offset(mut self, value: f64) -> Self {
        self.final_top_offset = Some(value);
        self
    }

    #[must_use]
    pub fn with_slide_up_indication(mut self, show: bool) -> Self {
        self.show_slide_up_indication = Some(show);
        self
    }

    #[must_use]
    pub fn with_slider_color(mut self, color: Rgba) -> Self {
        self.slider_color = color;
        self
    }

    /// Declared initial offset, if any.
    #[must_use]
    pub const fn declared_initial_top_offset(&self) -> Option<f64> {
        self.initial_top_offset
    }

    /// Declared final offset, if any.
    #[must_use]
    pub const fn declared_final_top_offset(&self) -> Option<f64> {
        self.final_top_offset
    }

    /// Declared indicator visibility, if any.
    #[must_use]
    pub const fn declared_slide_up_indication(&self) -> Option<bool> {
        self.show_slide_up_indication
    }

    /// Whether the slide-up affordance should be drawn for a panel using
    /// `offsets`.
    ///
    /// An explicit declaration wins; otherwise the indicator shows when the
    /// panel can grow, i.e. `offsets` is not fixed-height. Pass the
    /// effective offsets, after [`OffsetConfiguration::with_preferences`].
    #[must_use]
    pub fn shows_slide_up_indication(&self, offsets: &OffsetConfiguration) -> bool {
        self.show_slide_up_indication
            .unwrap_or(!offsets.is_fixed_height())
    }

    #[must_use]
    pub const fn slider_color(&self) -> Rgba {
        self.slider_color
    }
}
