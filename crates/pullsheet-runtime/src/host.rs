#![forbid(unsafe_code)]

//! Host capability boundary.
//!
//! The engine never owns host surfaces. It refers to them by [`SurfaceId`]
//! and asks the host, through [`SceneHost`], whether each one is still alive
//! before touching it. A surface the host no longer knows about turns every
//! operation on it into a no-op.

use pullsheet_core::coupling::TransformState;
use serde::{Deserialize, Serialize};

/// Opaque, non-owning handle to a host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(u64);

impl SurfaceId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Untransformed vertical geometry of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceFrame {
    pub origin_y: f64,
    pub height: f64,
}

impl SurfaceFrame {
    #[must_use]
    pub const fn new(origin_y: f64, height: f64) -> Self {
        Self { origin_y, height }
    }
}

/// What the engine needs from the host toolkit.
///
/// All calls happen on the host's UI thread.
pub trait SceneHost {
    /// Current frame, or `None` when the surface has been released.
    fn frame(&self, surface: SurfaceId) -> Option<SurfaceFrame>;

    /// Move a surface's top edge. Returns `false` when the surface is gone.
    fn set_origin_y(&mut self, surface: SurfaceId, y: f64) -> bool;

    /// Replace a surface's transform. Returns `false` when the surface is gone.
    fn set_transform(&mut self, surface: SurfaceId, transform: TransformState) -> bool;

    /// Presenting ancestors above `surface`, nearest first.
    fn ancestors(&self, surface: SurfaceId) -> Vec<SurfaceId>;

    /// Ask the host to dismiss the panel's presentation.
    fn request_dismiss(&mut self, panel: SurfaceId);

    /// Liveness check.
    fn is_alive(&self, surface: SurfaceId) -> bool {
        self.frame(surface).is_some()
    }
}
