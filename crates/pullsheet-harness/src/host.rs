#![forbid(unsafe_code)]

//! In-memory scene host.

use std::collections::HashMap;

use pullsheet_core::coupling::TransformState;
use pullsheet_runtime::host::{SceneHost, SurfaceFrame, SurfaceId};

/// One write the engine made to the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostWrite {
    Origin { surface: SurfaceId, y: f64 },
    Transform { surface: SurfaceId, transform: TransformState },
    Dismiss { panel: SurfaceId },
}

#[derive(Debug, Clone, Copy)]
struct SurfaceState {
    frame: SurfaceFrame,
    transform: TransformState,
}

/// Scene host backed by hash maps.
#[derive(Debug, Default)]
pub struct RecordingHost {
    surfaces: HashMap<SurfaceId, SurfaceState>,
    ancestors: HashMap<SurfaceId, Vec<SurfaceId>>,
    writes: Vec<HostWrite>,
    next_id: u64,
}

impl RecordingHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a surface and return its handle.
    pub fn add_surface(&mut self, origin_y: f64, height: f64) -> SurfaceId {
        self.next_id += 1;
        let id = SurfaceId::new(self.next_id);
        self.surfaces.insert(
            id,
            SurfaceState {
                frame: SurfaceFrame::new(origin_y, height),
                transform: TransformState::IDENTITY,
            },
        );
        id
    }

    /// Declare the presenting ancestors of `surface`, nearest first.
    pub fn set_ancestors(&mut self, surface: SurfaceId, ancestors: Vec<SurfaceId>) {
        self.ancestors.insert(surface, ancestors);
    }

    /// Release a surface; later engine calls on it become no-ops.
    pub fn remove_surface(&mut self, surface: SurfaceId) {
        self.surfaces.remove(&surface);
    }

    #[must_use]
    pub fn origin_y(&self, surface: SurfaceId) -> Option<f64> {
        self.surfaces.get(&surface).map(|s| s.frame.origin_y)
    }

    #[must_use]
    pub fn transform(&self, surface: SurfaceId) -> Option<TransformState> {
        self.surfaces.get(&surface).map(|s| s.transform)
    }

    #[must_use]
    pub fn writes(&self) -> &[HostWrite] {
        &self.writes
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    /// Every origin written to `surface`, in order.
    #[must_use]
    pub fn origin_history(&self, surface: SurfaceId) -> Vec<f64> {
        self.writes
            .iter()
            .filter_map(|w| match *w {
                HostWrite::Origin { surface: s, y } if s == surface => Some(y),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn dismissals(&self) -> Vec<SurfaceId> {
        self.writes
            .iter()
            .filter_map(|w| match *w {
                HostWrite::Dismiss { panel } => Some(panel),
                _ => None,
            })
            .collect()
    }
}

impl SceneHost for RecordingHost {
    fn frame(&self, surface: SurfaceId) -> Option<SurfaceFrame> {
        self.surfaces.get(&surface).map(|s| s.frame)
    }

    fn set_origin_y(&mut self, surface: SurfaceId, y: f64) -> bool {
        let Some(state) = self.surfaces.get_mut(&surface) else {
            return false;
        };
        state.frame.origin_y = y;
        self.writes.push(HostWrite::Origin { surface, y });
        true
    }

    fn set_transform(&mut self, surface: SurfaceId, transform: TransformState) -> bool {
        let Some(state) = self.surfaces.get_mut(&surface) else {
            return false;
        };
        state.transform = transform;
        self.writes.push(HostWrite::Transform { surface, transform });
        true
    }

    fn ancestors(&self, surface: SurfaceId) -> Vec<SurfaceId> {
        self.ancestors.get(&surface).cloned().unwrap_or_default()
    }

    fn request_dismiss(&mut self, panel: SurfaceId) {
        tracing::trace!(panel = panel.get(), "dismiss recorded");
        self.writes.push(HostWrite::Dismiss { panel });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_surfaces_refuse_writes() {
        let mut host = RecordingHost::new();
        let id = host.add_surface(0.0, 800.0);
        assert!(host.set_origin_y(id, 10.0));
        host.remove_surface(id);
        assert!(!host.set_origin_y(id, 20.0));
        assert!(!host.is_alive(id));
        assert_eq!(host.origin_history(id), vec![10.0]);
    }

    #[test]
    fn ancestors_default_to_empty() {
        let mut host = RecordingHost::new();
        let a = host.add_surface(0.0, 800.0);
        let b = host.add_surface(20.0, 780.0);
        assert!(host.ancestors(a).is_empty());
        host.set_ancestors(a, vec![b]);
        assert_eq!(host.ancestors(a), vec![b]);
    }
}
