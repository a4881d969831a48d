#![forbid(unsafe_code)]

//! Per-panel drag controller.
//!
//! [`PanelController`] ties the pure core pieces to one presented panel:
//!
//! ```text
//! sample -> GestureArbitration -> DragTracker -> set_origin_y + coupling
//!        -> (ended) SettleResolver -> SettleAnimationDriver -> tick() frames
//! ```
//!
//! The controller never owns host surfaces or the presented content. It
//! holds [`SurfaceId`] handles and a `Weak` [`PositionHandler`], and every
//! host call tolerates a released surface by doing nothing.
//!
//! # Invariants
//!
//! 1. Drag positions are applied in sample arrival order and always lie in
//!    `[final_top_offset, screen_bottom_offset]`.
//! 2. Each session that reaches a terminal phase resolves exactly one
//!    settle target, after its last `Changed` sample.
//! 3. A new `Began` supersedes any in-flight settle; the superseded settle
//!    never reports `did_move_top_offset`.
//! 4. Ancestor geometry is captured once per session, at `Began`.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Invalid offsets or tunables | `new` returns `ConfigError` |
//! | Panel released mid-drag | Session dropped, `DragOutcome::Ignored` |
//! | Companion released | Transform skipped, logged at debug |
//! | Handler released | Notifications and default dismissal skipped |

use std::rc::{Rc, Weak};
use std::time::Duration;

use pullsheet_core::arbitration::{GestureArbitration, NestedScrollState};
use pullsheet_core::config::SheetConfig;
use pullsheet_core::coupling::{PresentationMode, TransformCoupling, TransformState};
use pullsheet_core::drag::{DragSession, DragTracker, GesturePhase};
use pullsheet_core::error::ConfigError;
use pullsheet_core::offsets::{OffsetConfiguration, SettleTarget};
use pullsheet_core::preferences::{PositionPreferences, Rgba};
use pullsheet_core::settle::SettleResolver;

use crate::driver::{SettleAnimationDriver, SettleHandle, SettleId, SettleTick};
use crate::handler::{MoveOutcome, PositionHandler};
use crate::host::{SceneHost, SurfaceFrame, SurfaceId};

/// One raw gesture sample from the host recognizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    pub phase: GesturePhase,
    /// Translation since the gesture began, points.
    pub translation_y: f64,
    /// Points per second; `None` when the host cannot measure it.
    pub velocity_y: Option<f64>,
    /// A nested scrollable competing for the touch, if any.
    pub nested: Option<NestedScrollState>,
}

impl GestureSample {
    #[must_use]
    pub const fn new(phase: GesturePhase, translation_y: f64, velocity_y: f64) -> Self {
        Self {
            phase,
            translation_y,
            velocity_y: Some(velocity_y),
            nested: None,
        }
    }

    #[must_use]
    pub const fn without_velocity(mut self) -> Self {
        self.velocity_y = None;
        self
    }

    #[must_use]
    pub const fn with_nested(mut self, nested: NestedScrollState) -> Self {
        self.nested = Some(nested);
        self
    }
}

/// Why a drag was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragRejection {
    /// Upward or idle drag on a panel already at its collapsed height, or
    /// an upward drag on a fixed-height panel.
    Arbitration,
    /// A nested scrollable is away from its top and keeps the touch.
    NestedScroll,
    /// The panel surface is gone.
    PanelGone,
}

/// Result of feeding one sample to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    Rejected(DragRejection),
    /// Session started; no position change yet.
    Armed,
    Moved { y: f64 },
    Settling { target: SettleTarget, id: SettleId },
    /// Nothing to do for this sample.
    Ignored,
}

/// Result of one controller frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerTick {
    Idle,
    Frame { y: f64 },
    Settled {
        target: SettleTarget,
        offset: f64,
        dismiss_requested: bool,
    },
}

#[derive(Debug, Clone, Copy)]
struct CapturedAncestor {
    surface: SurfaceId,
    frame: SurfaceFrame,
}

/// Drives one presented panel and its companion.
#[derive(Debug)]
pub struct PanelController {
    panel: SurfaceId,
    presenter: SurfaceId,
    offsets: OffsetConfiguration,
    mode: PresentationMode,
    outer_modes: Vec<PresentationMode>,
    tracker: DragTracker,
    resolver: SettleResolver,
    coupling: TransformCoupling,
    arbitration: GestureArbitration,
    driver: SettleAnimationDriver,
    handler: Weak<PositionHandler>,
    preferences: PositionPreferences,
    session: Option<DragSession>,
    ancestors: Vec<CapturedAncestor>,
    position_y: f64,
}

impl PanelController {
    /// Bind a panel to its presenter.
    ///
    /// Offsets declared by the handler's preferences override `offsets`;
    /// preferences are read once, here.
    pub fn new(
        panel: SurfaceId,
        presenter: SurfaceId,
        offsets: OffsetConfiguration,
        config: &SheetConfig,
        handler: &Rc<PositionHandler>,
        mode: PresentationMode,
    ) -> Result<Self, ConfigError> {
        let offsets = offsets.with_preferences(handler.preferences())?;
        Ok(Self {
            panel,
            presenter,
            offsets,
            mode,
            outer_modes: Vec::new(),
            tracker: DragTracker::new(offsets),
            resolver: config.resolver()?,
            coupling: config.coupling()?,
            arbitration: config.arbitration()?,
            driver: SettleAnimationDriver::new(config.spring),
            handler: Rc::downgrade(handler),
            preferences: *handler.preferences(),
            session: None,
            ancestors: Vec::new(),
            position_y: offsets.initial_top_offset(),
        })
    }

    /// Presentation modes of the parent panels, nearest first.
    #[must_use]
    pub fn with_outer_modes(mut self, outer_modes: Vec<PresentationMode>) -> Self {
        self.outer_modes = outer_modes;
        self
    }

    #[must_use]
    pub const fn panel(&self) -> SurfaceId {
        self.panel
    }

    #[must_use]
    pub const fn presenter(&self) -> SurfaceId {
        self.presenter
    }

    #[must_use]
    pub const fn offsets(&self) -> &OffsetConfiguration {
        &self.offsets
    }

    #[must_use]
    pub const fn mode(&self) -> &PresentationMode {
        &self.mode
    }

    /// Last panel position this controller applied or read from the host.
    ///
    /// Reads `initial_top_offset` until the first `Began` or
    /// [`settle_to`](Self::settle_to) samples the panel's real frame.
    #[must_use]
    pub const fn position_y(&self) -> f64 {
        self.position_y
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn is_settling(&self) -> bool {
        self.driver.is_animating()
    }

    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Whether the grabber should hint that the panel can slide up.
    ///
    /// An explicit preference wins; otherwise the effective offsets decide.
    #[must_use]
    pub fn shows_slide_up_indication(&self) -> bool {
        self.preferences.shows_slide_up_indication(&self.offsets)
    }

    #[must_use]
    pub fn slider_color(&self) -> Rgba {
        self.preferences.slider_color()
    }

    /// Gate for a new drag at the panel's current position.
    #[must_use]
    pub fn should_begin_drag(
        &self,
        host: &impl SceneHost,
        velocity_y: f64,
        nested: Option<&NestedScrollState>,
    ) -> bool {
        self.admit(host, velocity_y, nested).is_ok()
    }

    fn admit(
        &self,
        host: &impl SceneHost,
        velocity_y: f64,
        nested: Option<&NestedScrollState>,
    ) -> Result<SurfaceFrame, DragRejection> {
        let frame = host.frame(self.panel).ok_or(DragRejection::PanelGone)?;
        if nested.is_some_and(|n| self.arbitration.should_yield_to(n)) {
            return Err(DragRejection::NestedScroll);
        }
        let direction = self.arbitration.direction(velocity_y);
        let collapsed = self
            .arbitration
            .is_at_collapsed_height(frame.origin_y, &self.offsets);
        if !self
            .arbitration
            .should_begin(direction, collapsed, &self.offsets)
        {
            return Err(DragRejection::Arbitration);
        }
        Ok(frame)
    }

    /// Feed one gesture sample.
    pub fn handle_gesture(&mut self, host: &mut impl SceneHost, sample: GestureSample) -> DragOutcome {
        match sample.phase {
            GesturePhase::Possible => DragOutcome::Ignored,
            GesturePhase::Began => self.begin(host, sample),
            GesturePhase::Changed => self.change(host, sample),
            GesturePhase::Ended | GesturePhase::Cancelled | GesturePhase::Failed => {
                self.end(host, sample)
            }
        }
    }

    fn begin(&mut self, host: &mut impl SceneHost, sample: GestureSample) -> DragOutcome {
        let velocity_y = sample.velocity_y.unwrap_or(0.0);
        let frame = match self.admit(host, velocity_y, sample.nested.as_ref()) {
            Ok(frame) => frame,
            Err(reason) => {
                tracing::debug!(
                    target: "pullsheet.drag",
                    panel = self.panel.get(),
                    ?reason,
                    "drag rejected"
                );
                return DragOutcome::Rejected(reason);
            }
        };

        // The new finger takes authority over whatever was animating.
        self.driver.cancel();
        self.position_y = frame.origin_y;
        self.session = Some(DragSession::begin(frame.origin_y));
        self.capture_ancestors(host);

        tracing::debug!(
            target: "pullsheet.drag",
            panel = self.panel.get(),
            origin_y = frame.origin_y,
            ancestors = self.ancestors.len(),
            "drag began"
        );
        DragOutcome::Armed
    }

    fn change(&mut self, host: &mut impl SceneHost, sample: GestureSample) -> DragOutcome {
        let Some(session) = self.session.as_mut() else {
            return DragOutcome::Ignored;
        };
        session.record(sample.translation_y, sample.velocity_y.unwrap_or(f64::NAN));
        let origin_y = session.origin_y();

        let Some(y) = self
            .tracker
            .on_sample(GesturePhase::Changed, sample.translation_y, origin_y)
        else {
            return DragOutcome::Ignored;
        };

        if let Some(handler) = self.handler.upgrade() {
            handler.will_move_top_offset(y, Duration::ZERO);
        }
        if !self.apply_position(host, y) {
            self.session = None;
            return DragOutcome::Ignored;
        }

        tracing::trace!(target: "pullsheet.drag", panel = self.panel.get(), y, "drag moved");
        DragOutcome::Moved { y }
    }

    fn end(&mut self, host: &mut impl SceneHost, sample: GestureSample) -> DragOutcome {
        let Some(mut session) = self.session.take() else {
            return DragOutcome::Ignored;
        };
        session.record(sample.translation_y, sample.velocity_y.unwrap_or(f64::NAN));

        let Some(frame) = host.frame(self.panel) else {
            return DragOutcome::Ignored;
        };
        let end_y = frame.origin_y;
        let target = self
            .resolver
            .resolve_with_optional_velocity(end_y, sample.velocity_y, &self.offsets);
        let velocity_y = sample.velocity_y.unwrap_or(0.0);

        tracing::debug!(
            target: "pullsheet.drag",
            panel = self.panel.get(),
            phase = ?sample.phase,
            end_y,
            velocity_y,
            samples = session.samples(),
            settle_target = ?target,
            "drag ended"
        );

        let id = self.start_settle(end_y, target, velocity_y);
        DragOutcome::Settling { target, id }
    }

    /// Animate to `target` without a gesture.
    ///
    /// Returns `None` when the panel surface is gone.
    pub fn settle_to(&mut self, host: &mut impl SceneHost, target: SettleTarget) -> Option<SettleId> {
        let frame = host.frame(self.panel)?;
        self.session = None;
        self.position_y = frame.origin_y;
        self.capture_ancestors(host);
        let offset = self.offsets.offset(target);
        if let Some(handler) = self.handler.upgrade() {
            handler.will_move_top_offset(offset, self.driver.settling_duration());
        }
        Some(self.start_settle(frame.origin_y, target, 0.0))
    }

    fn start_settle(&mut self, from_y: f64, target: SettleTarget, velocity_y: f64) -> SettleId {
        let offset = self.offsets.offset(target);
        let handler = self.handler.clone();
        self.driver.settle(
            target,
            offset,
            from_y,
            velocity_y,
            move |value, handle: &mut SettleHandle| {
                if let Some(handler) = handler.upgrade() {
                    handler.will_settle_top_offset(value, handle);
                }
            },
            None,
        )
    }

    /// Advance the settle animation by `dt`.
    pub fn tick(&mut self, host: &mut impl SceneHost, dt: Duration) -> ControllerTick {
        match self.driver.tick(dt) {
            SettleTick::Idle => ControllerTick::Idle,
            SettleTick::Frame { position, .. } => {
                if self.apply_position(host, position) {
                    ControllerTick::Frame { y: position }
                } else {
                    self.driver.cancel();
                    ControllerTick::Idle
                }
            }
            SettleTick::Settled { target, offset, .. } => {
                if !self.apply_position(host, offset) {
                    return ControllerTick::Idle;
                }
                let outcome = self
                    .handler
                    .upgrade()
                    .map(|h| h.did_move_top_offset(offset, self.offsets.screen_bottom_offset()));
                let dismiss_requested = matches!(outcome, Some(MoveOutcome::DismissRequested));
                if dismiss_requested {
                    tracing::debug!(
                        target: "pullsheet.drag",
                        panel = self.panel.get(),
                        "dismiss requested"
                    );
                    host.request_dismiss(self.panel);
                }
                ControllerTick::Settled {
                    target,
                    offset,
                    dismiss_requested,
                }
            }
        }
    }

    fn capture_ancestors(&mut self, host: &impl SceneHost) {
        let only_displaced = matches!(self.mode, PresentationMode::Default);
        self.ancestors = host
            .ancestors(self.presenter)
            .into_iter()
            .take(self.coupling.max_depth())
            .filter_map(|surface| {
                let frame = host.frame(surface)?;
                (!only_displaced || frame.origin_y != 0.0)
                    .then_some(CapturedAncestor { surface, frame })
            })
            .collect();
    }

    /// Move the panel and recouple every companion. `false` if the panel is gone.
    fn apply_position(&mut self, host: &mut impl SceneHost, y: f64) -> bool {
        if !host.set_origin_y(self.panel, y) {
            tracing::debug!(target: "pullsheet.drag", panel = self.panel.get(), "panel gone");
            return false;
        }
        self.position_y = y;

        match self.mode {
            PresentationMode::None => {
                let transform = self
                    .coupling
                    .compute_companion_transform(&self.offsets, y, &self.mode);
                apply_transform(host, self.presenter, transform);
            }
            PresentationMode::Default => {
                let transform = self
                    .coupling
                    .compute_companion_transform(&self.offsets, y, &self.mode);
                apply_transform(host, self.presenter, transform);
                for ancestor in &self.ancestors {
                    let transform = self.coupling.reposition_ancestor(
                        &self.offsets,
                        y,
                        ancestor.frame.origin_y,
                        ancestor.frame.height,
                    );
                    apply_transform(host, ancestor.surface, transform);
                }
            }
            PresentationMode::Custom { .. } => {
                let levels = self
                    .coupling
                    .couple_chain(&self.offsets, y, &self.mode, &self.outer_modes);
                let surfaces =
                    std::iter::once(self.presenter).chain(self.ancestors.iter().map(|a| a.surface));
                for (level, surface) in levels.iter().zip(surfaces) {
                    apply_transform(host, surface, level.transform);
                }
            }
        }
        true
    }
}

fn apply_transform(host: &mut impl SceneHost, surface: SurfaceId, transform: TransformState) {
    if !host.set_transform(surface, transform) {
        tracing::debug!(
            target: "pullsheet.coupling",
            surface = surface.get(),
            "companion gone; transform skipped"
        );
    }
}
