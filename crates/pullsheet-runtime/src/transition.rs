#![forbid(unsafe_code)]

//! Modal enter/exit transition.
//!
//! Presenting slides the panel from the screen bottom up to its initial
//! offset; dismissing slides it from wherever it is back to the screen
//! bottom. The companion is coupled on every frame exactly as during a
//! drag, so a transition and a drag that follows it agree on geometry.
//!
//! The presenter's untransformed frame is captured when each transition
//! starts and kept on the running transition, never shared between
//! controllers.
//!
//! # Invariants
//!
//! 1. Every context passed to [`TransitionController::animate`] is completed
//!    exactly once: `true` when its run reaches the end, `false` when the
//!    run aborts, is cancelled, or is superseded by a later `animate`.
//! 2. A superseded run completes the context that started it, never the
//!    context of the run replacing it.

use std::fmt;
use std::time::Duration;

use pullsheet_core::animation::{Animation, Tween};
use pullsheet_core::config::{SheetConfig, TransitionTuning};
use pullsheet_core::coupling::{PresentationMode, TransformCoupling, TransformState};
use pullsheet_core::error::ConfigError;
use pullsheet_core::offsets::OffsetConfiguration;

use crate::host::{SceneHost, SurfaceFrame, SurfaceId};

/// Which side of the transition a content surface is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKey {
    From,
    To,
}

/// Completion callback for one transition; receives `finished`.
pub type TransitionCompletion = Box<dyn FnOnce(bool)>;

/// What the host supplies for one modal transition.
pub trait TransitionContext {
    fn content(&self, key: ContentKey) -> Option<SurfaceId>;

    fn container(&self) -> Option<SurfaceId>;

    /// Completion target for the transition this context describes.
    ///
    /// Taken once per `animate`; the controller keeps it with the run and
    /// invokes it exactly once.
    fn completion(&mut self) -> TransitionCompletion;
}

/// Whether `animate` started anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStart {
    Started,
    /// A required surface was missing; the transition was completed as
    /// unfinished.
    Aborted,
}

/// Result of one transition frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionTick {
    Idle,
    Frame { y: f64 },
    Completed { is_presenting: bool },
    Aborted,
}

struct TransitionRun {
    is_presenting: bool,
    completion: TransitionCompletion,
    panel: SurfaceId,
    presenter: SurfaceId,
    presenter_frame: Option<SurfaceFrame>,
    tween: Tween,
}

/// Drives modal present/dismiss animations for one panel.
pub struct TransitionController {
    offsets: OffsetConfiguration,
    coupling: TransformCoupling,
    mode: PresentationMode,
    tuning: TransitionTuning,
    run: Option<TransitionRun>,
}

impl fmt::Debug for TransitionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionController")
            .field("offsets", &self.offsets)
            .field("mode", &self.mode)
            .field("tuning", &self.tuning)
            .field("running", &self.run.as_ref().map(|r| r.is_presenting))
            .finish()
    }
}

impl TransitionController {
    pub fn new(
        offsets: OffsetConfiguration,
        config: &SheetConfig,
        mode: PresentationMode,
    ) -> Result<Self, ConfigError> {
        if config.transition.duration_ms == 0 {
            return Err(ConfigError::tunable("transition.duration_ms", "must be > 0"));
        }
        Ok(Self {
            offsets,
            coupling: config.coupling()?,
            mode,
            tuning: config.transition,
            run: None,
        })
    }

    #[must_use]
    pub fn transition_duration(&self) -> Duration {
        self.tuning.duration()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Begin presenting (`true`) or dismissing (`false`).
    ///
    /// A transition already running is completed as unfinished first,
    /// through the context that started it.
    pub fn animate(
        &mut self,
        host: &mut impl SceneHost,
        ctx: &mut impl TransitionContext,
        is_presenting: bool,
    ) -> TransitionStart {
        if let Some(previous) = self.run.take() {
            tracing::debug!(
                target: "pullsheet.transition",
                is_presenting = previous.is_presenting,
                "transition superseded"
            );
            (previous.completion)(false);
        }
        let completion = ctx.completion();

        let (panel_key, presenter_key) = if is_presenting {
            (ContentKey::To, ContentKey::From)
        } else {
            (ContentKey::From, ContentKey::To)
        };
        let surfaces = ctx
            .container()
            .filter(|c| host.is_alive(*c))
            .and(ctx.content(panel_key).zip(ctx.content(presenter_key)));
        let Some((panel, presenter)) = surfaces else {
            tracing::debug!(target: "pullsheet.transition", is_presenting, "transition aborted");
            completion(false);
            return TransitionStart::Aborted;
        };
        let Some(panel_frame) = host.frame(panel) else {
            completion(false);
            return TransitionStart::Aborted;
        };

        let screen = self.offsets.screen_bottom_offset();
        let (from, to) = if is_presenting {
            (screen, self.offsets.initial_top_offset())
        } else {
            (panel_frame.origin_y, screen)
        };
        let tween = Tween::new(from, to, self.tuning.duration()).easing(self.tuning.easing.function());

        tracing::debug!(
            target: "pullsheet.transition",
            is_presenting,
            from,
            to,
            duration_ms = self.tuning.duration_ms,
            "transition started"
        );

        let run = TransitionRun {
            is_presenting,
            completion,
            panel,
            presenter,
            presenter_frame: host.frame(presenter),
            tween,
        };
        self.apply(host, &run, from);
        self.run = Some(run);
        TransitionStart::Started
    }

    /// Advance the running transition.
    pub fn tick(&mut self, host: &mut impl SceneHost, dt: Duration) -> TransitionTick {
        let Some(mut run) = self.run.take() else {
            return TransitionTick::Idle;
        };
        run.tween.tick(dt);
        let y = run.tween.position();
        if !self.apply(host, &run, y) {
            tracing::debug!(target: "pullsheet.transition", "panel gone; transition aborted");
            (run.completion)(false);
            return TransitionTick::Aborted;
        }
        if run.tween.is_complete() {
            tracing::debug!(
                target: "pullsheet.transition",
                is_presenting = run.is_presenting,
                "transition completed"
            );
            let is_presenting = run.is_presenting;
            (run.completion)(true);
            return TransitionTick::Completed { is_presenting };
        }
        self.run = Some(run);
        TransitionTick::Frame { y }
    }

    /// Stop the running transition and report it unfinished.
    pub fn cancel(&mut self) -> bool {
        let Some(run) = self.run.take() else {
            return false;
        };
        (run.completion)(false);
        true
    }

    /// Companion transform for a panel at `y`.
    #[must_use]
    pub fn companion_transform(&self, presenter_frame: Option<SurfaceFrame>, y: f64) -> TransformState {
        match (self.mode, presenter_frame) {
            (PresentationMode::Default, Some(frame)) if frame.origin_y != 0.0 => self
                .coupling
                .reposition_ancestor(&self.offsets, y, frame.origin_y, frame.height),
            _ => self
                .coupling
                .compute_companion_transform(&self.offsets, y, &self.mode),
        }
    }

    fn apply(&self, host: &mut impl SceneHost, run: &TransitionRun, y: f64) -> bool {
        if !host.set_origin_y(run.panel, y) {
            return false;
        }
        let transform = self.companion_transform(run.presenter_frame, y);
        if !host.set_transform(run.presenter, transform) {
            tracing::debug!(
                target: "pullsheet.coupling",
                surface = run.presenter.get(),
                "presenter gone; transform skipped"
            );
        }
        true
    }
}
