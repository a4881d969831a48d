#![forbid(unsafe_code)]

//! Runtime: binds the pullsheet core to a host toolkit.
//!
//! # Role in pullsheet
//! `pullsheet-runtime` owns the stateful side of a drag-to-resize panel:
//! the per-panel [`PanelController`], the spring [`SettleAnimationDriver`],
//! and the modal [`TransitionController`]. The host is reached only through
//! the [`SceneHost`] and [`TransitionContext`] capability traits, so the
//! runtime never owns a surface and tolerates surfaces disappearing at any
//! point.
//!
//! # Threading
//! Everything runs on the host's UI thread. Handlers are `Rc`-owned by the
//! presented content and held weakly here; nothing is `Send`.

pub mod controller;
pub mod driver;
pub mod handler;
pub mod host;
#[cfg(feature = "logging")]
pub mod logging;
pub mod transition;

pub use controller::{ControllerTick, DragOutcome, DragRejection, GestureSample, PanelController};
pub use driver::{SettleAnimationDriver, SettleHandle, SettleId, SettleProgress, SettleTick};
pub use handler::{MoveOutcome, PositionHandler};
pub use host::{SceneHost, SurfaceFrame, SurfaceId};
#[cfg(feature = "logging")]
pub use logging::LoggingError;
pub use transition::{
    ContentKey, TransitionCompletion, TransitionContext, TransitionController, TransitionStart,
    TransitionTick,
};
