#![forbid(unsafe_code)]

//! pullsheet public facade crate.
//!
//! Re-exports the core computations and the runtime controllers, plus a
//! prelude covering what a host integration needs day to day.

use thiserror::Error;

// --- Core re-exports -------------------------------------------------------

pub use pullsheet_core::{
    ConfigError, DecelerationRate, DragDirection, GesturePhase, NestedScrollState, NestedSubMode,
    OffsetConfiguration, ParentPanel, PositionPreferences, PresentationMode, Rgba, SettlePolicy,
    SettleTarget, SheetConfig, SheetConfigError, TransformState,
};

// --- Runtime re-exports ----------------------------------------------------

pub use pullsheet_runtime::{
    ContentKey, ControllerTick, DragOutcome, DragRejection, GestureSample, MoveOutcome,
    PanelController, PositionHandler, SceneHost, SettleHandle, SettleId, SettleProgress,
    SurfaceFrame, SurfaceId, TransitionCompletion, TransitionContext, TransitionController,
    TransitionStart, TransitionTick,
};

#[cfg(feature = "logging")]
pub use pullsheet_runtime::logging::init_subscriber;
#[cfg(feature = "tracing-json")]
pub use pullsheet_runtime::logging::init_json_subscriber;

// --- Errors ---------------------------------------------------------------

/// Top-level error type for pullsheet integrations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    ConfigFile(#[from] SheetConfigError),

    #[cfg(feature = "logging")]
    #[error(transparent)]
    Logging(#[from] pullsheet_runtime::LoggingError),
}

/// Standard result type for pullsheet APIs.
pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use crate::{
        ControllerTick, DragOutcome, Error, GesturePhase, GestureSample, OffsetConfiguration,
        PanelController, PositionHandler, PositionPreferences, PresentationMode, Result,
        SceneHost, SettleTarget, SheetConfig, SurfaceId, TransitionController,
    };

    pub use crate::{core, runtime};
}

pub use pullsheet_core as core;
pub use pullsheet_runtime as runtime;
