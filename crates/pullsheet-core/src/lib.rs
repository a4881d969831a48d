#![forbid(unsafe_code)]

//! Core: offsets, drag tracking, settle resolution, and transform coupling.
//!
//! # Role in pullsheet
//! `pullsheet-core` is the pure computation layer behind a drag-to-resize
//! modal panel. Every function here is deterministic and host-independent:
//! it maps gesture samples and panel positions to clamped positions, settle
//! targets, and companion transforms. Nothing in this crate owns a surface,
//! schedules a frame, or calls back into the host.
//!
//! # Primary responsibilities
//! - **OffsetConfiguration**: the three boundary offsets and derived divides.
//! - **DragTracker**: clamps raw translation samples into panel positions.
//! - **SettleResolver**: picks a [`SettleTarget`] from position and velocity.
//! - **TransformCoupling**: interpolates the companion's offset and scale,
//!   walking nested panel levels iteratively.
//! - **GestureArbitration**: decides whether a drag may begin or must yield
//!   to nested scrollable content.
//! - **Animation**: the damped spring and eased tween used for settling and
//!   modal transitions.
//!
//! # How it fits in the system
//! `pullsheet-runtime` binds these pieces to a host through capability
//! traits and drives them frame by frame.

pub mod animation;
pub mod arbitration;
pub mod config;
pub mod coupling;
pub mod drag;
pub mod error;
pub mod offsets;
pub mod preferences;
pub mod settle;

pub use arbitration::{DragDirection, GestureArbitration, NestedScrollState};
pub use config::{SheetConfig, SheetConfigError, TransitionTuning};
pub use coupling::{
    CoupledLevel, NestedSubMode, ParentPanel, PresentationMode, TransformCoupling, TransformState,
};
pub use drag::{DragSession, DragTracker, GesturePhase};
pub use error::ConfigError;
pub use offsets::{OffsetConfiguration, SettleTarget};
pub use preferences::{PositionPreferences, Rgba};
pub use settle::{DecelerationRate, SettleDecision, SettlePolicy, SettleResolver, SettleRule};
