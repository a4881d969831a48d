#![forbid(unsafe_code)]

//! Test fixtures for pullsheet.
//!
//! - [`RecordingHost`]: an in-memory [`SceneHost`](pullsheet_runtime::SceneHost)
//!   that records every origin and transform write and can release surfaces
//!   mid-test.
//! - [`RecordingTransitionContext`]: a transition context that counts
//!   completions.
//! - [`GestureScript`]: deterministic gesture sample sequences.

pub mod context;
pub mod host;
pub mod script;

pub use context::RecordingTransitionContext;
pub use host::{HostWrite, RecordingHost};
pub use script::GestureScript;
