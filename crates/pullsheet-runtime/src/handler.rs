#![forbid(unsafe_code)]

//! Lifecycle hooks supplied by the presented content.
//!
//! A [`PositionHandler`] is plain data plus optional callbacks. Every hook
//! has an explicit default: moves and settles are silent, and a completed
//! move to the screen bottom requests dismissal. Supplying a callback
//! replaces the default for that hook only.
//!
//! The content owns its handler behind an `Rc`; controllers keep a `Weak`
//! and upgrade it before each call, so a released handler silently stops
//! receiving notifications.

use std::fmt;
use std::time::Duration;

use pullsheet_core::preferences::PositionPreferences;

use crate::driver::SettleHandle;

type WillMoveHook = Box<dyn Fn(f64, Duration)>;
type WillSettleHook = Box<dyn Fn(f64, &mut SettleHandle)>;
type DidMoveHook = Box<dyn Fn(f64)>;

/// Points within which a settled offset counts as the screen bottom.
const DISMISS_EPSILON: f64 = 0.5;

/// What the controller should do after `did_move_top_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Nothing further.
    Moved,
    /// The default hook saw the panel reach the screen bottom.
    DismissRequested,
    /// A custom hook handled the notification.
    Handled,
}

/// Preferences and lifecycle hooks of one presented content.
#[derive(Default)]
pub struct PositionHandler {
    preferences: PositionPreferences,
    will_move: Option<WillMoveHook>,
    will_settle: Option<WillSettleHook>,
    did_move: Option<DidMoveHook>,
}

impl fmt::Debug for PositionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionHandler")
            .field("preferences", &self.preferences)
            .field("will_move", &self.will_move.is_some())
            .field("will_settle", &self.will_settle.is_some())
            .field("did_move", &self.did_move.is_some())
            .finish()
    }
}

impl PositionHandler {
    #[must_use]
    pub fn new(preferences: PositionPreferences) -> Self {
        Self {
            preferences,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn on_will_move(mut self, hook: impl Fn(f64, Duration) + 'static) -> Self {
        self.will_move = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn on_will_settle(mut self, hook: impl Fn(f64, &mut SettleHandle) + 'static) -> Self {
        self.will_settle = Some(Box::new(hook));
        self
    }

    /// Replace the default dismiss-at-bottom behavior.
    #[must_use]
    pub fn on_did_move(mut self, hook: impl Fn(f64) + 'static) -> Self {
        self.did_move = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub const fn preferences(&self) -> &PositionPreferences {
        &self.preferences
    }

    /// Notify before a continuous move (zero duration) or programmatic one.
    pub fn will_move_top_offset(&self, value: f64, duration: Duration) {
        if let Some(hook) = &self.will_move {
            hook(value, duration);
        }
    }

    /// Notify before a settle animation starts.
    pub fn will_settle_top_offset(&self, value: f64, handle: &mut SettleHandle) {
        if let Some(hook) = &self.will_settle {
            hook(value, handle);
        }
    }

    /// Notify after a move or settle completes.
    pub fn did_move_top_offset(&self, value: f64, screen_bottom: f64) -> MoveOutcome {
        match &self.did_move {
            Some(hook) => {
                hook(value);
                MoveOutcome::Handled
            }
            None if (value - screen_bottom).abs() <= DISMISS_EPSILON => {
                MoveOutcome::DismissRequested
            }
            None => MoveOutcome::Moved,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn default_did_move_requests_dismiss_at_bottom() {
        let handler = PositionHandler::default();
        assert_eq!(handler.did_move_top_offset(800.0, 800.0), MoveOutcome::DismissRequested);
        assert_eq!(handler.did_move_top_offset(440.0, 800.0), MoveOutcome::Moved);
    }

    #[test]
    fn custom_did_move_replaces_default() {
        let seen = Rc::new(Cell::new(None));
        let sink = Rc::clone(&seen);
        let handler = PositionHandler::default().on_did_move(move |y| sink.set(Some(y)));
        assert_eq!(handler.did_move_top_offset(800.0, 800.0), MoveOutcome::Handled);
        assert_eq!(seen.get(), Some(800.0));
    }

    #[test]
    fn will_move_forwards_value_and_duration() {
        let seen = Rc::new(Cell::new((0.0, Duration::ZERO)));
        let sink = Rc::clone(&seen);
        let handler = PositionHandler::default().on_will_move(move |y, d| sink.set((y, d)));
        handler.will_move_top_offset(300.0, Duration::from_millis(250));
        assert_eq!(seen.get(), (300.0, Duration::from_millis(250)));
    }

    #[test]
    fn default_hooks_are_silent() {
        let handler = PositionHandler::default();
        handler.will_move_top_offset(1.0, Duration::ZERO);
        let mut handle = SettleHandle::detached(1.0);
        handler.will_settle_top_offset(1.0, &mut handle);
        assert_eq!(handle.attachment_count(), 0);
    }

    #[test]
    fn debug_hides_closures() {
        let handler = PositionHandler::default().on_did_move(|_| {});
        let dbg = format!("{handler:?}");
        assert!(dbg.contains("did_move: true"));
        assert!(dbg.contains("will_move: false"));
    }
}
