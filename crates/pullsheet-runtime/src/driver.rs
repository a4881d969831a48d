#![forbid(unsafe_code)]

//! Spring-driven settle animation.
//!
//! [`SettleAnimationDriver`] owns at most one in-flight settle. Each settle
//! gets a fresh [`SettleId`]; starting a new settle or calling
//! [`cancel`](SettleAnimationDriver::cancel) supersedes the previous one,
//! whose did-settle continuation is dropped without running.
//!
//! The drag's ending velocity seeds the spring so the hand-off from finger
//! to animation has no visible speed discontinuity.
//!
//! # Invariants
//!
//! 1. At most one settle is active.
//! 2. A did-settle continuation runs at most once, and only for the settle
//!    that is still current when the spring comes to rest.
//! 3. The final reported position equals the target offset exactly.

use std::fmt;
use std::time::Duration;

use pullsheet_core::animation::{Spring, SpringParams};
use pullsheet_core::error::ConfigError;
use pullsheet_core::offsets::SettleTarget;

/// Identifies one settle animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SettleId(u64);

impl SettleId {
    /// Id carried by handles not bound to a driver.
    pub const DETACHED: Self = Self(0);

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SettleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "settle#{}", self.0)
    }
}

/// Per-frame state delivered to attached animations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettleProgress {
    pub id: SettleId,
    pub position: f64,
    pub velocity: f64,
    /// Fraction of the distance covered, `[0, 1]`.
    pub progress: f64,
    pub finished: bool,
}

type Attachment = Box<dyn FnMut(SettleProgress)>;
type DidSettle = Box<dyn FnOnce(f64)>;

/// Handle passed to will-settle listeners.
///
/// Closures attached here run on every frame of the settle they were
/// attached to, and never after it is superseded.
pub struct SettleHandle {
    id: SettleId,
    target_offset: f64,
    attachments: Vec<Attachment>,
}

impl fmt::Debug for SettleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettleHandle")
            .field("id", &self.id)
            .field("target_offset", &self.target_offset)
            .field("attachments", &self.attachments.len())
            .finish()
    }
}

impl SettleHandle {
    fn new(id: SettleId, target_offset: f64) -> Self {
        Self {
            id,
            target_offset,
            attachments: Vec::new(),
        }
    }

    /// A handle that no driver will ever tick.
    #[must_use]
    pub fn detached(target_offset: f64) -> Self {
        Self::new(SettleId::DETACHED, target_offset)
    }

    #[must_use]
    pub const fn id(&self) -> SettleId {
        self.id
    }

    #[must_use]
    pub const fn target_offset(&self) -> f64 {
        self.target_offset
    }

    /// Run `animation` on every frame of this settle.
    pub fn attach(&mut self, animation: impl FnMut(SettleProgress) + 'static) {
        self.attachments.push(Box::new(animation));
    }

    #[must_use]
    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }
}

/// Result of one driver tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettleTick {
    /// No settle in flight.
    Idle,
    /// Still moving.
    Frame { id: SettleId, position: f64 },
    /// Reached rest at `offset` on this tick.
    Settled {
        id: SettleId,
        target: SettleTarget,
        offset: f64,
    },
}

struct ActiveSettle {
    id: SettleId,
    target: SettleTarget,
    target_offset: f64,
    spring: Spring,
    attachments: Vec<Attachment>,
    on_did_settle: Option<DidSettle>,
}

/// Drives the panel from its release position to a settle offset.
pub struct SettleAnimationDriver {
    params: SpringParams,
    next_id: u64,
    active: Option<ActiveSettle>,
}

impl fmt::Debug for SettleAnimationDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettleAnimationDriver")
            .field("params", &self.params)
            .field("active", &self.active.as_ref().map(|a| (a.id, a.target)))
            .finish()
    }
}

impl Default for SettleAnimationDriver {
    fn default() -> Self {
        Self::new(SpringParams::default())
    }
}

impl SettleAnimationDriver {
    #[must_use]
    pub fn new(params: SpringParams) -> Self {
        Self {
            params,
            next_id: 1,
            active: None,
        }
    }

    /// Build from raw constants, refusing damping outside `[0, 1]` or a
    /// non-positive response.
    pub fn from_constants(damping_ratio: f64, response: f64) -> Result<Self, ConfigError> {
        Ok(Self::new(SpringParams::new(damping_ratio, response)?))
    }

    #[must_use]
    pub const fn params(&self) -> SpringParams {
        self.params
    }

    /// Nominal time for a settle to come to rest.
    #[must_use]
    pub fn settling_duration(&self) -> Duration {
        self.params.settling_duration()
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn active_id(&self) -> Option<SettleId> {
        self.active.as_ref().map(|a| a.id)
    }

    #[must_use]
    pub fn active_target(&self) -> Option<SettleTarget> {
        self.active.as_ref().map(|a| a.target)
    }

    /// Current animated position, if a settle is in flight.
    #[must_use]
    pub fn position(&self) -> Option<f64> {
        self.active.as_ref().map(|a| a.spring.position())
    }

    /// Start settling from `from_y` toward `target_offset`.
    ///
    /// Any in-flight settle is superseded first. `on_will_settle` runs
    /// before the first frame with a handle collaborators can attach to;
    /// `on_did_settle` runs once when this settle comes to rest.
    pub fn settle(
        &mut self,
        target: SettleTarget,
        target_offset: f64,
        from_y: f64,
        velocity_y: f64,
        on_will_settle: impl FnOnce(f64, &mut SettleHandle),
        on_did_settle: Option<Box<dyn FnOnce(f64)>>,
    ) -> SettleId {
        self.cancel();

        let id = SettleId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);

        let mut handle = SettleHandle::new(id, target_offset);
        on_will_settle(target_offset, &mut handle);

        let from_y = if from_y.is_finite() { from_y } else { target_offset };
        let velocity_y = if velocity_y.is_finite() { velocity_y } else { 0.0 };
        let spring = Spring::new(self.params, from_y, target_offset).with_velocity(velocity_y);

        tracing::debug!(
            target: "pullsheet.settle",
            id = id.get(),
            settle_target = ?target,
            target_offset,
            from_y,
            velocity_y,
            attachments = handle.attachments.len(),
            "settle started"
        );

        self.active = Some(ActiveSettle {
            id,
            target,
            target_offset,
            spring,
            attachments: handle.attachments,
            on_did_settle,
        });
        id
    }

    /// Drop the in-flight settle without running its continuation.
    pub fn cancel(&mut self) -> Option<SettleId> {
        let active = self.active.take()?;
        tracing::debug!(
            target: "pullsheet.settle",
            id = active.id.get(),
            position = active.spring.position(),
            "settle superseded"
        );
        Some(active.id)
    }

    /// Advance the in-flight settle by `dt`.
    pub fn tick(&mut self, dt: Duration) -> SettleTick {
        let Some(active) = self.active.as_mut() else {
            return SettleTick::Idle;
        };

        let _span = tracing::debug_span!(
            "pullsheet.settle",
            id = active.id.get(),
            settle_target = ?active.target,
        )
        .entered();

        active.spring.advance(dt);
        let finished = active.spring.is_at_rest();
        let position = if finished {
            active.target_offset
        } else {
            active.spring.position()
        };
        let progress = SettleProgress {
            id: active.id,
            position,
            velocity: active.spring.velocity(),
            progress: active.spring.progress(),
            finished,
        };
        for attachment in &mut active.attachments {
            attachment(progress);
        }

        if !finished {
            return SettleTick::Frame {
                id: active.id,
                position,
            };
        }

        let Some(done) = self.active.take() else {
            return SettleTick::Idle;
        };
        tracing::debug!(
            target: "pullsheet.settle",
            id = done.id.get(),
            settle_target = ?done.target,
            offset = done.target_offset,
            "settle finished"
        );
        if let Some(on_did_settle) = done.on_did_settle {
            on_did_settle(done.target_offset);
        }
        SettleTick::Settled {
            id: done.id,
            target: done.target,
            offset: done.target_offset,
        }
    }

    /// Tick at `frame` intervals until the settle ends or `max_frames` elapse.
    pub fn run_to_rest(&mut self, frame: Duration, max_frames: usize) -> SettleTick {
        let mut last = SettleTick::Idle;
        for _ in 0..max_frames {
            last = self.tick(frame);
            if !matches!(last, SettleTick::Frame { .. }) {
                break;
            }
        }
        last
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn refuses_invalid_constants() {
        assert!(SettleAnimationDriver::from_constants(1.5, 0.4).is_err());
        assert!(SettleAnimationDriver::from_constants(0.9, 0.0).is_err());
        assert!(SettleAnimationDriver::from_constants(0.9, 0.4).is_ok());
    }

    #[test]
    fn settles_exactly_on_target() {
        let mut driver = SettleAnimationDriver::default();
        let done = Rc::new(Cell::new(None));
        let sink = Rc::clone(&done);
        driver.settle(
            SettleTarget::Initial,
            440.0,
            500.0,
            0.0,
            |_, _| {},
            Some(Box::new(move |y| sink.set(Some(y)))),
        );
        let result = driver.run_to_rest(FRAME, 600);
        assert!(matches!(
            result,
            SettleTick::Settled {
                target: SettleTarget::Initial,
                offset,
                ..
            } if offset == 440.0
        ));
        assert_eq!(done.get(), Some(440.0));
        assert!(!driver.is_animating());
    }

    #[test]
    fn will_settle_runs_before_first_frame_with_target() {
        let mut driver = SettleAnimationDriver::default();
        let seen = Rc::new(Cell::new(0.0));
        let sink = Rc::clone(&seen);
        driver.settle(SettleTarget::Final, 48.0, 200.0, 0.0, move |y, _| sink.set(y), None);
        assert_eq!(seen.get(), 48.0);
    }

    #[test]
    fn attachments_follow_every_frame() {
        let mut driver = SettleAnimationDriver::default();
        let frames = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&frames);
        driver.settle(
            SettleTarget::Final,
            48.0,
            300.0,
            -800.0,
            move |_, handle| handle.attach(move |p| sink.borrow_mut().push(p)),
            None,
        );
        driver.run_to_rest(FRAME, 600);
        let frames = frames.borrow();
        assert!(frames.len() > 1);
        let last = frames.last().unwrap();
        assert!(last.finished);
        assert_eq!(last.position, 48.0);
        assert!(frames[..frames.len() - 1].iter().all(|p| !p.finished));
    }

    #[test]
    fn initial_velocity_carries_into_first_frame() {
        let mut slow = SettleAnimationDriver::default();
        let mut fast = SettleAnimationDriver::default();
        slow.settle(SettleTarget::Dismissed, 800.0, 500.0, 0.0, |_, _| {}, None);
        fast.settle(SettleTarget::Dismissed, 800.0, 500.0, 2000.0, |_, _| {}, None);
        let SettleTick::Frame { position: p_slow, .. } = slow.tick(FRAME) else {
            panic!("expected frame");
        };
        let SettleTick::Frame { position: p_fast, .. } = fast.tick(FRAME) else {
            panic!("expected frame");
        };
        assert!(p_fast > p_slow);
    }

    #[test]
    fn superseded_settle_never_reports_completion() {
        let mut driver = SettleAnimationDriver::default();
        let stale = Rc::new(Cell::new(false));
        let sink = Rc::clone(&stale);
        let first = driver.settle(
            SettleTarget::Dismissed,
            800.0,
            600.0,
            0.0,
            |_, _| {},
            Some(Box::new(move |_| sink.set(true))),
        );
        driver.tick(FRAME);
        let second = driver.settle(SettleTarget::Initial, 440.0, 610.0, 0.0, |_, _| {}, None);
        assert_ne!(first, second);
        assert_eq!(driver.active_id(), Some(second));
        driver.run_to_rest(FRAME, 600);
        assert!(!stale.get());
    }

    #[test]
    fn cancel_drops_continuation() {
        let mut driver = SettleAnimationDriver::default();
        let fired = Rc::new(Cell::new(false));
        let sink = Rc::clone(&fired);
        let id = driver.settle(
            SettleTarget::Final,
            48.0,
            100.0,
            0.0,
            |_, _| {},
            Some(Box::new(move |_| sink.set(true))),
        );
        assert_eq!(driver.cancel(), Some(id));
        assert_eq!(driver.tick(FRAME), SettleTick::Idle);
        assert!(!fired.get());
        assert_eq!(driver.cancel(), None);
    }

    #[test]
    fn non_finite_inputs_are_sanitized() {
        let mut driver = SettleAnimationDriver::default();
        driver.settle(SettleTarget::Initial, 440.0, f64::NAN, f64::INFINITY, |_, _| {}, None);
        let result = driver.run_to_rest(FRAME, 600);
        assert!(matches!(result, SettleTick::Settled { offset, .. } if offset == 440.0));
    }

    #[test]
    fn ids_increase() {
        let mut driver = SettleAnimationDriver::default();
        let a = driver.settle(SettleTarget::Final, 48.0, 50.0, 0.0, |_, _| {}, None);
        let b = driver.settle(SettleTarget::Final, 48.0, 50.0, 0.0, |_, _| {}, None);
        assert!(b > a);
        assert_ne!(a, SettleId::DETACHED);
    }
}
