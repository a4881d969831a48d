#![forbid(unsafe_code)]

//! Recording transition context.

use std::cell::RefCell;
use std::rc::Rc;

use pullsheet_runtime::host::SurfaceId;
use pullsheet_runtime::transition::{ContentKey, TransitionCompletion, TransitionContext};

/// Transition context that logs every completion it receives.
///
/// Clones share one completion log.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransitionContext {
    pub from: Option<SurfaceId>,
    pub to: Option<SurfaceId>,
    pub container: Option<SurfaceId>,
    completions: Rc<RefCell<Vec<bool>>>,
}

impl RecordingTransitionContext {
    #[must_use]
    pub fn new(from: SurfaceId, to: SurfaceId, container: SurfaceId) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            container: Some(container),
            completions: Rc::default(),
        }
    }

    #[must_use]
    pub fn without_container(mut self) -> Self {
        self.container = None;
        self
    }

    /// `finished` flags delivered to this context's completions, in order.
    #[must_use]
    pub fn completions(&self) -> Vec<bool> {
        self.completions.borrow().clone()
    }
}

impl TransitionContext for RecordingTransitionContext {
    fn content(&self, key: ContentKey) -> Option<SurfaceId> {
        match key {
            ContentKey::From => self.from,
            ContentKey::To => self.to,
        }
    }

    fn container(&self) -> Option<SurfaceId> {
        self.container
    }

    fn completion(&mut self) -> TransitionCompletion {
        let log = Rc::clone(&self.completions);
        Box::new(move |finished| log.borrow_mut().push(finished))
    }
}
