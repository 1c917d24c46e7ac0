#![forbid(unsafe_code)]

//! A renderer that remembers what it was shown.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use modalkit_core::ModalId;
use modalkit_runtime::{ModalRenderer, ModalRequest, ModalRequester};
use modalkit_widgets::modal::ModalDescriptor;

use crate::snapshot::{digest, projection_text};

/// One rendered projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Snapshot text of the projection.
    pub text: String,
    /// blake3 digest of `text`.
    pub digest: String,
    pub ids: Vec<ModalId>,
    pub top: Option<ModalId>,
}

impl Frame {
    fn capture<C>(projection: &[ModalDescriptor<'_, C>]) -> Self {
        let text = projection_text(projection);
        Self {
            digest: digest(&text),
            ids: projection.iter().map(ModalDescriptor::id).collect(),
            top: projection.iter().find(|d| d.is_top()).map(ModalDescriptor::id),
            text,
        }
    }

    pub fn depth(&self) -> usize {
        self.ids.len()
    }
}

#[derive(Debug, Default)]
struct Log {
    frames: Vec<Frame>,
    /// Gestures reported against the top modal, one per non-empty frame.
    script: VecDeque<fn(ModalId) -> ModalRequest>,
}

/// Records frames. Clones share the same log, so keep one clone for
/// assertions and hand the other to the session.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    log: Rc<RefCell<Log>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a gesture to report against the top modal of the next
    /// non-empty frame, as a user clicking on it would.
    pub fn script(&self, gesture: fn(ModalId) -> ModalRequest) {
        self.log.borrow_mut().script.push_back(gesture);
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.log.borrow().frames.clone()
    }

    pub fn len(&self) -> usize {
        self.log.borrow().frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.borrow().frames.is_empty()
    }

    pub fn last(&self) -> Option<Frame> {
        self.log.borrow().frames.last().cloned()
    }

    /// Snapshot text of the most recent frame, `"(empty)\n"` if none.
    pub fn last_text(&self) -> String {
        self.last()
            .map_or_else(|| "(empty)\n".to_string(), |frame| frame.text)
    }

    pub fn clear(&self) {
        self.log.borrow_mut().frames.clear();
    }
}

impl<C> ModalRenderer<C> for RecordingRenderer {
    fn render(&mut self, projection: &[ModalDescriptor<'_, C>], requester: &ModalRequester) {
        let frame = Frame::capture(projection);
        let mut log = self.log.borrow_mut();
        tracing::trace!(frame = log.frames.len(), depth = frame.depth(), "frame recorded");
        if let Some(top) = frame.top {
            if let Some(gesture) = log.script.pop_front() {
                requester.push(gesture(top));
            }
        }
        log.frames.push(frame);
    }
}
