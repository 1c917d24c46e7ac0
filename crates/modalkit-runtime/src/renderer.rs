#![forbid(unsafe_code)]

//! The seam between the modal session and whatever draws it.
//!
//! After every stack change the session hands its renderer the fresh
//! projection plus a [`ModalRequester`]. The renderer reports user gestures
//! through the requester and never decides on its own whether a close
//! succeeds; requests are queued and applied by the session in arrival order
//! once the current change is complete.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use modalkit_core::ModalId;
use modalkit_widgets::modal::ModalDescriptor;

/// Draws the modal layer.
pub trait ModalRenderer<C> {
    /// Present `projection` (bottom to top).
    fn render(&mut self, projection: &[ModalDescriptor<'_, C>], requester: &ModalRequester);
}

/// A renderer that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl<C> ModalRenderer<C> for NullRenderer {
    fn render(&mut self, _projection: &[ModalDescriptor<'_, C>], _requester: &ModalRequester) {}
}

/// Adapter turning a closure into a renderer.
pub(crate) struct FnRenderer<F>(pub(crate) F);

impl<C, F> ModalRenderer<C> for FnRenderer<F>
where
    F: FnMut(&[ModalDescriptor<'_, C>], &ModalRequester),
{
    fn render(&mut self, projection: &[ModalDescriptor<'_, C>], requester: &ModalRequester) {
        (self.0)(projection, requester)
    }
}

/// What caused a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseTrigger {
    /// The dialog's close control or an application call.
    Explicit,
    /// Pointer interaction outside the dialog bounds.
    Backdrop,
    /// The Escape key.
    Escape,
}

impl CloseTrigger {
    /// Backdrop and Escape are implicit: honored only for the top modal and
    /// only when that modal has not disabled them.
    pub const fn is_implicit(self) -> bool {
        matches!(self, Self::Backdrop | Self::Escape)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CloseRequest {
    pub id: ModalId,
    pub trigger: CloseTrigger,
}

/// A gesture reported by a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalRequest {
    Close(CloseRequest),
    Confirm(ModalId),
    Cancel(ModalId),
}

/// Queue handle renderers use to report gestures.
#[derive(Debug, Clone, Default)]
pub struct ModalRequester {
    queue: Rc<RefCell<VecDeque<ModalRequest>>>,
}

impl ModalRequester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_close(&self, id: ModalId, trigger: CloseTrigger) {
        self.push(ModalRequest::Close(CloseRequest { id, trigger }));
    }

    /// Answer "confirm" on confirmation modal `id`.
    pub fn confirm(&self, id: ModalId) {
        self.push(ModalRequest::Confirm(id));
    }

    /// Answer "cancel" on confirmation modal `id`.
    pub fn cancel(&self, id: ModalId) {
        self.push(ModalRequest::Cancel(id));
    }

    pub fn push(&self, request: ModalRequest) {
        self.queue.borrow_mut().push_back(request);
    }

    /// Number of requests waiting to be applied.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub(crate) fn take(&self) -> Option<ModalRequest> {
        self.queue.borrow_mut().pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_are_fifo() {
        let requester = ModalRequester::new();
        let a = ModalId::from_raw(1);
        let b = ModalId::from_raw(2);
        requester.request_close(a, CloseTrigger::Escape);
        requester.confirm(b);
        assert_eq!(requester.pending(), 2);
        assert_eq!(
            requester.take(),
            Some(ModalRequest::Close(CloseRequest {
                id: a,
                trigger: CloseTrigger::Escape
            }))
        );
        assert_eq!(requester.take(), Some(ModalRequest::Confirm(b)));
        assert_eq!(requester.take(), None);
    }

    #[test]
    fn clones_share_one_queue() {
        let requester = ModalRequester::new();
        let clone = requester.clone();
        clone.cancel(ModalId::from_raw(3));
        assert_eq!(requester.pending(), 1);
    }

    #[test]
    fn implicit_triggers() {
        assert!(CloseTrigger::Escape.is_implicit());
        assert!(CloseTrigger::Backdrop.is_implicit());
        assert!(!CloseTrigger::Explicit.is_implicit());
    }
}
