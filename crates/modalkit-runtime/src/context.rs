#![forbid(unsafe_code)]

//! Shared session handle and the provider scope.
//!
//! [`ModalContext`] is a cheap, clonable handle to one [`ModalSession`].
//! Operations go through a FIFO command queue: when the context is idle a
//! command is applied at once; when it is already applying one (a close
//! callback or the renderer calling back into the context) the command is
//! queued and applied as soon as the current one has finished. Close
//! callbacks run with the session released, so they may freely open or
//! close modals.
//!
//! [`ModalContext::provide`] installs the context for the current thread
//! until the returned [`ModalProvider`] is dropped; [`use_modal_context`]
//! finds it again. Outside any provider it fails with
//! [`ModalError::NotInitialized`].
//!
//! # Re-entrancy
//!
//! Renderers run while the session is being updated. They should read the
//! projection they are handed and report gestures through the
//! [`ModalRequester`]; calling query methods such as
//! [`ModalContext::depth`] from inside a renderer panics.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use modalkit_core::{Event, ModalId, SharedIds};
use modalkit_widgets::modal::{ClosingPolicy, ConfirmChoice, ModalDescriptor, ModalHit, ModalSpec};

use crate::config::ModalConfig;
use crate::error::ModalError;
use crate::renderer::{CloseRequest, CloseTrigger, ModalRequest, ModalRequester};
use crate::session::{ModalCommand, ModalSession};

thread_local! {
    static PROVIDERS: RefCell<Vec<Rc<dyn Any>>> = const { RefCell::new(Vec::new()) };
}

struct Inner<C> {
    session: RefCell<ModalSession<C>>,
    ids: SharedIds,
    requester: ModalRequester,
    queue: RefCell<VecDeque<ModalCommand<C>>>,
    draining: Cell<bool>,
}

/// Clonable handle to a modal session.
pub struct ModalContext<C> {
    inner: Rc<Inner<C>>,
}

impl<C> Clone for ModalContext<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<C> Default for ModalContext<C> {
    fn default() -> Self {
        Self::new(ModalSession::default())
    }
}

impl<C> std::fmt::Debug for ModalContext<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalContext")
            .field("queued", &self.inner.queue.borrow().len())
            .field("draining", &self.inner.draining.get())
            .finish_non_exhaustive()
    }
}

/// Sets the draining flag and restores its previous value on drop, even if
/// a callback panics.
struct DrainGuard<'a> {
    flag: &'a Cell<bool>,
    was: bool,
}

impl<'a> DrainGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        let was = flag.replace(true);
        Self { flag, was }
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(self.was);
    }
}

impl<C> ModalContext<C> {
    /// Wrap an existing session.
    pub fn new(session: ModalSession<C>) -> Self {
        let ids = session.id_source();
        let requester = session.requester();
        Self {
            inner: Rc::new(Inner {
                session: RefCell::new(session),
                ids,
                requester,
                queue: RefCell::new(VecDeque::new()),
                draining: Cell::new(false),
            }),
        }
    }

    /// A context over a fresh session built from `config`.
    pub fn with_config(config: ModalConfig) -> Self {
        Self::new(ModalSession::new(config))
    }

    // --- Lifecycle ---

    /// Open a modal. The id is valid immediately even if the open itself is
    /// still queued.
    ///
    /// The id is checked against the live modals when it is drawn. An open
    /// issued from inside a renderer cannot see the stack; if its id happens
    /// to collide by the time the open is applied, the session issues a new
    /// one and the returned id is stale. This needs an entropy collision and
    /// cannot happen with sequential ids.
    pub fn open_modal(&self, spec: ModalSpec<C>) -> ModalId {
        let id = match self.inner.session.try_borrow() {
            Ok(session) => session.fresh_id(),
            Err(_) => self.inner.ids.next(),
        };
        self.submit(ModalCommand::Open { id, spec });
        id
    }

    /// See [`ModalSession::close_modal`].
    pub fn close_modal(&self, id: Option<ModalId>) {
        self.submit(ModalCommand::Close(id));
    }

    pub fn force_close(&self, id: ModalId) {
        self.submit(ModalCommand::ForceClose(id));
    }

    pub fn confirm(&self, id: ModalId) {
        self.submit(ModalCommand::Resolve {
            id,
            choice: ConfirmChoice::Confirm,
        });
    }

    pub fn cancel(&self, id: ModalId) {
        self.submit(ModalCommand::Resolve {
            id,
            choice: ConfirmChoice::Cancel,
        });
    }

    pub fn request_close(&self, id: ModalId, trigger: CloseTrigger) {
        self.submit(ModalCommand::Request(ModalRequest::Close(CloseRequest {
            id,
            trigger,
        })));
    }

    /// Route an input event to the top modal.
    ///
    /// Returns whether a modal captured the event. Events submitted while
    /// the context is busy are queued and report `false`.
    pub fn handle_event(&self, event: &Event, hit: Option<ModalHit>) -> bool {
        self.submit(ModalCommand::Input { event: *event, hit })
            .unwrap_or(false)
    }

    pub fn set_closing_policy(&self, id: ModalId, policy: Option<ClosingPolicy>) {
        self.submit(ModalCommand::SetPolicy { id, policy });
    }

    pub fn close_all(&self) {
        self.submit(ModalCommand::CloseAll);
    }

    /// Apply gestures waiting in the requester.
    pub fn pump(&self) {
        if !self.inner.draining.get() {
            self.drain(usize::MAX);
        }
    }

    // --- Queries ---

    pub fn depth(&self) -> usize {
        self.inner.session.borrow().depth()
    }

    pub fn top_id(&self) -> Option<ModalId> {
        self.inner.session.borrow().top_id()
    }

    pub fn contains(&self, id: ModalId) -> bool {
        self.inner.session.borrow().contains(id)
    }

    /// Run `f` over the current projection.
    pub fn with_projection<R>(&self, f: impl FnOnce(&[ModalDescriptor<'_, C>]) -> R) -> R {
        let session = self.inner.session.borrow();
        f(&session.projection())
    }

    /// Run `f` with mutable access to the session, e.g. to swap the renderer.
    ///
    /// Commands submitted through the context while `f` runs (from close
    /// callbacks or the renderer) are queued and applied after `f` returns,
    /// together with pending renderer requests. Query methods such as
    /// [`ModalContext::depth`] still panic when called from inside `f`.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut ModalSession<C>) -> R) -> R {
        let was_draining = self.inner.draining.get();
        let out = {
            let _guard = DrainGuard::enter(&self.inner.draining);
            f(&mut self.inner.session.borrow_mut())
        };
        if !was_draining {
            self.drain(usize::MAX);
        }
        out
    }

    pub fn requester(&self) -> ModalRequester {
        self.inner.requester.clone()
    }

    // --- Queue ---

    /// Queue `command` and, unless a drain is already running, apply the
    /// queue. Returns whether the command was captured, or `None` if it was
    /// deferred.
    fn submit(&self, command: ModalCommand<C>) -> Option<bool> {
        let position = {
            let mut queue = self.inner.queue.borrow_mut();
            if !self.inner.draining.get() {
                self.adopt_requests(&mut queue);
            }
            queue.push_back(command);
            queue.len() - 1
        };
        if self.inner.draining.get() {
            tracing::trace!(queued = position + 1, "modal command deferred");
            return None;
        }
        self.drain(position)
    }

    /// Move renderer gestures into the command queue, keeping arrival order.
    fn adopt_requests(&self, queue: &mut VecDeque<ModalCommand<C>>) {
        while let Some(request) = self.inner.requester.take() {
            queue.push_back(ModalCommand::Request(request));
        }
    }

    /// Apply queued commands until the queue is empty. Reports the captured
    /// flag of the command at `watch`.
    fn drain(&self, watch: usize) -> Option<bool> {
        let _guard = DrainGuard::enter(&self.inner.draining);
        let mut applied = 0usize;
        let mut watched = None;
        loop {
            let next = {
                let mut queue = self.inner.queue.borrow_mut();
                self.adopt_requests(&mut queue);
                queue.pop_front()
            };
            let Some(command) = next else {
                break;
            };
            let transition = self.inner.session.borrow_mut().apply(command);
            if applied == watch {
                watched = Some(transition.captured);
            }
            applied += 1;
            {
                let mut queue = self.inner.queue.borrow_mut();
                self.adopt_requests(&mut queue);
            }
            transition.fire();
        }
        watched
    }
}

impl<C: 'static> ModalContext<C> {
    /// Make this context the current one for the thread until the guard is
    /// dropped. Providers nest; the innermost wins.
    #[must_use = "dropping the provider uninstalls the context"]
    pub fn provide(&self) -> ModalProvider {
        let entry: Rc<dyn Any> = self.inner.clone();
        PROVIDERS.with(|p| p.borrow_mut().push(Rc::clone(&entry)));
        tracing::debug!("modal provider installed");
        ModalProvider { entry }
    }

    /// The innermost provided context for `C`.
    pub fn current() -> Result<Self, ModalError> {
        use_modal_context()
    }
}

/// Look up the innermost provided [`ModalContext`] for content type `C`.
pub fn use_modal_context<C: 'static>() -> Result<ModalContext<C>, ModalError> {
    PROVIDERS.with(|p| {
        p.borrow()
            .iter()
            .rev()
            .find_map(|entry| Rc::clone(entry).downcast::<Inner<C>>().ok())
            .map(|inner| ModalContext { inner })
            .ok_or(ModalError::NotInitialized)
    })
}

/// RAII guard returned by [`ModalContext::provide`].
#[must_use = "dropping the provider uninstalls the context"]
pub struct ModalProvider {
    entry: Rc<dyn Any>,
}

impl std::fmt::Debug for ModalProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalProvider").finish_non_exhaustive()
    }
}

impl Drop for ModalProvider {
    fn drop(&mut self) {
        PROVIDERS.with(|p| {
            let mut providers = p.borrow_mut();
            if let Some(idx) = providers.iter().rposition(|e| Rc::ptr_eq(e, &self.entry)) {
                providers.remove(idx);
            }
        });
    }
}
