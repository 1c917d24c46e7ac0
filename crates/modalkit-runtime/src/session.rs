#![forbid(unsafe_code)]

//! The lifecycle dispatcher.
//!
//! [`ModalSession`] owns the stack, the id generator and the renderer. Every
//! public operation is turned into a [`ModalCommand`] and applied to
//! completion: the stack is updated, removed modals are retired, and the
//! renderer is handed the fresh projection. Close callbacks fire after the
//! stack is consistent again. Requests the renderer queued while drawing are
//! applied afterwards, in arrival order.
//!
//! # Closing rules
//!
//! - `close_modal(None)` targets the top modal. Empty stack or unknown id is
//!   a silent no-op.
//! - A modal without a closing policy is removed and its callback fires once.
//! - A modal with a closing policy gets a confirmation pushed above it (at
//!   most one at a time); it stays open until the confirmation is answered.
//! - Closing a confirmation is the same as cancelling it.
//! - Escape and backdrop clicks only ever act on the top modal, and only
//!   when that modal has not disabled them. `force_close` ignores policies
//!   and flags alike.

use modalkit_core::{Event, IdGenerator, KeyCode, ModalId, SharedIds};
use modalkit_widgets::modal::{
    ClosingPolicy, CloseCallback, ConfirmChoice, ConfirmRequest, HitRegion, ModalDescriptor,
    ModalHit, ModalInstance, ModalSpec, ModalStack, project, reissue_confirmation,
    request_confirmation, resolve_confirmation,
};

use crate::config::ModalConfig;
use crate::renderer::{
    CloseRequest, CloseTrigger, FnRenderer, ModalRenderer, ModalRequest, ModalRequester,
};

/// One unit of work for the dispatcher.
pub(crate) enum ModalCommand<C> {
    Open { id: ModalId, spec: ModalSpec<C> },
    Close(Option<ModalId>),
    ForceClose(ModalId),
    Resolve { id: ModalId, choice: ConfirmChoice },
    Request(ModalRequest),
    Input { event: Event, hit: Option<ModalHit> },
    SetPolicy {
        id: ModalId,
        policy: Option<ClosingPolicy>,
    },
    CloseAll,
}

impl<C> ModalCommand<C> {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Open { .. } => "open",
            Self::Close(_) => "close",
            Self::ForceClose(_) => "force_close",
            Self::Resolve { .. } => "resolve",
            Self::Request(_) => "request",
            Self::Input { .. } => "input",
            Self::SetPolicy { .. } => "set_policy",
            Self::CloseAll => "close_all",
        }
    }
}

/// What applying a command did.
#[must_use = "a transition carries close callbacks that must be fired"]
pub(crate) struct Transition {
    pub(crate) changed: bool,
    pub(crate) captured: bool,
    callbacks: Vec<CloseCallback>,
}

impl Transition {
    fn new() -> Self {
        Self {
            changed: false,
            captured: false,
            callbacks: Vec::new(),
        }
    }

    /// Record a removed modal, keeping its close callback for later.
    fn retire<C>(&mut self, mut modal: ModalInstance<C>) {
        self.changed = true;
        if let Some(cb) = modal.take_on_close() {
            self.callbacks.push(cb);
        }
    }

    pub(crate) fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Run the collected close callbacks in removal order.
    pub(crate) fn fire(self) {
        for cb in self.callbacks {
            cb();
        }
    }
}

/// Owns the modal stack and applies lifecycle operations to it.
pub struct ModalSession<C> {
    stack: ModalStack<C>,
    ids: SharedIds,
    config: ModalConfig,
    renderer: Option<Box<dyn ModalRenderer<C>>>,
    requester: ModalRequester,
    frames: u64,
}

impl<C> Default for ModalSession<C> {
    fn default() -> Self {
        Self::new(ModalConfig::default())
    }
}

impl<C> std::fmt::Debug for ModalSession<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalSession")
            .field("modals", &self.stack.ids())
            .field("config", &self.config)
            .field("has_renderer", &self.renderer.is_some())
            .field("frames", &self.frames)
            .finish()
    }
}

impl<C> ModalSession<C> {
    /// Create a session with no renderer attached.
    pub fn new(config: ModalConfig) -> Self {
        let ids = SharedIds::new(IdGenerator::with_strategy(config.id_strategy));
        Self {
            stack: ModalStack::new(),
            ids,
            config,
            renderer: None,
            requester: ModalRequester::new(),
            frames: 0,
        }
    }

    /// Attach a renderer (builder form).
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl ModalRenderer<C> + 'static) -> Self {
        self.set_renderer(renderer);
        self
    }

    /// Replace the renderer. The new one is handed the current projection
    /// straight away.
    pub fn set_renderer(&mut self, renderer: impl ModalRenderer<C> + 'static) {
        self.renderer = Some(Box::new(renderer));
        self.render();
        self.pump();
    }

    /// Attach a closure as the renderer.
    pub fn render_with<F>(&mut self, f: F)
    where
        F: FnMut(&[ModalDescriptor<'_, C>], &ModalRequester) + 'static,
    {
        self.set_renderer(FnRenderer(f));
    }

    // --- Lifecycle ---

    /// Push a new modal and return its id. Never fails.
    pub fn open_modal(&mut self, spec: ModalSpec<C>) -> ModalId {
        let id = self.fresh_id();
        self.run(ModalCommand::Open { id, spec });
        id
    }

    /// Close `id`, or the top modal when `None`.
    ///
    /// Modals with a closing policy are not removed; a confirmation is
    /// pushed instead.
    pub fn close_modal(&mut self, id: Option<ModalId>) {
        self.run(ModalCommand::Close(id));
    }

    /// Remove `id` regardless of policy and flags.
    pub fn force_close(&mut self, id: ModalId) {
        self.run(ModalCommand::ForceClose(id));
    }

    /// Answer "confirm" on confirmation `id`: both it and its target go.
    pub fn confirm(&mut self, id: ModalId) {
        self.run(ModalCommand::Resolve {
            id,
            choice: ConfirmChoice::Confirm,
        });
    }

    /// Answer "cancel" on confirmation `id`: only the confirmation goes.
    pub fn cancel(&mut self, id: ModalId) {
        self.run(ModalCommand::Resolve {
            id,
            choice: ConfirmChoice::Cancel,
        });
    }

    /// Apply a close request as a renderer would report it.
    pub fn request_close(&mut self, id: ModalId, trigger: CloseTrigger) {
        self.run(ModalCommand::Request(ModalRequest::Close(CloseRequest {
            id,
            trigger,
        })));
    }

    /// Route an input event to the top modal.
    ///
    /// `hit` is the renderer's hit test for pointer events. Returns `true`
    /// when a modal was open to capture the event.
    pub fn handle_event(&mut self, event: &Event, hit: Option<ModalHit>) -> bool {
        self.run(ModalCommand::Input { event: *event, hit })
    }

    /// Set or clear the closing policy of an open modal.
    ///
    /// A pending confirmation that is the top modal is re-issued with the
    /// new text. Clearing the policy leaves a pending confirmation in place.
    pub fn set_closing_policy(&mut self, id: ModalId, policy: Option<ClosingPolicy>) {
        self.run(ModalCommand::SetPolicy { id, policy });
    }

    /// Force-close every modal, top first.
    pub fn close_all(&mut self) {
        self.run(ModalCommand::CloseAll);
    }

    /// Apply requests queued through the [`ModalRequester`].
    pub fn pump(&mut self) {
        while let Some(request) = self.requester.take() {
            let transition = self.apply(ModalCommand::Request(request));
            transition.fire();
        }
    }

    // --- Queries ---

    /// Renderer view of the stack, bottom to top.
    pub fn projection(&self) -> Vec<ModalDescriptor<'_, C>> {
        project(&self.stack, self.config.layers)
    }

    pub fn stack(&self) -> &ModalStack<C> {
        &self.stack
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn top_id(&self) -> Option<ModalId> {
        self.stack.top_id()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn contains(&self, id: ModalId) -> bool {
        self.stack.contains(id)
    }

    pub fn config(&self) -> &ModalConfig {
        &self.config
    }

    /// Handle for reporting gestures outside of a render pass.
    pub fn requester(&self) -> ModalRequester {
        self.requester.clone()
    }

    /// How many projections have been handed to the renderer.
    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub(crate) fn id_source(&self) -> SharedIds {
        self.ids.clone()
    }

    /// An id not held by any live modal.
    pub(crate) fn fresh_id(&self) -> ModalId {
        loop {
            let id = self.ids.next();
            if !self.stack.contains(id) {
                return id;
            }
            tracing::warn!(%id, "generated modal id collides with a live modal, retrying");
        }
    }

    // --- Dispatch ---

    fn run(&mut self, command: ModalCommand<C>) -> bool {
        let transition = self.apply(command);
        let captured = transition.captured;
        transition.fire();
        self.pump();
        captured
    }

    /// Apply one command and render if the stack changed.
    ///
    /// Callbacks are handed back unfired.
    pub(crate) fn apply(&mut self, command: ModalCommand<C>) -> Transition {
        let _span = tracing::debug_span!(
            "modal_command",
            command = command.name(),
            depth = self.stack.depth()
        )
        .entered();

        let mut tx = Transition::new();
        match command {
            ModalCommand::Open { id, spec } => self.open(id, spec, &mut tx),
            ModalCommand::Close(target) => self.close(target, &mut tx),
            ModalCommand::ForceClose(id) => self.remove(id, &mut tx),
            ModalCommand::Resolve { id, choice } => self.resolve(id, choice, &mut tx),
            ModalCommand::Request(request) => self.request(request, &mut tx),
            ModalCommand::Input { event, hit } => self.input(&event, hit, &mut tx),
            ModalCommand::SetPolicy { id, policy } => self.set_policy(id, policy, &mut tx),
            ModalCommand::CloseAll => {
                for modal in self.stack.drain_lifo() {
                    tx.retire(modal);
                }
            }
        }

        if tx.changed {
            tracing::debug!(
                depth = self.stack.depth(),
                callbacks = tx.callback_count(),
                "modal stack changed"
            );
            self.render();
        }
        tx
    }

    fn render(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        let projection = project(&self.stack, self.config.layers);
        renderer.render(&projection, &self.requester);
        self.frames += 1;
    }

    fn open(&mut self, id: ModalId, spec: ModalSpec<C>, tx: &mut Transition) {
        let id = if self.stack.contains(id) {
            tracing::warn!(%id, "modal id already live, issuing a new one");
            self.fresh_id()
        } else {
            id
        };
        let modal = spec.into_instance(id, &self.config.theme, self.config.default_size);
        self.stack.push(modal);
        tx.changed = true;
        tracing::debug!(%id, "modal opened");
    }

    fn close(&mut self, target: Option<ModalId>, tx: &mut Transition) {
        let Some(id) = target.or_else(|| self.stack.top_id()) else {
            tracing::trace!("close on empty stack ignored");
            return;
        };
        let Some(modal) = self.stack.get(id) else {
            tracing::trace!(%id, "close for unknown modal ignored");
            return;
        };
        if modal.is_confirmation() {
            self.resolve(id, ConfirmChoice::Cancel, tx);
            return;
        }

        let ids = &self.ids;
        match request_confirmation(&mut self.stack, id, || ids.next(), &self.config.confirmation)
        {
            ConfirmRequest::NotRequired => self.remove(id, tx),
            ConfirmRequest::Pushed(confirmation) => {
                tx.changed = true;
                tracing::debug!(%id, %confirmation, "close deferred to confirmation");
            }
            ConfirmRequest::AlreadyPending(confirmation) => {
                tracing::trace!(%id, %confirmation, "confirmation already pending");
            }
            ConfirmRequest::TargetMissing => {
                tracing::trace!(%id, "close for unknown modal ignored");
            }
        }
    }

    fn remove(&mut self, id: ModalId, tx: &mut Transition) {
        match self.stack.remove_by_id(id) {
            Ok(modal) => {
                tracing::debug!(%id, "modal closed");
                tx.retire(modal);
            }
            Err(err) => tracing::trace!(%err, "removal ignored"),
        }
    }

    fn resolve(&mut self, id: ModalId, choice: ConfirmChoice, tx: &mut Transition) {
        let resolution = resolve_confirmation(&mut self.stack, id, choice);
        if resolution.is_noop() {
            tracing::trace!(%id, ?choice, "no confirmation to resolve");
            return;
        }
        for modal in resolution.into_removed() {
            tx.retire(modal);
        }
    }

    fn set_policy(&mut self, id: ModalId, policy: Option<ClosingPolicy>, tx: &mut Transition) {
        let refresh = policy.is_some();
        if let Err(err) = self.stack.set_closing_policy(id, policy) {
            tracing::trace!(%err, "closing policy update ignored");
            return;
        }
        if !refresh || self.stack.pending_confirmation_for(id).is_none() {
            return;
        }
        let ids = &self.ids;
        let style = &self.config.confirmation;
        if let ConfirmRequest::Pushed(confirmation) =
            reissue_confirmation(&mut self.stack, id, || ids.next(), style)
        {
            tx.changed = true;
            tracing::debug!(%id, %confirmation, "pending confirmation reissued");
        }
    }

    fn request(&mut self, request: ModalRequest, tx: &mut Transition) {
        match request {
            ModalRequest::Close(CloseRequest { id, trigger }) => {
                if trigger.is_implicit() && !self.implicit_allowed(id, trigger) {
                    tracing::trace!(%id, ?trigger, "implicit close suppressed");
                    return;
                }
                self.close(Some(id), tx);
            }
            ModalRequest::Confirm(id) => self.resolve(id, ConfirmChoice::Confirm, tx),
            ModalRequest::Cancel(id) => self.resolve(id, ConfirmChoice::Cancel, tx),
        }
    }

    /// Implicit triggers reach only the top modal, and only if it allows them.
    fn implicit_allowed(&self, id: ModalId, trigger: CloseTrigger) -> bool {
        let Some(top) = self.stack.top() else {
            return false;
        };
        if top.id() != id {
            return false;
        }
        match trigger {
            CloseTrigger::Escape => top.closes_on_escape(),
            CloseTrigger::Backdrop => top.closes_on_backdrop(),
            CloseTrigger::Explicit => true,
        }
    }

    fn input(&mut self, event: &Event, hit: Option<ModalHit>, tx: &mut Transition) {
        let Some(top) = self.stack.top() else {
            return;
        };
        tx.captured = true;
        let top_id = top.id();
        let on_confirmation = top.is_confirmation();

        if event.is_press_of(KeyCode::Escape) {
            let request = CloseRequest {
                id: top_id,
                trigger: CloseTrigger::Escape,
            };
            self.request(ModalRequest::Close(request), tx);
        } else if event.is_press_of(KeyCode::Enter) && on_confirmation {
            self.resolve(top_id, ConfirmChoice::Confirm, tx);
        } else if event.is_primary_click() {
            let Some(hit) = hit else {
                return;
            };
            if hit.id != top_id {
                tracing::trace!(id = %hit.id, "pointer hit on covered modal ignored");
                return;
            }
            match hit.region {
                HitRegion::Backdrop => {
                    let request = CloseRequest {
                        id: top_id,
                        trigger: CloseTrigger::Backdrop,
                    };
                    self.request(ModalRequest::Close(request), tx);
                }
                HitRegion::Confirm if on_confirmation => {
                    self.resolve(top_id, ConfirmChoice::Confirm, tx);
                }
                HitRegion::Cancel if on_confirmation => {
                    self.resolve(top_id, ConfirmChoice::Cancel, tx);
                }
                HitRegion::Content | HitRegion::Confirm | HitRegion::Cancel => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modalkit_core::{IdStrategy, KeyEvent, KeyEventKind};
    use modalkit_widgets::modal::{BASE_LAYER, ModalContent, NoticeKind};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn session() -> ModalSession<&'static str> {
        ModalSession::new(ModalConfig::default().with_id_strategy(IdStrategy::Sequential))
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (count, move || c.set(c.get() + 1))
    }

    fn guarded(body: &'static str, cb: impl FnOnce() + 'static) -> ModalSpec<&'static str> {
        ModalSpec::new(body)
            .closing_policy(ClosingPolicy::warn("Unsaved changes"))
            .on_close(cb)
    }

    fn escape() -> Event {
        Event::key(KeyCode::Escape)
    }

    #[test]
    fn projection_tracks_opens() {
        let mut s = session();
        assert!(s.projection().is_empty());
        for n in 1..=4 {
            s.open_modal(ModalSpec::new("m"));
            let view = s.projection();
            assert_eq!(view.len(), n);
            assert_eq!(view.iter().filter(|d| d.is_top()).count(), 1);
            assert!(view.last().is_some_and(|d| d.is_top()));
        }
        let layers: Vec<u32> = s.projection().iter().map(|d| d.layer_index()).collect();
        assert_eq!(layers, vec![1000, 1010, 1020, 1030]);
    }

    #[test]
    fn open_fills_defaults() {
        let mut s = session();
        let id = s.open_modal(ModalSpec::new("body").header_style(""));
        let view = s.projection();
        assert_eq!(view[0].id(), id);
        assert_eq!(view[0].header_style(), "bg-blue-500 text-white");
        assert_eq!(view[0].body_style(), "bg-gray-800 text-white");
        assert_eq!(view[0].layer_index(), BASE_LAYER);
    }

    #[test]
    fn close_without_policy_fires_once() {
        let mut s = session();
        let (count, cb) = counter();
        let id = s.open_modal(ModalSpec::new("a").on_close(cb));
        s.close_modal(Some(id));
        assert!(s.is_empty());
        assert_eq!(count.get(), 1);
        s.close_modal(Some(id));
        s.close_modal(None);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn close_none_targets_top_only() {
        let mut s = session();
        let a = s.open_modal(ModalSpec::new("a"));
        let _b = s.open_modal(ModalSpec::new("b"));
        s.close_modal(None);
        assert_eq!(s.stack().ids(), vec![a]);
    }

    #[test]
    fn close_unknown_id_is_noop() {
        let mut s = session();
        let a = s.open_modal(ModalSpec::new("a"));
        let frames = s.frames_rendered();
        s.close_modal(Some(ModalId::from_raw(999)));
        assert_eq!(s.stack().ids(), vec![a]);
        assert_eq!(s.frames_rendered(), frames);
    }

    #[test]
    fn policy_close_pushes_one_confirmation() {
        let mut s = session();
        let (count, cb) = counter();
        let a = s.open_modal(guarded("a", cb));
        s.close_modal(Some(a));
        assert_eq!(s.depth(), 2);
        let top = s.stack().top().expect("confirmation on top");
        assert_eq!(top.confirmation_target(), Some(a));
        let prompt = top.content().as_confirmation().expect("prompt");
        assert_eq!(prompt.notice(), NoticeKind::Warn);
        assert_eq!(prompt.message(), "Unsaved changes");
        assert_eq!(top.header_style(), "bg-red-600 text-white");
        assert!(s.contains(a));
        assert_eq!(count.get(), 0);

        s.close_modal(Some(a));
        s.close_modal(Some(a));
        assert_eq!(s.depth(), 2);
    }

    #[test]
    fn confirm_removes_both_and_fires_once() {
        let mut s = session();
        let (count, cb) = counter();
        let a = s.open_modal(guarded("a", cb));
        s.close_modal(Some(a));
        let c = s.top_id().expect("confirmation");
        s.confirm(c);
        assert!(s.is_empty());
        assert_eq!(count.get(), 1);
        s.confirm(c);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn cancel_removes_confirmation_only() {
        let mut s = session();
        let (count, cb) = counter();
        let a = s.open_modal(guarded("a", cb));
        s.close_modal(Some(a));
        let c = s.top_id().expect("confirmation");
        s.cancel(c);
        assert_eq!(s.stack().ids(), vec![a]);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn warn_scenario_round_trip() {
        let mut s = session();
        let (count, cb) = counter();
        let a = s.open_modal(guarded("a", cb));

        s.close_modal(None);
        let c1 = s.top_id().expect("first confirmation");
        assert_eq!(s.stack().ids(), vec![a, c1]);

        s.cancel(c1);
        assert_eq!(s.stack().ids(), vec![a]);

        s.close_modal(None);
        let c2 = s.top_id().expect("second confirmation");
        assert_ne!(c1, c2);
        assert_eq!(s.stack().ids(), vec![a, c2]);

        s.confirm(c2);
        assert!(s.is_empty());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn closing_a_confirmation_cancels_it() {
        let mut s = session();
        let a = s.open_modal(guarded("a", || {}));
        s.close_modal(Some(a));
        s.close_modal(None);
        assert_eq!(s.stack().ids(), vec![a]);
    }

    #[test]
    fn escape_closes_top_when_allowed() {
        let mut s = session();
        let a = s.open_modal(ModalSpec::new("a"));
        let _b = s.open_modal(ModalSpec::new("b"));
        assert!(s.handle_event(&escape(), None));
        assert_eq!(s.stack().ids(), vec![a]);
    }

    #[test]
    fn escape_disabled_changes_nothing() {
        let mut s = session();
        let (count, cb) = counter();
        let a = s.open_modal(ModalSpec::new("a").disable_escape_close(true).on_close(cb));
        let frames = s.frames_rendered();
        s.handle_event(&escape(), None);
        s.request_close(a, CloseTrigger::Escape);
        assert_eq!(s.stack().ids(), vec![a]);
        assert_eq!(count.get(), 0);
        assert_eq!(s.frames_rendered(), frames);

        s.close_modal(Some(a));
        assert!(s.is_empty());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn escape_release_is_ignored() {
        let mut s = session();
        s.open_modal(ModalSpec::new("a"));
        let release = Event::Key(KeyEvent::new(KeyCode::Escape).with_kind(KeyEventKind::Release));
        s.handle_event(&release, None);
        assert_eq!(s.depth(), 1);
    }

    #[test]
    fn backdrop_click_respects_flag_and_top() {
        let mut s = session();
        let a = s.open_modal(ModalSpec::new("a"));
        let b = s.open_modal(ModalSpec::new("b").disable_backdrop_close(true));

        s.handle_event(&Event::click(0, 0), Some(ModalHit::backdrop(b)));
        assert_eq!(s.depth(), 2);

        s.request_close(a, CloseTrigger::Backdrop);
        assert_eq!(s.depth(), 2);

        s.handle_event(&Event::click(0, 0), Some(ModalHit::backdrop(a)));
        assert_eq!(s.depth(), 2);

        s.force_close(b);
        s.handle_event(&Event::click(0, 0), Some(ModalHit::backdrop(a)));
        assert!(s.is_empty());
    }

    #[test]
    fn content_click_does_nothing() {
        let mut s = session();
        let a = s.open_modal(ModalSpec::new("a"));
        let hit = ModalHit::new(a, HitRegion::Content);
        assert!(s.handle_event(&Event::click(5, 5), Some(hit)));
        assert_eq!(s.depth(), 1);
    }

    #[test]
    fn events_pass_through_empty_stack() {
        let mut s = session();
        assert!(!s.handle_event(&escape(), None));
        assert!(!s.handle_event(&Event::Other, None));
    }

    #[test]
    fn implicit_close_still_goes_through_confirmation() {
        let mut s = session();
        let (count, cb) = counter();
        let a = s.open_modal(guarded("a", cb));
        s.handle_event(&escape(), None);
        assert_eq!(s.depth(), 2);
        assert_eq!(count.get(), 0);

        let c = s.top_id().expect("confirmation");
        s.handle_event(&Event::click(1, 1), Some(ModalHit::new(c, HitRegion::Confirm)));
        assert!(!s.contains(a));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn enter_confirms_and_escape_cancels() {
        let mut s = session();
        let a = s.open_modal(guarded("a", || {}));
        s.close_modal(None);
        s.handle_event(&escape(), None);
        assert_eq!(s.stack().ids(), vec![a]);

        s.close_modal(None);
        s.handle_event(&Event::key(KeyCode::Enter), None);
        assert!(s.is_empty());
    }

    #[test]
    fn enter_on_plain_modal_does_nothing() {
        let mut s = session();
        s.open_modal(ModalSpec::new("a"));
        s.handle_event(&Event::key(KeyCode::Enter), None);
        assert_eq!(s.depth(), 1);
    }

    #[test]
    fn force_close_ignores_policy_and_flags() {
        let mut s = session();
        let (count, cb) = counter();
        let a = s.open_modal(
            guarded("a", cb)
                .disable_escape_close(true)
                .disable_backdrop_close(true),
        );
        s.force_close(a);
        assert!(s.is_empty());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn confirming_after_target_vanished_removes_confirmation_only() {
        let mut s = session();
        let (count, cb) = counter();
        let a = s.open_modal(guarded("a", cb));
        s.close_modal(Some(a));
        let c = s.top_id().expect("confirmation");
        s.force_close(a);
        assert_eq!(count.get(), 1);
        assert_eq!(s.stack().ids(), vec![c]);
        s.confirm(c);
        assert!(s.is_empty());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn set_closing_policy_toggles_confirmation() {
        let mut s = session();
        let a = s.open_modal(ModalSpec::new("a"));
        s.set_closing_policy(a, Some(ClosingPolicy::notify("Saved draft will be kept")));
        s.close_modal(Some(a));
        assert_eq!(s.depth(), 2);
        let c = s.top_id().expect("confirmation");
        assert_eq!(
            s.stack().top().map(|m| m.header_style().to_string()),
            Some("bg-blue-600 text-white".to_string())
        );
        s.cancel(c);

        s.set_closing_policy(a, None);
        s.close_modal(Some(a));
        assert!(s.is_empty());
    }

    #[test]
    fn policy_change_reissues_top_confirmation() {
        let mut s = session();
        let a = s.open_modal(guarded("a", || {}));
        s.close_modal(Some(a));
        let first = s.top_id().expect("confirmation");
        s.set_closing_policy(a, Some(ClosingPolicy::notify("Draft saved")));
        let second = s.top_id().expect("reissued confirmation");
        assert_ne!(first, second);
        assert_eq!(s.depth(), 2);
        let prompt = s
            .stack()
            .top()
            .and_then(|m| m.content().as_confirmation().cloned())
            .expect("prompt");
        assert_eq!(prompt.message(), "Draft saved");
        assert_eq!(prompt.notice(), NoticeKind::Notify);
        assert_eq!(prompt.target(), a);
    }

    #[test]
    fn buried_confirmation_is_not_reissued() {
        let mut s = session();
        let a = s.open_modal(guarded("a", || {}));
        s.close_modal(Some(a));
        let c = s.top_id().expect("confirmation");
        let help = s.open_modal(ModalSpec::new("help"));
        s.set_closing_policy(a, Some(ClosingPolicy::warn("Changed")));
        assert_eq!(s.stack().ids(), vec![a, c, help]);
    }

    #[test]
    fn close_all_fires_top_first() {
        let mut s = session();
        let order = Rc::new(RefCell::new(Vec::new()));
        for name in ["a", "b", "c"] {
            let order = Rc::clone(&order);
            s.open_modal(guarded(name, move || order.borrow_mut().push(name)));
        }
        s.close_all();
        assert!(s.is_empty());
        assert_eq!(*order.borrow(), vec!["c", "b", "a"]);
    }

    #[test]
    fn renderer_sees_each_change() {
        let frames = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&frames);
        let mut s = session();
        s.render_with(move |view: &[ModalDescriptor<'_, &'static str>], _: &ModalRequester| {
            sink.borrow_mut()
                .push(view.iter().map(|d| (d.id(), d.is_top())).collect::<Vec<_>>());
        });
        let a = s.open_modal(ModalSpec::new("a"));
        let b = s.open_modal(ModalSpec::new("b"));
        s.close_modal(None);

        let frames = frames.borrow();
        assert_eq!(frames.len(), 4);
        assert!(frames[0].is_empty());
        assert_eq!(frames[1], vec![(a, true)]);
        assert_eq!(frames[2], vec![(a, false), (b, true)]);
        assert_eq!(frames[3], vec![(a, true)]);
        assert_eq!(s.frames_rendered(), 4);
    }

    #[test]
    fn renderer_requests_apply_after_render() {
        let mut s = session();
        let closed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&closed);
        s.render_with(move |view: &[ModalDescriptor<'_, &'static str>], req: &ModalRequester| {
            if let Some(top) = view.last() {
                if top.content().as_custom() == Some(&"transient") {
                    req.request_close(top.id(), CloseTrigger::Explicit);
                    flag.set(true);
                }
            }
        });
        let a = s.open_modal(ModalSpec::new("a"));
        s.open_modal(ModalSpec::new("transient"));
        assert!(closed.get());
        assert_eq!(s.stack().ids(), vec![a]);
    }

    #[test]
    fn requester_gestures_wait_for_pump() {
        let mut s = session();
        let a = s.open_modal(guarded("a", || {}));
        s.close_modal(None);
        let c = s.top_id().expect("confirmation");
        let requester = s.requester();
        requester.confirm(c);
        assert_eq!(s.depth(), 2);
        s.pump();
        assert!(!s.contains(a));
        assert_eq!(requester.pending(), 0);
    }

    #[test]
    fn confirmation_content_is_builtin() {
        let mut s = session();
        let a = s.open_modal(guarded("a", || {}));
        s.close_modal(Some(a));
        let view = s.projection();
        assert!(matches!(view[0].content(), ModalContent::Custom("a")));
        assert!(view[1].is_confirmation());
        assert_eq!(view[1].title(), "Confirm");
    }

    #[test]
    fn reopened_ids_are_fresh() {
        let mut s = session();
        let a = s.open_modal(ModalSpec::new("a"));
        s.close_modal(Some(a));
        let b = s.open_modal(ModalSpec::new("b"));
        assert_ne!(a, b);
    }

    #[test]
    fn entropy_ids_are_distinct() {
        let mut s: ModalSession<()> = ModalSession::default();
        let ids: Vec<ModalId> = (0..32).map(|_| s.open_modal(ModalSpec::new(()))).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
    }

    #[tracing_test::traced_test]
    #[test]
    fn suppressed_escape_is_traced() {
        let mut s = session();
        s.open_modal(ModalSpec::new("a").disable_escape_close(true));
        s.handle_event(&escape(), None);
        assert!(logs_contain("implicit close suppressed"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Open { guarded: bool },
            Close,
            CloseAt(usize),
            Escape,
            Confirm,
            Cancel,
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                3 => any::<bool>().prop_map(|guarded| Op::Open { guarded }),
                2 => Just(Op::Close),
                2 => (0usize..8).prop_map(Op::CloseAt),
                1 => Just(Op::Escape),
                1 => Just(Op::Confirm),
                1 => Just(Op::Cancel),
            ]
        }

        proptest! {
            #[test]
            fn stack_invariants_hold(ops in proptest::collection::vec(op(), 0..40)) {
                let mut s = session();
                let fired = Rc::new(RefCell::new(Vec::<ModalId>::new()));
                let mut opened = Vec::new();

                for op in ops {
                    match op {
                        Op::Open { guarded } => {
                            let slot = Rc::new(Cell::new(None));
                            let log = Rc::clone(&fired);
                            let seen = Rc::clone(&slot);
                            let mut spec = ModalSpec::new("m").on_close(move || {
                                if let Some(id) = seen.get() {
                                    log.borrow_mut().push(id);
                                }
                            });
                            if guarded {
                                spec = spec.closing_policy(ClosingPolicy::warn("Unsaved changes"));
                            }
                            let id = s.open_modal(spec);
                            slot.set(Some(id));
                            opened.push(id);
                        }
                        Op::Close => s.close_modal(None),
                        Op::CloseAt(i) => s.close_modal(s.stack().ids().get(i).copied()),
                        Op::Escape => {
                            s.handle_event(&Event::key(KeyCode::Escape), None);
                        }
                        Op::Confirm => {
                            if let Some(top) = s.top_id() {
                                s.confirm(top);
                            }
                        }
                        Op::Cancel => {
                            if let Some(top) = s.top_id() {
                                s.cancel(top);
                            }
                        }
                    }

                    let view = s.projection();
                    prop_assert_eq!(view.len(), s.depth());
                    prop_assert_eq!(view.iter().filter(|d| d.is_top()).count(), usize::from(!view.is_empty()));
                    for pair in view.windows(2) {
                        prop_assert!(pair[0].layer_index() < pair[1].layer_index());
                    }
                    let mut ids = s.stack().ids();
                    ids.sort();
                    let before = ids.len();
                    ids.dedup();
                    prop_assert_eq!(ids.len(), before);
                    for d in &view {
                        if let Some(target) = d.instance().confirmation_target() {
                            let pending = view
                                .iter()
                                .filter(|o| o.instance().confirmation_target() == Some(target))
                                .count();
                            prop_assert_eq!(pending, 1);
                        }
                    }
                }

                let fired = fired.borrow();
                let mut unique = fired.clone();
                unique.sort();
                unique.dedup();
                prop_assert_eq!(unique.len(), fired.len());
                for id in fired.iter() {
                    prop_assert!(!s.contains(*id));
                    prop_assert!(opened.contains(id));
                }
            }
        }
    }
}
