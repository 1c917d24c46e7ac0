#![forbid(unsafe_code)]

//! Confirm-before-close sub-flow.
//!
//! A close request on a modal with a [`ClosingPolicy`] does not remove it.
//! Instead a small confirmation modal is pushed above it. The confirmation
//! refers to its target by id only, looked up when the user answers:
//!
//! - cancel: the confirmation goes away, the target stays untouched;
//! - confirm: the confirmation goes away and the target is force-removed,
//!   bypassing its policy.
//!
//! # Invariants
//!
//! - At most one confirmation per target exists above that target.
//! - A confirmation whose target has vanished resolves to removing itself only.

use modalkit_core::ModalId;

use super::instance::{ClosingPolicy, ModalInstance, NoticeKind};
use super::stack::ModalStack;

/// Text and styling for generated confirmation modals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationStyle {
    pub title: String,
    pub confirm_label: String,
    pub cancel_label: String,
    /// Header style for `NoticeKind::Warn`.
    pub warn_style: String,
    /// Header style for `NoticeKind::Notify`.
    pub notify_style: String,
    pub body_style: String,
}

impl Default for ConfirmationStyle {
    fn default() -> Self {
        Self {
            title: "Confirm".to_string(),
            confirm_label: "Confirm".to_string(),
            cancel_label: "Cancel".to_string(),
            warn_style: "bg-red-600 text-white".to_string(),
            notify_style: "bg-blue-600 text-white".to_string(),
            body_style: "bg-gray-800 text-white".to_string(),
        }
    }
}

impl ConfirmationStyle {
    pub fn header_for(&self, notice: NoticeKind) -> &str {
        match notice {
            NoticeKind::Warn => &self.warn_style,
            NoticeKind::Notify => &self.notify_style,
        }
    }
}

/// Content of a confirmation modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationPrompt {
    target: ModalId,
    notice: NoticeKind,
    message: String,
    confirm_label: String,
    cancel_label: String,
}

impl ConfirmationPrompt {
    /// The modal this prompt guards.
    pub fn target(&self) -> ModalId {
        self.target
    }

    pub fn notice(&self) -> NoticeKind {
        self.notice
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn confirm_label(&self) -> &str {
        &self.confirm_label
    }

    pub fn cancel_label(&self) -> &str {
        &self.cancel_label
    }
}

/// The user's answer to a confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmChoice {
    Confirm,
    Cancel,
}

/// Outcome of asking for confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmRequest {
    /// A new confirmation was pushed.
    Pushed(ModalId),
    /// A confirmation for this target is already open.
    AlreadyPending(ModalId),
    /// The target has no closing policy.
    NotRequired,
    /// The target is not on the stack.
    TargetMissing,
}

/// Modals removed by resolving a confirmation.
#[derive(Debug)]
pub struct Resolution<C> {
    pub confirmation: Option<ModalInstance<C>>,
    pub target: Option<ModalInstance<C>>,
}

impl<C> Default for Resolution<C> {
    fn default() -> Self {
        Self {
            confirmation: None,
            target: None,
        }
    }
}

impl<C> Resolution<C> {
    pub fn is_noop(&self) -> bool {
        self.confirmation.is_none() && self.target.is_none()
    }

    pub fn removed_count(&self) -> usize {
        usize::from(self.confirmation.is_some()) + usize::from(self.target.is_some())
    }

    /// Removed modals in removal order: confirmation first, then target.
    pub fn into_removed(self) -> Vec<ModalInstance<C>> {
        self.confirmation.into_iter().chain(self.target).collect()
    }
}

fn build_confirmation<C>(
    id: ModalId,
    target: ModalId,
    policy: &ClosingPolicy,
    style: &ConfirmationStyle,
) -> ModalInstance<C> {
    let prompt = ConfirmationPrompt {
        target,
        notice: policy.notice,
        message: policy.message.clone(),
        confirm_label: style.confirm_label.clone(),
        cancel_label: style.cancel_label.clone(),
    };
    ModalInstance::confirmation(
        id,
        prompt,
        style.title.clone(),
        style.header_for(policy.notice).to_string(),
        style.body_style.clone(),
    )
}

/// Push a confirmation for `target` unless one is already pending.
///
/// `next_id` is only called when a confirmation is actually created.
pub fn request_confirmation<C>(
    stack: &mut ModalStack<C>,
    target: ModalId,
    next_id: impl FnOnce() -> ModalId,
    style: &ConfirmationStyle,
) -> ConfirmRequest {
    let Some(modal) = stack.get(target) else {
        return ConfirmRequest::TargetMissing;
    };
    let Some(policy) = modal.closing_policy() else {
        return ConfirmRequest::NotRequired;
    };
    if let Some(pending) = stack.pending_confirmation_for(target) {
        return ConfirmRequest::AlreadyPending(pending);
    }

    let confirmation = build_confirmation(next_id(), target, policy, style);
    let id = confirmation.id();
    #[cfg(feature = "tracing")]
    tracing::debug!(%id, %target, notice = %policy.notice, "confirmation requested");
    stack.push(confirmation);
    ConfirmRequest::Pushed(id)
}

/// Re-issue the pending confirmation for `target` with its current policy.
///
/// When the pending confirmation is the top modal it is swapped for a fresh
/// one (new id) via `replace_tail`. A pending confirmation buried under other
/// modals is left alone. Without a pending confirmation this behaves like
/// [`request_confirmation`].
pub fn reissue_confirmation<C>(
    stack: &mut ModalStack<C>,
    target: ModalId,
    next_id: impl FnOnce() -> ModalId,
    style: &ConfirmationStyle,
) -> ConfirmRequest {
    let Some(pending) = stack.pending_confirmation_for(target) else {
        return request_confirmation(stack, target, next_id, style);
    };
    if stack.top_id() != Some(pending) {
        return ConfirmRequest::AlreadyPending(pending);
    }
    let Some(policy) = stack.get(target).and_then(ModalInstance::closing_policy) else {
        return ConfirmRequest::NotRequired;
    };

    let confirmation = build_confirmation(next_id(), target, policy, style);
    let id = confirmation.id();
    stack.replace_tail(confirmation);
    ConfirmRequest::Pushed(id)
}

/// Apply the user's answer to confirmation `confirmation_id`.
///
/// Unknown ids and non-confirmation modals resolve to a no-op.
pub fn resolve_confirmation<C>(
    stack: &mut ModalStack<C>,
    confirmation_id: ModalId,
    choice: ConfirmChoice,
) -> Resolution<C> {
    let Some(target) = stack
        .get(confirmation_id)
        .and_then(ModalInstance::confirmation_target)
    else {
        return Resolution::default();
    };

    let confirmation = stack.remove_by_id(confirmation_id).ok();
    let target = match choice {
        ConfirmChoice::Cancel => None,
        ConfirmChoice::Confirm => stack.remove_by_id(target).ok(),
    };
    #[cfg(feature = "tracing")]
    tracing::debug!(
        id = %confirmation_id,
        ?choice,
        target_removed = target.is_some(),
        "confirmation resolved"
    );
    Resolution {
        confirmation,
        target,
    }
}
