#![forbid(unsafe_code)]

//! Modal stack store: the ordered collection of open modals.
//!
//! The `ModalStack` keeps modals bottom-to-top. The last entry is the top
//! modal, the only one that is interactive.
//!
//! # Invariants
//!
//! - Order is insertion order; only removal or `replace_tail` changes it.
//! - Ids are unique within the stack.
//! - The three mutations (`push`, `remove_by_id`, `replace_tail`) each leave
//!   the stack fully formed; there are no partial updates to observe.
//!
//! # Failure Modes
//!
//! - `remove_by_id()` for a non-existent id returns `StackError::NotFound`.
//! - `pop()` / `replace_tail()` on an empty stack return `None` (no panic).

use std::fmt;

use modalkit_core::ModalId;

use super::instance::{ClosingPolicy, ModalInstance};

/// Errors from stack mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    /// No modal with this id is on the stack.
    NotFound(ModalId),
}

impl fmt::Display for StackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "modal {id} is not on the stack"),
        }
    }
}

impl std::error::Error for StackError {}

/// Ordered collection of open modals, bottom to top.
pub struct ModalStack<C> {
    modals: Vec<ModalInstance<C>>,
}

impl<C> Default for ModalStack<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: fmt::Debug> fmt::Debug for ModalStack<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.modals).finish()
    }
}

impl<C> ModalStack<C> {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self { modals: Vec::new() }
    }

    // --- Mutations ---

    /// Append a modal; it becomes the new top.
    pub fn push(&mut self, modal: ModalInstance<C>) {
        debug_assert!(!self.contains(modal.id()), "duplicate modal id");
        #[cfg(feature = "tracing")]
        tracing::debug!(id = %modal.id(), depth = self.modals.len() + 1, "modal pushed");
        self.modals.push(modal);
    }

    /// Remove a modal wherever it sits and hand it back.
    pub fn remove_by_id(&mut self, id: ModalId) -> Result<ModalInstance<C>, StackError> {
        let idx = self.position(id).ok_or(StackError::NotFound(id))?;
        let modal = self.modals.remove(idx);
        #[cfg(feature = "tracing")]
        tracing::debug!(%id, position = idx, depth = self.modals.len(), "modal removed");
        Ok(modal)
    }

    /// Replace the top modal with `modal`, returning the one it displaced.
    ///
    /// On an empty stack this is a plain push.
    pub fn replace_tail(&mut self, modal: ModalInstance<C>) -> Option<ModalInstance<C>> {
        let old = self.modals.pop();
        debug_assert!(!self.contains(modal.id()), "duplicate modal id");
        #[cfg(feature = "tracing")]
        tracing::debug!(
            id = %modal.id(),
            replaced = ?old.as_ref().map(ModalInstance::id),
            "modal tail replaced"
        );
        self.modals.push(modal);
        old
    }

    /// Pop the top modal.
    pub fn pop(&mut self) -> Option<ModalInstance<C>> {
        self.modals.pop()
    }

    /// Remove every modal, top first.
    pub fn drain_lifo(&mut self) -> Vec<ModalInstance<C>> {
        let mut out = Vec::with_capacity(self.modals.len());
        while let Some(m) = self.modals.pop() {
            out.push(m);
        }
        out
    }

    /// Replace the closing policy of a modal in place.
    pub fn set_closing_policy(
        &mut self,
        id: ModalId,
        policy: Option<ClosingPolicy>,
    ) -> Result<(), StackError> {
        let modal = self
            .modals
            .iter_mut()
            .find(|m| m.id() == id)
            .ok_or(StackError::NotFound(id))?;
        modal.set_closing_policy(policy);
        Ok(())
    }

    // --- Queries ---

    /// The top modal.
    pub fn top(&self) -> Option<&ModalInstance<C>> {
        self.modals.last()
    }

    /// Id of the top modal.
    pub fn top_id(&self) -> Option<ModalId> {
        self.modals.last().map(ModalInstance::id)
    }

    pub fn get(&self, id: ModalId) -> Option<&ModalInstance<C>> {
        self.modals.iter().find(|m| m.id() == id)
    }

    pub fn contains(&self, id: ModalId) -> bool {
        self.modals.iter().any(|m| m.id() == id)
    }

    /// Index from the bottom (0 = lowest).
    pub fn position(&self, id: ModalId) -> Option<usize> {
        self.modals.iter().position(|m| m.id() == id)
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.modals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.modals.is_empty()
    }

    /// Iterate bottom to top.
    pub fn iter(&self) -> std::slice::Iter<'_, ModalInstance<C>> {
        self.modals.iter()
    }

    /// Ids bottom to top.
    pub fn ids(&self) -> Vec<ModalId> {
        self.modals.iter().map(ModalInstance::id).collect()
    }

    /// A confirmation guarding `target` that sits above it, if any.
    pub fn pending_confirmation_for(&self, target: ModalId) -> Option<ModalId> {
        let start = self.position(target)?;
        self.modals[start + 1..]
            .iter()
            .find(|m| m.confirmation_target() == Some(target))
            .map(ModalInstance::id)
    }
}

impl<'a, C> IntoIterator for &'a ModalStack<C> {
    type Item = &'a ModalInstance<C>;
    type IntoIter = std::slice::Iter<'a, ModalInstance<C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modal::{ModalSize, ModalSpec, ModalTheme};

    fn modal(raw: u128) -> ModalInstance<&'static str> {
        ModalSpec::new("body").title(format!("m{raw}")).into_instance(
            ModalId::from_raw(raw),
            &ModalTheme::default(),
            ModalSize::Medium,
        )
    }

    fn id(raw: u128) -> ModalId {
        ModalId::from_raw(raw)
    }

    #[test]
    fn empty_stack() {
        let stack: ModalStack<&str> = ModalStack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.depth(), 0);
        assert!(stack.top().is_none());
        assert!(stack.top_id().is_none());
    }

    #[test]
    fn push_makes_new_top() {
        let mut stack = ModalStack::new();
        stack.push(modal(1));
        assert_eq!(stack.top_id(), Some(id(1)));
        stack.push(modal(2));
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.top_id(), Some(id(2)));
        assert_eq!(stack.ids(), vec![id(1), id(2)]);
    }

    #[test]
    fn remove_from_middle_keeps_order() {
        let mut stack = ModalStack::new();
        stack.push(modal(1));
        stack.push(modal(2));
        stack.push(modal(3));

        let removed = stack.remove_by_id(id(2)).map(|m| m.id());
        assert_eq!(removed, Ok(id(2)));
        assert_eq!(stack.ids(), vec![id(1), id(3)]);
        assert_eq!(stack.top_id(), Some(id(3)));
    }

    #[test]
    fn remove_missing_is_not_found() {
        let mut stack = ModalStack::new();
        stack.push(modal(1));
        let err = stack.remove_by_id(id(99)).map(|m| m.id());
        assert_eq!(err, Err(StackError::NotFound(id(99))));
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn replace_tail_swaps_top_only() {
        let mut stack = ModalStack::new();
        stack.push(modal(1));
        stack.push(modal(2));
        let old = stack.replace_tail(modal(3));
        assert_eq!(old.map(|m| m.id()), Some(id(2)));
        assert_eq!(stack.ids(), vec![id(1), id(3)]);
    }

    #[test]
    fn replace_tail_on_empty_pushes() {
        let mut stack = ModalStack::new();
        assert!(stack.replace_tail(modal(5)).is_none());
        assert_eq!(stack.ids(), vec![id(5)]);
    }

    #[test]
    fn drain_is_lifo() {
        let mut stack = ModalStack::new();
        stack.push(modal(1));
        stack.push(modal(2));
        stack.push(modal(3));
        let drained: Vec<ModalId> = stack.drain_lifo().iter().map(|m| m.id()).collect();
        assert_eq!(drained, vec![id(3), id(2), id(1)]);
        assert!(stack.is_empty());
    }

    #[test]
    fn set_closing_policy_in_place() {
        let mut stack = ModalStack::new();
        stack.push(modal(1));
        stack
            .set_closing_policy(id(1), Some(ClosingPolicy::warn("Unsaved")))
            .expect("present");
        assert_eq!(
            stack.get(id(1)).and_then(|m| m.closing_policy()).map(|p| p.message.as_str()),
            Some("Unsaved")
        );
        assert_eq!(
            stack.set_closing_policy(id(2), None),
            Err(StackError::NotFound(id(2)))
        );
    }

    #[test]
    fn not_found_display() {
        let msg = StackError::NotFound(id(1)).to_string();
        assert!(msg.contains("00000000-0000-0000-0000-000000000001"));
    }

    #[test]
    fn contains_after_remove() {
        let mut stack = ModalStack::new();
        stack.push(modal(1));
        assert!(stack.contains(id(1)));
        let _ = stack.remove_by_id(id(1));
        assert!(!stack.contains(id(1)));
        assert_eq!(stack.position(id(1)), None);
    }
}
