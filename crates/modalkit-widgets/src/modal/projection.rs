#![forbid(unsafe_code)]

//! Renderer-facing view of the modal stack.
//!
//! [`project`] pairs every modal with its top flag and layer index. It is a
//! pure function of the stack and is meant to be called after every
//! mutation; nothing is cached.
//!
//! # Invariants
//!
//! - `project(stack).len() == stack.depth()`.
//! - Exactly one descriptor has `is_top()` when the stack is non-empty.
//! - `layer_index` is strictly increasing with position (until it saturates
//!   at `u32::MAX`).

use modalkit_core::{ModalId, Point, Rect, Size};

use super::instance::{ModalContent, ModalInstance};
use super::size::ModalSize;
use super::stack::ModalStack;

/// Base layer index for the modal layer.
pub const BASE_LAYER: u32 = 1000;

/// Layer increment between modals (leaves room for internal layers).
pub const LAYER_STEP: u32 = 10;

/// How layer indices are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerPolicy {
    base: u32,
    step: u32,
}

impl Default for LayerPolicy {
    fn default() -> Self {
        Self::new(BASE_LAYER, LAYER_STEP)
    }
}

impl LayerPolicy {
    /// A zero step is raised to 1 so layers stay strictly increasing.
    pub const fn new(base: u32, step: u32) -> Self {
        Self {
            base,
            step: if step == 0 { 1 } else { step },
        }
    }

    pub const fn base(self) -> u32 {
        self.base
    }

    pub const fn step(self) -> u32 {
        self.step
    }

    /// Layer index for the modal at `position` (0 = bottom).
    pub fn layer_for(self, position: usize) -> u32 {
        let position = u32::try_from(position).unwrap_or(u32::MAX);
        self.base.saturating_add(position.saturating_mul(self.step))
    }
}

/// Backdrop treatment for a modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backdrop {
    /// Full-strength backdrop of the interactive modal.
    Active,
    /// Dimmed backdrop of a modal covered by another.
    Inactive,
}

/// One modal as the renderer sees it.
pub struct ModalDescriptor<'a, C> {
    instance: &'a ModalInstance<C>,
    position: usize,
    is_top: bool,
    layer_index: u32,
}

impl<C> Clone for ModalDescriptor<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for ModalDescriptor<'_, C> {}

impl<C: std::fmt::Debug> std::fmt::Debug for ModalDescriptor<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalDescriptor")
            .field("id", &self.id())
            .field("position", &self.position)
            .field("is_top", &self.is_top)
            .field("layer_index", &self.layer_index)
            .field("content", self.content())
            .finish()
    }
}

impl<'a, C> ModalDescriptor<'a, C> {
    pub fn instance(&self) -> &'a ModalInstance<C> {
        self.instance
    }

    pub fn id(&self) -> ModalId {
        self.instance.id()
    }

    pub fn content(&self) -> &'a ModalContent<C> {
        self.instance.content()
    }

    pub fn title(&self) -> &'a str {
        self.instance.title()
    }

    pub fn size(&self) -> ModalSize {
        self.instance.size()
    }

    pub fn header_style(&self) -> &'a str {
        self.instance.header_style()
    }

    pub fn body_style(&self) -> &'a str {
        self.instance.body_style()
    }

    /// Index from the bottom of the stack.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_top(&self) -> bool {
        self.is_top
    }

    pub fn layer_index(&self) -> u32 {
        self.layer_index
    }

    pub fn disable_backdrop_close(&self) -> bool {
        !self.instance.closes_on_backdrop()
    }

    pub fn disable_escape_close(&self) -> bool {
        !self.instance.closes_on_escape()
    }

    pub fn is_confirmation(&self) -> bool {
        self.instance.is_confirmation()
    }

    pub fn backdrop(&self) -> Backdrop {
        if self.is_top {
            Backdrop::Active
        } else {
            Backdrop::Inactive
        }
    }

    /// Point the entry animation should grow from.
    pub fn transform_origin(&self, screen: Rect) -> Point {
        match self.instance.anchor() {
            Some(anchor) => anchor.origin(screen),
            None => screen.center(),
        }
    }

    /// Dialog bounds within `screen`, centred and clamped to the size preset.
    pub fn content_area(&self, screen: Rect) -> Rect {
        let available = Size::new(screen.width, screen.height);
        let size = self.size().constraints().clamp(available);
        let x = screen.x + screen.width.saturating_sub(size.width) / 2;
        let y = screen.y + screen.height.saturating_sub(size.height) / 2;
        Rect::new(x, y, size.width, size.height)
    }
}

/// Project the stack into renderer descriptors, bottom to top.
pub fn project<C>(stack: &ModalStack<C>, layers: LayerPolicy) -> Vec<ModalDescriptor<'_, C>> {
    let count = stack.depth();
    stack
        .iter()
        .enumerate()
        .map(|(position, instance)| ModalDescriptor {
            instance,
            position,
            is_top: position + 1 == count,
            layer_index: layers.layer_for(position),
        })
        .collect()
}
