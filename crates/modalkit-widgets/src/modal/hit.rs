#![forbid(unsafe_code)]

//! Hit-test results reported by renderers alongside pointer events.

use modalkit_core::ModalId;

/// Which part of a modal a pointer event landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitRegion {
    /// The dimmed area outside the dialog bounds.
    Backdrop,
    /// Anywhere inside the dialog.
    Content,
    /// The confirm button of a confirmation dialog.
    Confirm,
    /// The cancel button of a confirmation dialog.
    Cancel,
}

/// A pointer hit on a specific modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModalHit {
    pub id: ModalId,
    pub region: HitRegion,
}

impl ModalHit {
    pub const fn new(id: ModalId, region: HitRegion) -> Self {
        Self { id, region }
    }

    pub const fn backdrop(id: ModalId) -> Self {
        Self::new(id, HitRegion::Backdrop)
    }
}
