#![forbid(unsafe_code)]

//! Modal stack widgets for modalkit.
//!
//! The [`modal`] module holds everything with state-machine or ordering
//! logic: instances, the stack store, the confirmation sub-flow, and the
//! projection handed to renderers.

pub mod modal;

pub use modal::{
    AnchorHint, Backdrop, ClosingPolicy, ConfirmChoice, ConfirmRequest, ConfirmationPrompt,
    ConfirmationStyle, HitRegion, LayerPolicy, ModalContent, ModalDescriptor, ModalFlags,
    ModalHit, ModalInstance, ModalSize, ModalSizeConstraints, ModalSpec, ModalStack,
    ModalTheme, NoticeKind, Resolution, StackError, project,
};
