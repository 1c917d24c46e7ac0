#![forbid(unsafe_code)]

//! Modal instances, the stack that owns them, confirmation, and projection.
//!
//! # Layout
//!
//! - [`ModalInstance`] / [`ModalSpec`]: one open dialog and the request that
//!   creates it.
//! - [`ModalStack`]: the ordered store (push, remove-by-id, replace-tail).
//! - [`request_confirmation`] / [`resolve_confirmation`]: the confirm-before-close
//!   sub-flow, expressed as ordinary stack entries.
//! - [`project`]: the renderer-facing view with top flag and layer index.
//!
//! # Example
//!
//! ```ignore
//! use modalkit_widgets::modal::{ModalStack, ModalSpec, ModalTheme, ModalSize, project, LayerPolicy};
//!
//! let mut stack = ModalStack::new();
//! let theme = ModalTheme::default();
//! stack.push(ModalSpec::new("hello").title("Greeting").into_instance(id, &theme, ModalSize::Medium));
//!
//! for d in project(&stack, LayerPolicy::default()) {
//!     println!("{} top={} z={}", d.title(), d.is_top(), d.layer_index());
//! }
//! ```

mod confirm;
mod hit;
mod instance;
mod projection;
mod size;
mod stack;

pub use confirm::{
    ConfirmChoice, ConfirmRequest, ConfirmationPrompt, ConfirmationStyle, Resolution,
    reissue_confirmation, request_confirmation, resolve_confirmation,
};
pub use hit::{HitRegion, ModalHit};
pub use instance::{
    AnchorHint, CloseCallback, ClosingPolicy, ModalContent, ModalFlags, ModalInstance, ModalSpec,
    ModalTheme, NoticeKind,
};
pub use projection::{BASE_LAYER, Backdrop, LAYER_STEP, LayerPolicy, ModalDescriptor, project};
pub use size::{ModalSize, ModalSizeConstraints};
pub use stack::{ModalStack, StackError};
