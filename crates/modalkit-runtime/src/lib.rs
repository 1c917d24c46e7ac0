#![forbid(unsafe_code)]

//! Runtime for the modalkit modal stack.
//!
//! - [`ModalSession`]: owns the stack and dispatches open/close/confirm.
//! - [`ModalContext`] / [`ModalProvider`]: shareable session handle and the
//!   scope that makes it reachable through [`use_modal_context`].
//! - [`ModalRenderer`] / [`ModalRequester`]: the presentation seam.
//! - [`ModalConfig`]: layering, theme defaults, id strategy, confirmation text.

pub mod config;
pub mod context;
pub mod error;
pub mod renderer;
pub mod session;

pub use config::ModalConfig;
pub use context::{ModalContext, ModalProvider, use_modal_context};
pub use error::ModalError;
pub use renderer::{
    CloseRequest, CloseTrigger, ModalRenderer, ModalRequest, ModalRequester, NullRenderer,
};
pub use session::ModalSession;
