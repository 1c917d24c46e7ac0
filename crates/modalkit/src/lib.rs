#![forbid(unsafe_code)]

//! modalkit: a stack of modal dialogs with a built-in confirmation flow.
//!
//! ```
//! use modalkit::prelude::*;
//!
//! let mut session: ModalSession<&str> = ModalSession::default();
//! let editor = session.open_modal(
//!     ModalSpec::new("editor")
//!         .title("Editor")
//!         .closing_policy(ClosingPolicy::warn("Unsaved changes")),
//! );
//!
//! // Closing a guarded modal asks first.
//! session.close_modal(None);
//! assert_eq!(session.depth(), 2);
//!
//! let confirmation = session.top_id().unwrap();
//! session.confirm(confirmation);
//! assert!(!session.contains(editor));
//! ```

pub use modalkit_core as primitives;
#[cfg(feature = "runtime")]
pub use modalkit_runtime as runtime;
pub use modalkit_widgets as widgets;

pub use modalkit_core::{Event, IdStrategy, KeyCode, ModalId, Point, Rect};
pub use modalkit_widgets::modal::{
    ClosingPolicy, HitRegion, LayerPolicy, ModalDescriptor, ModalHit, ModalSize, ModalSpec,
    NoticeKind,
};

#[cfg(feature = "runtime")]
pub use modalkit_runtime::{
    CloseTrigger, ModalConfig, ModalContext, ModalError, ModalProvider, ModalRenderer,
    ModalRequester, ModalSession, use_modal_context,
};

/// Everything needed to open, close and render modals.
pub mod prelude {
    pub use crate::{
        ClosingPolicy, Event, HitRegion, KeyCode, ModalDescriptor, ModalHit, ModalId, ModalSize,
        ModalSpec, NoticeKind,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{
        CloseTrigger, ModalConfig, ModalContext, ModalError, ModalRenderer, ModalRequester,
        ModalSession, use_modal_context,
    };
}
