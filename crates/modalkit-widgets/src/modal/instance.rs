#![forbid(unsafe_code)]

//! A single open modal and the request that creates it.
//!
//! # Invariants
//!
//! - `id` never changes after construction.
//! - The close callback is an `FnOnce` held in an `Option`; taking it leaves
//!   `None`, so it can fire at most once.
//! - Presentation hints (title, styles, size) are passed through untouched.

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use modalkit_core::geometry::origin_or_center;
use modalkit_core::{Measure, MeasurementUnavailable, ModalId, Point, Rect};

use super::confirm::ConfirmationPrompt;
use super::size::ModalSize;

/// Side effect run when a modal is actually removed from the stack.
pub type CloseCallback = Box<dyn FnOnce()>;

/// Severity of a closing-policy notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NoticeKind {
    #[default]
    Warn,
    Notify,
}

impl NoticeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Notify => "notify",
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Require confirmation before the modal may close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosingPolicy {
    pub notice: NoticeKind,
    pub message: String,
}

impl ClosingPolicy {
    pub fn new(notice: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            notice,
            message: message.into(),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Warn, message)
    }

    pub fn notify(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Notify, message)
    }
}

bitflags! {
    /// Which implicit close triggers a modal ignores.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModalFlags: u8 {
        const DISABLE_BACKDROP_CLOSE = 0b01;
        const DISABLE_ESCAPE_CLOSE   = 0b10;
    }
}

/// Header and body style defaults substituted for missing hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalTheme {
    pub header_style: String,
    pub body_style: String,
}

impl Default for ModalTheme {
    fn default() -> Self {
        Self {
            header_style: "bg-blue-500 text-white".to_string(),
            body_style: "bg-gray-800 text-white".to_string(),
        }
    }
}

/// Element a modal was opened from. Measured lazily by the renderer.
#[derive(Clone)]
pub struct AnchorHint(Rc<dyn Measure>);

impl AnchorHint {
    pub fn new(anchor: impl Measure + 'static) -> Self {
        Self(Rc::new(anchor))
    }

    pub fn measure(&self) -> Result<Rect, MeasurementUnavailable> {
        self.0.measure()
    }

    /// Centre of the anchor, or of `screen` when the anchor cannot be measured.
    pub fn origin(&self, screen: Rect) -> Point {
        origin_or_center(Some(&*self.0), screen)
    }
}

impl fmt::Debug for AnchorHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnchorHint").field(&self.measure().ok()).finish()
    }
}

/// What a modal shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalContent<C> {
    /// Application payload, opaque to the stack.
    Custom(C),
    /// Built-in confirm/cancel control guarding another modal.
    Confirmation(ConfirmationPrompt),
}

impl<C> ModalContent<C> {
    pub fn as_custom(&self) -> Option<&C> {
        match self {
            Self::Custom(c) => Some(c),
            Self::Confirmation(_) => None,
        }
    }

    pub fn as_confirmation(&self) -> Option<&ConfirmationPrompt> {
        match self {
            Self::Custom(_) => None,
            Self::Confirmation(p) => Some(p),
        }
    }
}

/// One open modal.
pub struct ModalInstance<C> {
    id: ModalId,
    content: ModalContent<C>,
    title: String,
    header_style: String,
    body_style: String,
    size: ModalSize,
    anchor: Option<AnchorHint>,
    on_close: Option<CloseCallback>,
    closing_policy: Option<ClosingPolicy>,
    flags: ModalFlags,
}

impl<C> ModalInstance<C> {
    pub(crate) fn confirmation(
        id: ModalId,
        prompt: ConfirmationPrompt,
        title: String,
        header_style: String,
        body_style: String,
    ) -> Self {
        Self {
            id,
            content: ModalContent::Confirmation(prompt),
            title,
            header_style,
            body_style,
            size: ModalSize::Small,
            anchor: None,
            on_close: None,
            closing_policy: None,
            flags: ModalFlags::empty(),
        }
    }

    #[inline]
    pub fn id(&self) -> ModalId {
        self.id
    }

    pub fn content(&self) -> &ModalContent<C> {
        &self.content
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn header_style(&self) -> &str {
        &self.header_style
    }

    pub fn body_style(&self) -> &str {
        &self.body_style
    }

    pub fn size(&self) -> ModalSize {
        self.size
    }

    pub fn anchor(&self) -> Option<&AnchorHint> {
        self.anchor.as_ref()
    }

    pub fn closing_policy(&self) -> Option<&ClosingPolicy> {
        self.closing_policy.as_ref()
    }

    pub(crate) fn set_closing_policy(&mut self, policy: Option<ClosingPolicy>) {
        self.closing_policy = policy;
    }

    pub fn flags(&self) -> ModalFlags {
        self.flags
    }

    /// Whether Escape may close this modal.
    pub fn closes_on_escape(&self) -> bool {
        !self.flags.contains(ModalFlags::DISABLE_ESCAPE_CLOSE)
    }

    /// Whether a backdrop click may close this modal.
    pub fn closes_on_backdrop(&self) -> bool {
        !self.flags.contains(ModalFlags::DISABLE_BACKDROP_CLOSE)
    }

    pub fn is_confirmation(&self) -> bool {
        matches!(self.content, ModalContent::Confirmation(_))
    }

    /// The modal this confirmation guards, if this is a confirmation.
    pub fn confirmation_target(&self) -> Option<ModalId> {
        self.content.as_confirmation().map(ConfirmationPrompt::target)
    }

    pub fn has_on_close(&self) -> bool {
        self.on_close.is_some()
    }

    /// Take the close callback, leaving none behind.
    pub fn take_on_close(&mut self) -> Option<CloseCallback> {
        self.on_close.take()
    }
}

impl<C: fmt::Debug> fmt::Debug for ModalInstance<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalInstance")
            .field("id", &self.id)
            .field("content", &self.content)
            .field("title", &self.title)
            .field("size", &self.size)
            .field("closing_policy", &self.closing_policy)
            .field("flags", &self.flags)
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

/// Everything needed to open a modal. Only `content` is required.
pub struct ModalSpec<C> {
    content: C,
    title: Option<String>,
    size: Option<ModalSize>,
    header_style: Option<String>,
    body_style: Option<String>,
    anchor: Option<AnchorHint>,
    on_close: Option<CloseCallback>,
    closing_policy: Option<ClosingPolicy>,
    flags: ModalFlags,
}

impl<C> ModalSpec<C> {
    pub fn new(content: C) -> Self {
        Self {
            content,
            title: None,
            size: None,
            header_style: None,
            body_style: None,
            anchor: None,
            on_close: None,
            closing_policy: None,
            flags: ModalFlags::empty(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn size(mut self, size: ModalSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn header_style(mut self, style: impl Into<String>) -> Self {
        self.header_style = Some(style.into());
        self
    }

    pub fn body_style(mut self, style: impl Into<String>) -> Self {
        self.body_style = Some(style.into());
        self
    }

    pub fn anchor(mut self, anchor: impl Measure + 'static) -> Self {
        self.anchor = Some(AnchorHint::new(anchor));
        self
    }

    pub fn on_close(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_close = Some(Box::new(callback));
        self
    }

    pub fn closing_policy(mut self, policy: ClosingPolicy) -> Self {
        self.closing_policy = Some(policy);
        self
    }

    pub fn disable_backdrop_close(mut self, disable: bool) -> Self {
        self.flags.set(ModalFlags::DISABLE_BACKDROP_CLOSE, disable);
        self
    }

    pub fn disable_escape_close(mut self, disable: bool) -> Self {
        self.flags.set(ModalFlags::DISABLE_ESCAPE_CLOSE, disable);
        self
    }

    /// Build the instance. Missing or empty hints take the defaults.
    pub fn into_instance(
        self,
        id: ModalId,
        theme: &ModalTheme,
        default_size: ModalSize,
    ) -> ModalInstance<C> {
        ModalInstance {
            id,
            content: ModalContent::Custom(self.content),
            title: self.title.unwrap_or_default(),
            header_style: non_empty_or(self.header_style, &theme.header_style),
            body_style: non_empty_or(self.body_style, &theme.body_style),
            size: self.size.unwrap_or(default_size),
            anchor: self.anchor,
            on_close: self.on_close,
            closing_policy: self.closing_policy,
            flags: self.flags,
        }
    }
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}
