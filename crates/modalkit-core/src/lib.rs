#![forbid(unsafe_code)]

//! Core primitives for modalkit: modal identifiers, input events, and geometry.

pub mod event;
pub mod geometry;
pub mod id;

pub use event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
};
pub use geometry::{Measure, MeasurementUnavailable, Point, Rect, Size};
pub use id::{IdGenerator, IdSource, IdStrategy, ModalId, SharedIds};
