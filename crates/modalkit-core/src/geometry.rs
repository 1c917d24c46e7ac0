#![forbid(unsafe_code)]

//! Screen geometry and anchor measurement.
//!
//! An anchor is whatever element triggered a modal (a button, a list row).
//! It is measured lazily through [`Measure`]; when the element is gone the
//! measurement reports [`MeasurementUnavailable`] and callers fall back to the
//! screen centre.

use std::fmt;

/// A point in screen cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in screen cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle in screen cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Centre point, rounded towards the origin.
    pub const fn center(&self) -> Point {
        Point::new(
            self.x.saturating_add(self.width / 2),
            self.y.saturating_add(self.height / 2),
        )
    }

    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }
}

/// The anchor could not be measured (detached, hidden, or zero-sized).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementUnavailable;

impl fmt::Display for MeasurementUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("anchor measurement unavailable")
    }
}

impl std::error::Error for MeasurementUnavailable {}

/// Something whose on-screen bounds can be queried.
pub trait Measure {
    fn measure(&self) -> Result<Rect, MeasurementUnavailable>;
}

impl Measure for Rect {
    fn measure(&self) -> Result<Rect, MeasurementUnavailable> {
        if self.is_empty() {
            Err(MeasurementUnavailable)
        } else {
            Ok(*self)
        }
    }
}

impl<F> Measure for F
where
    F: Fn() -> Option<Rect>,
{
    fn measure(&self) -> Result<Rect, MeasurementUnavailable> {
        self().ok_or(MeasurementUnavailable)
    }
}

/// Centre of `anchor` if it measures to a non-empty rectangle, else centre of `screen`.
pub fn origin_or_center(anchor: Option<&dyn Measure>, screen: Rect) -> Point {
    match anchor.map(Measure::measure) {
        Some(Ok(rect)) if !rect.is_empty() => rect.center(),
        Some(_) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %MeasurementUnavailable, "falling back to screen centre");
            screen.center()
        }
        None => screen.center(),
    }
}
