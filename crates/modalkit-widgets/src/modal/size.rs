#![forbid(unsafe_code)]

//! Modal size presets and the cell constraints they map to.

use std::fmt;

use modalkit_core::Size;

/// Size preset for a modal dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModalSize {
    Small,
    #[default]
    Medium,
    Full,
    Responsive,
    /// Medium width with a fixed height.
    MediumFixedHeight,
}

impl ModalSize {
    pub const ALL: [Self; 5] = [
        Self::Small,
        Self::Medium,
        Self::Full,
        Self::Responsive,
        Self::MediumFixedHeight,
    ];

    /// Short token (`sm`, `md`, `full`, `responsive`, `md-f-h`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "sm",
            Self::Medium => "md",
            Self::Full => "full",
            Self::Responsive => "responsive",
            Self::MediumFixedHeight => "md-f-h",
        }
    }

    /// Parse a short token or long name. Case-insensitive.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sm" | "small" => Some(Self::Small),
            "md" | "medium" => Some(Self::Medium),
            "full" => Some(Self::Full),
            "responsive" => Some(Self::Responsive),
            "md-f-h" | "medium-fixed-height" => Some(Self::MediumFixedHeight),
            _ => None,
        }
    }

    /// Cell constraints for this preset.
    pub fn constraints(self) -> ModalSizeConstraints {
        match self {
            Self::Small => ModalSizeConstraints::new()
                .min_width(20)
                .max_width(40)
                .min_height(5)
                .max_height(10),
            Self::Medium => ModalSizeConstraints::new()
                .min_width(30)
                .max_width(60)
                .min_height(10)
                .max_height(20),
            Self::Full => ModalSizeConstraints::new(),
            Self::Responsive => ModalSizeConstraints::new().min_width(30).max_width(100),
            Self::MediumFixedHeight => ModalSizeConstraints::new()
                .min_width(30)
                .max_width(60)
                .min_height(20)
                .max_height(20),
        }
    }
}

impl fmt::Display for ModalSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Min/max width and height in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModalSizeConstraints {
    pub min_width: Option<u16>,
    pub max_width: Option<u16>,
    pub min_height: Option<u16>,
    pub max_height: Option<u16>,
}

impl ModalSizeConstraints {
    /// Unconstrained.
    pub const fn new() -> Self {
        Self {
            min_width: None,
            max_width: None,
            min_height: None,
            max_height: None,
        }
    }

    pub fn min_width(mut self, value: u16) -> Self {
        self.min_width = Some(value);
        self
    }

    pub fn max_width(mut self, value: u16) -> Self {
        self.max_width = Some(value);
        self
    }

    pub fn min_height(mut self, value: u16) -> Self {
        self.min_height = Some(value);
        self
    }

    pub fn max_height(mut self, value: u16) -> Self {
        self.max_height = Some(value);
        self
    }

    /// Fit `available` to these constraints without ever exceeding it.
    pub fn clamp(self, available: Size) -> Size {
        let width = fit(available.width, self.min_width, self.max_width);
        let height = fit(available.height, self.min_height, self.max_height);
        Size::new(width, height)
    }
}

fn fit(available: u16, min: Option<u16>, max: Option<u16>) -> u16 {
    let mut v = max.map_or(available, |m| available.min(m));
    if let Some(min) = min {
        v = v.max(min).min(available);
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip() {
        for size in ModalSize::ALL {
            assert_eq!(ModalSize::parse(size.as_str()), Some(size));
        }
    }

    #[test]
    fn long_names_parse() {
        assert_eq!(ModalSize::parse("Small"), Some(ModalSize::Small));
        assert_eq!(
            ModalSize::parse("medium-fixed-height"),
            Some(ModalSize::MediumFixedHeight)
        );
        assert_eq!(ModalSize::parse("xl"), None);
    }

    #[test]
    fn default_is_medium() {
        assert_eq!(ModalSize::default(), ModalSize::Medium);
    }

    #[test]
    fn clamp_never_exceeds_available() {
        let tiny = Size::new(10, 4);
        for size in ModalSize::ALL {
            let got = size.constraints().clamp(tiny);
            assert!(got.width <= 10 && got.height <= 4, "{size}: {got:?}");
        }
    }

    #[test]
    fn full_takes_everything() {
        let screen = Size::new(120, 40);
        assert_eq!(ModalSize::Full.constraints().clamp(screen), screen);
    }

    #[test]
    fn fixed_height_is_fixed() {
        let got = ModalSize::MediumFixedHeight.constraints().clamp(Size::new(200, 80));
        assert_eq!(got, Size::new(60, 20));
    }
}
