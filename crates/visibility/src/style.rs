//! Computed style values read by the visibility checks.
//!
//! Only the handful of properties that influence perceptibility are modelled.
//! Values are already resolved by the rendering context; parsing here is
//! keyword recognition only.

use core::str::FromStr;

use thiserror::Error;

/// A keyword that is not valid for the named property.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid value `{value}` for `{property}`")]
pub struct StyleParseError {
    /// Property whose value failed to parse.
    pub property: &'static str,
    /// The rejected value, as given.
    pub value: String,
}

impl StyleParseError {
    fn new(property: &'static str, value: &str) -> Self {
        Self {
            property,
            value: value.to_owned(),
        }
    }
}

/// Normalise a keyword for matching: trimmed and ASCII-lowercased.
fn keyword(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Display {
    #[default]
    Inline,
    Block,
    InlineBlock,
    InlineFlex,
    InlineGrid,
    InlineTable,
    Flex,
    Grid,
    Table,
    /// Table rows, cells, groups and captions.
    TableInternal,
    ListItem,
    FlowRoot,
    Contents,
    None,
}

impl Display {
    /// Whether the box is inline-level. Inline-level boxes never act as
    /// overflow containers for their descendants.
    pub const fn is_inline_level(self) -> bool {
        matches!(
            self,
            Self::Inline | Self::InlineBlock | Self::InlineFlex | Self::InlineGrid | Self::InlineTable
        )
    }
}

impl FromStr for Display {
    type Err = StyleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = keyword(value);
        let display = match normalized.as_str() {
            "inline" => Self::Inline,
            "block" => Self::Block,
            "inline-block" => Self::InlineBlock,
            "inline-flex" => Self::InlineFlex,
            "inline-grid" => Self::InlineGrid,
            "inline-table" => Self::InlineTable,
            "flex" => Self::Flex,
            "grid" => Self::Grid,
            "table" => Self::Table,
            "table-row" | "table-cell" | "table-row-group" | "table-header-group"
            | "table-footer-group" | "table-column" | "table-column-group" | "table-caption" => {
                Self::TableInternal
            }
            "list-item" => Self::ListItem,
            "flow-root" => Self::FlowRoot,
            "contents" => Self::Contents,
            "none" => Self::None,
            // Two-value syntax ("inline flow-root", "inline flex", ...) is still inline-level.
            other if other.starts_with("inline") => Self::Inline,
            _ => return Err(StyleParseError::new("display", value)),
        };
        Ok(display)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

impl Visibility {
    /// `hidden` and `collapse` both suppress the box.
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden | Self::Collapse)
    }
}

impl FromStr for Visibility {
    type Err = StyleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match keyword(value).as_str() {
            "visible" => Ok(Self::Visible),
            "hidden" => Ok(Self::Hidden),
            "collapse" => Ok(Self::Collapse),
            _ => Err(StyleParseError::new("visibility", value)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Clip,
    Auto,
    Scroll,
}

impl Overflow {
    /// Content past the edge is cut off and cannot be scrolled to.
    pub const fn clips(self) -> bool {
        matches!(self, Self::Hidden | Self::Clip)
    }

    /// Content past the edge can be reached by scrolling.
    pub const fn scrolls(self) -> bool {
        matches!(self, Self::Auto | Self::Scroll)
    }
}

impl FromStr for Overflow {
    type Err = StyleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match keyword(value).as_str() {
            "visible" => Ok(Self::Visible),
            "hidden" => Ok(Self::Hidden),
            "clip" => Ok(Self::Clip),
            // `overlay` is a legacy alias of `auto`.
            "auto" | "overlay" => Ok(Self::Auto),
            "scroll" => Ok(Self::Scroll),
            _ => Err(StyleParseError::new("overflow", value)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl FromStr for Position {
    type Err = StyleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match keyword(value).as_str() {
            "static" => Ok(Self::Static),
            "relative" => Ok(Self::Relative),
            "absolute" => Ok(Self::Absolute),
            "fixed" => Ok(Self::Fixed),
            "sticky" => Ok(Self::Sticky),
            _ => Err(StyleParseError::new("position", value)),
        }
    }
}

/// Parse a computed `opacity` value. Percentages are accepted; the result is
/// clamped to `[0, 1]` as the computed value would be.
///
/// # Errors
/// Returns [`StyleParseError`] when the value is not a finite number.
pub fn parse_opacity(value: &str) -> Result<f32, StyleParseError> {
    let trimmed = value.trim();
    let parsed = trimmed.strip_suffix('%').map_or_else(
        || trimmed.parse::<f32>().ok(),
        |percent| percent.trim().parse::<f32>().ok().map(|number| number / 100.0),
    );
    match parsed {
        Some(number) if number.is_finite() => Ok(number.clamp(0.0, 1.0)),
        _ => Err(StyleParseError::new("opacity", value)),
    }
}

/// Per-element snapshot of the properties the visibility checks read.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ComputedStyle {
    pub display: Display,
    pub visibility: Visibility,
    /// Opacity in `[0, 1]`. `None` reads as fully opaque.
    pub opacity: Option<f32>,
    pub overflow_x: Overflow,
    pub overflow_y: Overflow,
    pub position: Position,
}

impl ComputedStyle {
    /// The `overflow` shorthand as it serializes: a single keyword only when
    /// both axes agree.
    pub fn overflow(&self) -> Option<Overflow> {
        (self.overflow_x == self.overflow_y).then_some(self.overflow_x)
    }

    /// Own opacity, defaulting to fully opaque. Non-finite values also read
    /// as opaque; the rest are clamped to `[0, 1]`.
    pub fn opacity_or_default(&self) -> f32 {
        self.opacity
            .filter(|value| value.is_finite())
            .map_or(1.0, |value| value.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_keywords_are_case_insensitive() {
        assert_eq!("NONE".parse::<Display>(), Ok(Display::None));
        assert_eq!(" inline-block ".parse::<Display>(), Ok(Display::InlineBlock));
        assert_eq!("table-cell".parse::<Display>(), Ok(Display::TableInternal));
    }

    #[test]
    fn every_inline_prefixed_display_is_inline_level() {
        for value in ["inline", "inline-block", "inline-flex", "inline-grid", "inline-table", "inline flow-root"] {
            let display: Display = value.parse().unwrap();
            assert!(display.is_inline_level(), "{value} should be inline-level");
        }
        assert!(!Display::Block.is_inline_level());
        assert!(!Display::Flex.is_inline_level());
    }

    #[test]
    fn unknown_keywords_are_rejected() {
        let err = "sideways".parse::<Overflow>().unwrap_err();
        assert_eq!(err.property, "overflow");
        assert_eq!(err.value, "sideways");
        assert!("bogus".parse::<Position>().is_err());
        assert!("".parse::<Visibility>().is_err());
    }

    #[test]
    fn opacity_parses_numbers_and_percentages() {
        assert!((parse_opacity("0.25").unwrap() - 0.25).abs() < f32::EPSILON);
        assert!((parse_opacity("50%").unwrap() - 0.5).abs() < f32::EPSILON);
        assert!((parse_opacity("3").unwrap() - 1.0).abs() < f32::EPSILON);
        assert!(parse_opacity("-1").unwrap().abs() < f32::EPSILON);
        assert!(parse_opacity("half").is_err());
        assert!(parse_opacity("NaN").is_err());
    }

    #[test]
    fn overflow_shorthand_only_reads_when_axes_agree() {
        let mut style = ComputedStyle {
            overflow_x: Overflow::Hidden,
            overflow_y: Overflow::Hidden,
            ..ComputedStyle::default()
        };
        assert_eq!(style.overflow(), Some(Overflow::Hidden));
        style.overflow_y = Overflow::Auto;
        assert_eq!(style.overflow(), None);
    }

    #[test]
    fn unusable_opacity_falls_back_to_opaque() {
        let with = |opacity| ComputedStyle {
            opacity,
            ..ComputedStyle::default()
        };
        assert!((with(None).opacity_or_default() - 1.0).abs() < f32::EPSILON);
        assert!((with(Some(f32::NAN)).opacity_or_default() - 1.0).abs() < f32::EPSILON);
        assert!((with(Some(f32::INFINITY)).opacity_or_default() - 1.0).abs() < f32::EPSILON);
        assert!(with(Some(-2.0)).opacity_or_default().abs() < f32::EPSILON);
        assert!((with(Some(4.0)).opacity_or_default() - 1.0).abs() < f32::EPSILON);
        assert!((with(Some(0.3)).opacity_or_default() - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn clip_behaves_like_hidden() {
        assert!(Overflow::Clip.clips());
        assert!(Overflow::Hidden.clips());
        assert!(!Overflow::Scroll.clips());
        assert!(Overflow::Scroll.scrolls());
        assert!(!Overflow::Visible.scrolls());
    }
}
