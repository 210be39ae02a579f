//! Reading declared values back as computed values.
//!
//! The snapshot stores what each element declares. Reading a computed style
//! applies the few rules a computed value always obeys: UA `display` defaults,
//! `visibility` inheritance, `overflow` shorthand expansion and the coupling
//! between a `visible` and a non-`visible` axis.

use core::str::FromStr;

use log::warn;
use visibility::style::parse_opacity;
use visibility::{ComputedStyle, Display, Overflow, Position, StyleParseError, Visibility};

use crate::{DOM, DOMNode, NodeKey};

fn default_display_for_tag(tag: &str) -> Display {
    let lowered = tag.to_ascii_lowercase();
    // Keep this list small; elements not listed are inline.
    match lowered.as_str() {
        "head" | "script" | "style" | "template" | "title" | "meta" | "link" | "base" => {
            Display::None
        }
        "html" | "body" | "div" | "p" | "header" | "main" | "footer" | "section" | "article"
        | "nav" | "aside" | "ul" | "ol" | "form" | "fieldset" | "h1" | "h2" | "h3" | "h4"
        | "h5" | "h6" | "pre" | "blockquote" | "figure" | "hr" | "noscript" | "details"
        | "dialog" | "address" => Display::Block,
        "li" => Display::ListItem,
        "table" => Display::Table,
        "tr" | "td" | "th" | "thead" | "tbody" | "tfoot" | "caption" | "col" | "colgroup" => {
            Display::TableInternal
        }
        "select" | "button" | "input" | "textarea" | "img" | "video" | "canvas" | "iframe" => {
            Display::InlineBlock
        }
        _ => Display::Inline,
    }
}

/// Parse a declared keyword, logging and falling back when it is invalid.
fn keyword_or<T: FromStr<Err = StyleParseError>>(
    node: &DOMNode,
    property: &str,
    fallback: T,
) -> Option<T> {
    let value = node.declared(property)?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(target: "dom", "{:?}: {err}; using the initial value", node.key);
            Some(fallback)
        }
    }
}

/// Per-axis overflow from `overflow-x`/`overflow-y`, falling back to the
/// one- or two-value `overflow` shorthand.
fn overflow_axes(node: &DOMNode) -> (Overflow, Overflow) {
    let mut axes = (Overflow::Visible, Overflow::Visible);
    if let Some(shorthand) = node.declared("overflow") {
        let mut values = shorthand.split_whitespace().map(|value| {
            value.parse::<Overflow>().unwrap_or_else(|err| {
                warn!(target: "dom", "{:?}: {err}; using the initial value", node.key);
                Overflow::Visible
            })
        });
        if let Some(first) = values.next() {
            axes = (first, values.next().unwrap_or(first));
        }
    }
    if let Some(axis_x) = keyword_or(node, "overflow-x", Overflow::Visible) {
        axes.0 = axis_x;
    }
    if let Some(axis_y) = keyword_or(node, "overflow-y", Overflow::Visible) {
        axes.1 = axis_y;
    }
    // `visible` paired with a scrolling or clipping axis computes to `auto`.
    match axes {
        (Overflow::Visible, other) if other != Overflow::Visible && other != Overflow::Clip => {
            (Overflow::Auto, other)
        }
        (other, Overflow::Visible) if other != Overflow::Visible && other != Overflow::Clip => {
            (other, Overflow::Auto)
        }
        resolved => resolved,
    }
}

impl DOM {
    /// Computed style of an element. Non-elements read as the initial values.
    pub fn computed_style_of(&self, key: NodeKey) -> ComputedStyle {
        let Some(node) = self.node(key) else {
            return ComputedStyle::default();
        };
        let Some(tag) = node.tag() else {
            return ComputedStyle::default();
        };

        let default_display = if node.attr("hidden").is_some() {
            Display::None
        } else {
            default_display_for_tag(tag)
        };
        let display = keyword_or(node, "display", default_display).unwrap_or(default_display);

        let visibility = keyword_or(node, "visibility", Visibility::Visible)
            .unwrap_or_else(|| self.inherited_visibility(key));

        let opacity = node.declared("opacity").and_then(|value| {
            parse_opacity(value)
                .map_err(|err| warn!(target: "dom", "{key:?}: {err}; treating as opaque"))
                .ok()
        });

        let (overflow_x, overflow_y) = overflow_axes(node);
        let position = keyword_or(node, "position", Position::Static).unwrap_or_default();

        ComputedStyle {
            display,
            visibility,
            opacity,
            overflow_x,
            overflow_y,
            position,
        }
    }

    fn inherited_visibility(&self, key: NodeKey) -> Visibility {
        self.parent_of(key)
            .filter(|parent| self.node(*parent).is_some_and(|node| node.tag().is_some()))
            .map_or(Visibility::Visible, |parent| self.computed_style_of(parent).visibility)
    }
}
