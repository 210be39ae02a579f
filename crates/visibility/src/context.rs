//! The rendering-context capability the evaluator reads from.
//!
//! Anything that can answer computed-style, geometry, scroll and tree queries
//! about a document can be evaluated: a live engine, a devtools bridge, or the
//! snapshot DOM used in tests.

use core::fmt::Debug;
use core::iter::successors;

use crate::style::ComputedStyle;

/// Classification of a node, pattern matched by every check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind<'ctx> {
    Element { tag: &'ctx str },
    Text,
    Document,
    /// Comments, doctypes and processing instructions.
    Other,
}

impl NodeKind<'_> {
    pub const fn is_element(self) -> bool {
        matches!(self, Self::Element { .. })
    }

    /// Whether this is an element with the given tag, compared ASCII case-insensitively.
    pub fn is_tag(self, name: &str) -> bool {
        matches!(self, Self::Element { tag } if tag.eq_ignore_ascii_case(name))
    }
}

/// Axis-aligned border box in viewport coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// True when either dimension is zero (or negative).
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollOffset {
    pub x: f32,
    pub y: f32,
}

impl ScrollOffset {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Read-only queries over one consistent document snapshot.
///
/// Style and geometry are only ever requested for element nodes.
pub trait RenderingContext {
    /// Cheap node handle.
    type Node: Copy + Eq + Debug;
    /// Iterator over a node's children in tree order.
    type Children<'ctx>: Iterator<Item = Self::Node>
    where
        Self: 'ctx;

    fn kind(&self, node: Self::Node) -> NodeKind<'_>;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    fn children(&self, node: Self::Node) -> Self::Children<'_>;

    /// The document node owning `node`. A document owns itself.
    fn owner_document(&self, node: Self::Node) -> Self::Node;

    /// The root element (`<html>`) of a document.
    fn document_element(&self, document: Self::Node) -> Option<Self::Node>;

    /// The `<body>` of a document; absent for non-HTML documents.
    fn body_element(&self, document: Self::Node) -> Option<Self::Node>;

    /// Whether the document is shown in a live window.
    fn has_rendering_window(&self, document: Self::Node) -> bool;

    fn computed_style(&self, element: Self::Node) -> ComputedStyle;

    fn bounding_rect(&self, element: Self::Node) -> Rect;

    /// Scroll position. For the root element this is the window scroll.
    fn scroll_offset(&self, element: Self::Node) -> ScrollOffset;

    /// Total scrollable extent (`scrollWidth` x `scrollHeight`).
    fn scroll_size(&self, element: Self::Node) -> Size;

    /// Set by environments that never lay anything out and report zero
    /// geometry for every element.
    fn is_simulated(&self) -> bool {
        false
    }
}

/// Parent, but only when it is an element (the DOM's `parentElement`).
pub(crate) fn parent_element<C: RenderingContext>(ctx: &C, node: C::Node) -> Option<C::Node> {
    ctx.parent(node)
        .filter(|parent| ctx.kind(*parent).is_element())
}

/// `element` followed by each ancestor element up to the root.
pub(crate) fn self_and_ancestor_elements<C: RenderingContext>(
    ctx: &C,
    element: C::Node,
) -> impl Iterator<Item = C::Node> + '_ {
    successors(Some(element), move |current| parent_element(ctx, *current))
}

/// The closest inclusive ancestor element with the given tag (`Element.closest`).
pub(crate) fn closest_tag<C: RenderingContext>(
    ctx: &C,
    element: C::Node,
    tag: &str,
) -> Option<C::Node> {
    self_and_ancestor_elements(ctx, element).find(|node| ctx.kind(*node).is_tag(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert!((rect.right() - 40.0).abs() < f32::EPSILON);
        assert!((rect.bottom() - 60.0).abs() < f32::EPSILON);
        assert!(!rect.is_empty());
        assert!(Rect::new(0.0, 0.0, 10.0, 0.0).is_empty());
        assert!(Rect::default().is_empty());
    }

    #[test]
    fn tag_matching_ignores_case() {
        let kind = NodeKind::Element { tag: "SELECT" };
        assert!(kind.is_tag("select"));
        assert!(!kind.is_tag("option"));
        assert!(!NodeKind::Text.is_tag("select"));
    }
}
