//! Overflow-state classification.
//!
//! An element is tested against each ancestor that could clip it, innermost
//! first. Content outside a clipping ancestor is `Hidden`; content outside a
//! scrolling ancestor but reachable by scrolling is `Scroll`, unless the
//! scroller itself is hidden, in which case the hidden state propagates.

use log::trace;

use crate::context::{Rect, RenderingContext, parent_element};
use crate::style::{Overflow, Position};

/// How an element relates to the ancestors that may clip it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OverflowState {
    /// Not outside any clipping ancestor.
    #[default]
    None,
    /// Outside a scroll container, but reachable by scrolling.
    Scroll,
    /// Clipped away for good.
    Hidden,
}

/// Effective per-axis overflow of a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct AxisOverflow {
    x: Overflow,
    y: Overflow,
}

impl AxisOverflow {
    const VISIBLE: Self = Self {
        x: Overflow::Visible,
        y: Overflow::Visible,
    };

    fn is_visible(self) -> bool {
        self == Self::VISIBLE
    }

    /// The viewport can't grow, so the root's `visible` really means `auto`.
    fn visible_as_auto(self) -> Self {
        let promote = |axis: Overflow| {
            if axis == Overflow::Visible {
                Overflow::Auto
            } else {
                axis
            }
        };
        Self {
            x: promote(self.x),
            y: promote(self.y),
        }
    }
}

pub(crate) fn overflow_state<C: RenderingContext>(ctx: &C, element: C::Node) -> OverflowState {
    OverflowWalk::new(ctx, element).classify()
}

/// State for one classification walk. `viewport_relative` latches once a
/// fixed-position box is met.
struct OverflowWalk<'ctx, C: RenderingContext> {
    ctx: &'ctx C,
    element: C::Node,
    region: Rect,
    root: Option<C::Node>,
    body: Option<C::Node>,
    root_overflow_visible: bool,
    viewport_relative: bool,
}

impl<'ctx, C: RenderingContext> OverflowWalk<'ctx, C> {
    fn new(ctx: &'ctx C, element: C::Node) -> Self {
        let document = ctx.owner_document(element);
        let root = ctx.document_element(document);
        let root_overflow_visible = root
            .is_some_and(|html| ctx.computed_style(html).overflow() == Some(Overflow::Visible));
        Self {
            ctx,
            element,
            region: ctx.bounding_rect(element),
            root,
            body: ctx.body_element(document),
            root_overflow_visible,
            viewport_relative: false,
        }
    }

    fn classify(mut self) -> OverflowState {
        let mut container = self.overflow_parent(self.element);
        while let Some(current) = container {
            if let Some(state) = self.check_container(current) {
                trace!(target: "visibility", "{:?} is {state:?} within {current:?}", self.element);
                return state;
            }
            container = self.overflow_parent(current);
        }
        OverflowState::None
    }

    /// The closest ancestor `node` could overflow.
    fn overflow_parent(&mut self, node: C::Node) -> Option<C::Node> {
        let position = self.ctx.computed_style(node).position;
        if position == Position::Fixed {
            // A fixed box can only overflow the viewport.
            self.viewport_relative = true;
            return if Some(node) == self.root { None } else { self.root };
        }
        let mut parent = parent_element(self.ctx, node);
        while let Some(candidate) = parent {
            if self.can_be_overflowed(candidate, position) {
                return Some(candidate);
            }
            parent = parent_element(self.ctx, candidate);
        }
        None
    }

    fn can_be_overflowed(&self, container: C::Node, position: Position) -> bool {
        if Some(container) == self.root {
            return true;
        }
        let style = self.ctx.computed_style(container);
        if style.display.is_inline_level() {
            return false;
        }
        !(position == Position::Absolute && style.position == Position::Static)
    }

    fn overflow_styles(&self, container: C::Node) -> AxisOverflow {
        let is_root = Some(container) == self.root;
        let mut source = container;
        // A root with `overflow: visible` takes the body's overflow, and the
        // body is then really `visible`.
        if self.root_overflow_visible {
            if is_root {
                if let Some(body) = self.body {
                    source = body;
                }
            } else if Some(container) == self.body {
                return AxisOverflow::VISIBLE;
            }
        }
        let style = self.ctx.computed_style(source);
        let overflow = AxisOverflow {
            x: style.overflow_x,
            y: style.overflow_y,
        };
        if is_root {
            overflow.visible_as_auto()
        } else {
            overflow
        }
    }

    /// `Some` when `container` decides the state, `None` to keep walking.
    fn check_container(&self, container: C::Node) -> Option<OverflowState> {
        let overflow = self.overflow_styles(container);
        if overflow.is_visible() {
            return None;
        }

        let bounds = self.ctx.bounding_rect(container);
        if bounds.is_empty() {
            return Some(OverflowState::Hidden);
        }

        let region = self.region;

        // Left of or above the container.
        let underflows_x = region.right() < bounds.left;
        let underflows_y = region.bottom() < bounds.top;
        if (underflows_x && overflow.x.clips()) || (underflows_y && overflow.y.clips()) {
            return Some(OverflowState::Hidden);
        }
        if (underflows_x && overflow.x.scrolls()) || (underflows_y && overflow.y.scrolls()) {
            // Scrolled out of view, or entirely outside the scrollable range?
            let scroll = self.ctx.scroll_offset(container);
            let unscrollable_x = region.right() < bounds.left - scroll.x;
            let unscrollable_y = region.bottom() < bounds.top - scroll.y;
            if (unscrollable_x && overflow.x != Overflow::Visible)
                || (unscrollable_y && overflow.y != Overflow::Visible)
            {
                return Some(OverflowState::Hidden);
            }
            return Some(self.inherit(container));
        }

        // Right of or below the container.
        let overflows_x = region.left >= bounds.right();
        let overflows_y = region.top >= bounds.bottom();
        if (overflows_x && overflow.x.clips()) || (overflows_y && overflow.y.clips()) {
            return Some(OverflowState::Hidden);
        }
        if (overflows_x && overflow.x.scrolls()) || (overflows_y && overflow.y.scrolls()) {
            if self.viewport_relative && self.beyond_document(container) {
                return Some(OverflowState::Hidden);
            }
            return Some(self.inherit(container));
        }

        None
    }

    /// Whether the element starts past the document's scrollable extent.
    fn beyond_document(&self, container: C::Node) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        let extent = self.ctx.scroll_size(root);
        let scroll = self.ctx.scroll_offset(container);
        self.region.left >= extent.width - scroll.x || self.region.top >= extent.height - scroll.y
    }

    /// Reachable by scrolling `container`, unless `container` is itself hidden.
    fn inherit(&self, container: C::Node) -> OverflowState {
        match overflow_state(self.ctx, container) {
            OverflowState::Hidden => OverflowState::Hidden,
            OverflowState::None | OverflowState::Scroll => OverflowState::Scroll,
        }
    }
}
