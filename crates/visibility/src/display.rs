use crate::context::{RenderingContext, self_and_ancestor_elements};
use crate::style::Display;

/// `display: none` anywhere on the inclusive ancestor chain removes the box.
pub(crate) fn is_displayed<C: RenderingContext>(ctx: &C, element: C::Node) -> bool {
    self_and_ancestor_elements(ctx, element)
        .all(|node| ctx.computed_style(node).display != Display::None)
}
