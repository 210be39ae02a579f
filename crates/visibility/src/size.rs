use crate::context::{NodeKind, RenderingContext};
use crate::overflow::{OverflowState, overflow_state};
use crate::style::Overflow;

/// Whether the element occupies area on screen.
///
/// A zero-sized box still counts when it has text or a positively sized child
/// element spilling out of it, unless it hides its overflow.
pub(crate) fn has_positive_size<C: RenderingContext>(ctx: &C, element: C::Node) -> bool {
    if !ctx.bounding_rect(element).is_empty() {
        return true;
    }
    if ctx.computed_style(element).overflow() == Some(Overflow::Hidden) {
        return false;
    }
    ctx.children(element).any(|child| match ctx.kind(child) {
        NodeKind::Text => true,
        NodeKind::Element { .. } => has_positive_size(ctx, child),
        NodeKind::Document | NodeKind::Other => false,
    })
}

/// The element is clipped away, and so is everything inside it that has any size.
pub(crate) fn hidden_by_overflow<C: RenderingContext>(ctx: &C, element: C::Node) -> bool {
    overflow_state(ctx, element) == OverflowState::Hidden
        && ctx.children(element).all(|child| {
            !ctx.kind(child).is_element()
                || hidden_by_overflow(ctx, child)
                || !has_positive_size(ctx, child)
        })
}
