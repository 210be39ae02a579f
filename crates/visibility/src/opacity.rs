use crate::context::{RenderingContext, self_and_ancestor_elements};

/// Opacity the user actually sees: the element's own opacity multiplied by
/// that of every ancestor element. Accumulated in `f64` so long chains of
/// faint ancestors stay positive.
pub(crate) fn effective_opacity<C: RenderingContext>(ctx: &C, element: C::Node) -> f64 {
    self_and_ancestor_elements(ctx, element)
        .map(|node| f64::from(ctx.computed_style(node).opacity_or_default()))
        .product()
}

/// Only a zero factor on the chain makes the element fully transparent. The
/// product itself can still underflow for very deep chains.
pub(crate) fn is_transparent<C: RenderingContext>(ctx: &C, element: C::Node) -> bool {
    self_and_ancestor_elements(ctx, element)
        .any(|node| ctx.computed_style(node).opacity_or_default() <= 0.0)
}

#[cfg(test)]
mod tests {
    use core::option;

    use super::*;
    use crate::context::{NodeKind, Rect, ScrollOffset, Size};
    use crate::style::ComputedStyle;

    /// A straight chain of elements, index 0 at the top, each with its own opacity.
    struct Chain {
        opacities: Vec<Option<f32>>,
    }

    impl RenderingContext for Chain {
        type Node = usize;
        type Children<'ctx> = option::IntoIter<usize>;

        fn kind(&self, _node: usize) -> NodeKind<'_> {
            NodeKind::Element { tag: "div" }
        }

        fn parent(&self, node: usize) -> Option<usize> {
            node.checked_sub(1)
        }

        fn children(&self, node: usize) -> Self::Children<'_> {
            let next = node + 1;
            (next < self.opacities.len()).then_some(next).into_iter()
        }

        fn owner_document(&self, _node: usize) -> usize {
            0
        }

        fn document_element(&self, _document: usize) -> Option<usize> {
            None
        }

        fn body_element(&self, _document: usize) -> Option<usize> {
            None
        }

        fn has_rendering_window(&self, _document: usize) -> bool {
            true
        }

        fn attribute(&self, _node: usize, _name: &str) -> Option<&str> {
            None
        }

        fn computed_style(&self, element: usize) -> ComputedStyle {
            ComputedStyle {
                opacity: self.opacities.get(element).copied().flatten(),
                ..ComputedStyle::default()
            }
        }

        fn bounding_rect(&self, _element: usize) -> Rect {
            Rect::new(0.0, 0.0, 10.0, 10.0)
        }

        fn scroll_offset(&self, _element: usize) -> ScrollOffset {
            ScrollOffset::default()
        }

        fn scroll_size(&self, _element: usize) -> Size {
            Size::new(10.0, 10.0)
        }
    }

    #[test]
    fn faint_chain_stays_positive() {
        let chain = Chain {
            opacities: vec![Some(0.001); 16],
        };
        let deepest = 15;
        assert!(effective_opacity(&chain, deepest) > 0.0);
        assert!(!is_transparent(&chain, deepest));
    }

    #[test]
    fn chain_too_deep_for_the_product_is_still_not_transparent() {
        let chain = Chain {
            opacities: vec![Some(0.001); 120],
        };
        assert!(!is_transparent(&chain, 119));
    }

    #[test]
    fn any_zero_factor_is_transparent() {
        let chain = Chain {
            opacities: vec![Some(1.0), Some(0.0), None, Some(1.0)],
        };
        assert!(is_transparent(&chain, 3));
        assert!(!is_transparent(&chain, 0));
    }

    #[test]
    fn unusable_values_read_as_opaque() {
        let chain = Chain {
            opacities: vec![Some(0.0), Some(f32::NAN), Some(0.5)],
        };
        assert!(is_transparent(&chain, 2));
        assert!(effective_opacity(&chain, 2).abs() < f64::EPSILON);

        let faint = Chain {
            opacities: vec![Some(f32::NAN), Some(0.5)],
        };
        assert!((effective_opacity(&faint, 1) - 0.5).abs() < f64::EPSILON);
    }
}
