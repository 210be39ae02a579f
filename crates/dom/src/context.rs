use indextree::{Arena, Children};
use visibility::{
    ComputedStyle, NodeKind as ContextKind, Rect, RenderingContext, ScrollOffset, Size,
};

use crate::{DOM, DOMNode, NodeKey, NodeKind};

/// Children of a node, as keys, in tree order.
pub struct ChildKeys<'ctx> {
    arena: &'ctx Arena<DOMNode>,
    inner: Option<Children<'ctx, DOMNode>>,
}

impl Iterator for ChildKeys<'_> {
    type Item = NodeKey;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.inner.as_mut()?.next()?;
        self.arena.get(id).map(|node| node.get().key)
    }
}

impl RenderingContext for DOM {
    type Node = NodeKey;
    type Children<'ctx> = ChildKeys<'ctx>;

    fn kind(&self, node: NodeKey) -> ContextKind<'_> {
        match self.node(node).map(|data| &data.kind) {
            Some(NodeKind::Element { tag }) => ContextKind::Element { tag: tag.as_str() },
            Some(NodeKind::Text { .. }) => ContextKind::Text,
            Some(NodeKind::Document) => ContextKind::Document,
            Some(NodeKind::Comment { .. }) | None => ContextKind::Other,
        }
    }

    fn attribute(&self, node: NodeKey, name: &str) -> Option<&str> {
        self.node(node)?.attr(name)
    }

    fn parent(&self, node: NodeKey) -> Option<NodeKey> {
        self.parent_of(node)
    }

    fn children(&self, node: NodeKey) -> ChildKeys<'_> {
        ChildKeys {
            arena: &self.dom,
            inner: self.keys.get(&node).map(|id| id.children(&self.dom)),
        }
    }

    fn owner_document(&self, _node: NodeKey) -> NodeKey {
        NodeKey::ROOT
    }

    fn document_element(&self, _document: NodeKey) -> Option<NodeKey> {
        self.root_element()
    }

    fn body_element(&self, _document: NodeKey) -> Option<NodeKey> {
        self.body()
    }

    fn has_rendering_window(&self, _document: NodeKey) -> bool {
        self.window.is_some()
    }

    fn computed_style(&self, element: NodeKey) -> ComputedStyle {
        self.computed_style_of(element)
    }

    fn bounding_rect(&self, element: NodeKey) -> Rect {
        self.node(element)
            .map(|node| node.layout.rect)
            .unwrap_or_default()
    }

    fn scroll_offset(&self, element: NodeKey) -> ScrollOffset {
        let viewport = element == NodeKey::ROOT || self.root_element() == Some(element);
        match self.window {
            Some(window) if viewport => window.scroll,
            _ => self
                .node(element)
                .map(|node| node.layout.scroll)
                .unwrap_or_default(),
        }
    }

    fn scroll_size(&self, element: NodeKey) -> Size {
        self.node(element).map_or_else(Size::default, |node| {
            let layout = node.layout;
            layout
                .scroll_size
                .unwrap_or_else(|| Size::new(layout.rect.width, layout.rect.height))
        })
    }

    fn is_simulated(&self) -> bool {
        self.simulated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DOMUpdate;

    #[test]
    fn children_iterate_keys_in_order() {
        let mut dom = DOM::html_page(100.0, 100.0).unwrap();
        let body = dom.body().unwrap();
        let first = dom.create_element(body, "div").unwrap();
        let second = dom.create_text(body, "hi").unwrap();
        let third = dom.create_comment(body, "note").unwrap();

        let children: Vec<_> = RenderingContext::children(&dom, body).collect();
        assert_eq!(children, vec![first, second, third]);
        assert_eq!(dom.kind(second), ContextKind::Text);
        assert_eq!(dom.kind(third), ContextKind::Other);
        assert_eq!(RenderingContext::children(&dom, NodeKey(999)).count(), 0);
    }

    #[test]
    fn root_element_scrolls_with_the_window() {
        let mut dom = DOM::html_page(100.0, 100.0).unwrap();
        let html = dom.root_element().unwrap();
        let body = dom.body().unwrap();
        dom.set_scroll(body, ScrollOffset::new(3.0, 4.0)).unwrap();
        dom.apply_update(DOMUpdate::AttachWindow {
            scroll: ScrollOffset::new(0.0, 50.0),
        })
        .unwrap();

        assert_eq!(dom.scroll_offset(html), ScrollOffset::new(0.0, 50.0));
        assert_eq!(dom.scroll_offset(body), ScrollOffset::new(3.0, 4.0));
    }

    #[test]
    fn scroll_size_defaults_to_the_box() {
        let mut dom = DOM::html_page(100.0, 80.0).unwrap();
        let body = dom.body().unwrap();
        assert_eq!(dom.scroll_size(body), Size::new(100.0, 80.0));
        dom.set_scroll_size(body, Size::new(100.0, 400.0)).unwrap();
        assert_eq!(dom.scroll_size(body), Size::new(100.0, 400.0));
    }
}
