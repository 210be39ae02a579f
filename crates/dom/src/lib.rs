//! Snapshot DOM for visibility checks.
//!
//! Stores a document tree together with already-resolved layout (border boxes,
//! scroll offsets, scroll extents) and declared computed values, and answers
//! the [`visibility::RenderingContext`] queries over it. No layout or cascade
//! happens here.

use std::collections::HashMap;

use anyhow::{Result, anyhow};
use indextree::{Arena, Node, NodeId};
use smallvec::SmallVec;
use visibility::{Rect, ScrollOffset, Size};

mod context;
mod fixture;
mod printing;
mod style;
mod updating;

pub use context::ChildKeys;
pub use fixture::{DocumentFixture, ElementFixture, NodeFixture, RectFixture, WindowFixture};
pub use updating::DOMUpdate;

/// Stable key for a DOM node, independent of arena slot reuse.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct NodeKey(pub u64);

impl NodeKey {
    /// The document node (always present).
    pub const ROOT: Self = Self(0);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeKind {
    #[default]
    Document,
    Element {
        tag: String,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

/// Layout results recorded for an element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutSnapshot {
    pub rect: Rect,
    pub scroll: ScrollOffset,
    /// `None` falls back to the rect size.
    pub scroll_size: Option<Size>,
}

#[derive(Debug, Clone, Default)]
pub struct DOMNode {
    pub key: NodeKey,
    pub kind: NodeKind,
    pub attrs: SmallVec<(String, String), 4>,
    /// Declared computed values, property names lowercased.
    pub style: SmallVec<(String, String), 4>,
    pub layout: LayoutSnapshot,
}

impl DOMNode {
    fn new(key: NodeKey, kind: NodeKind) -> Self {
        Self {
            key,
            kind,
            ..Self::default()
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag } => Some(tag.as_str()),
            NodeKind::Document | NodeKind::Text { .. } | NodeKind::Comment { .. } => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn declared(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(key, _)| key == property)
            .map(|(_, value)| value.as_str())
    }
}

/// The window a document is shown in.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Window {
    pub scroll: ScrollOffset,
}

pub struct DOM {
    dom: Arena<DOMNode>,
    root: NodeId,
    keys: HashMap<NodeKey, NodeId>,
    next_key: u64,
    window: Option<Window>,
    simulated: bool,
}

impl Default for DOM {
    fn default() -> Self {
        Self::new()
    }
}

impl DOM {
    /// An empty document shown in a window scrolled to the origin.
    pub fn new() -> Self {
        let mut dom = Self::detached();
        dom.window = Some(Window::default());
        dom
    }

    /// An empty document that is not shown in any window.
    pub fn detached() -> Self {
        let mut dom = Arena::new();
        let root = dom.new_node(DOMNode::new(NodeKey::ROOT, NodeKind::Document));
        let mut keys = HashMap::new();
        keys.insert(NodeKey::ROOT, root);
        Self {
            dom,
            root,
            keys,
            next_key: 1,
            window: None,
            simulated: false,
        }
    }

    /// `<html><body></body></html>` with both boxes filling a viewport of the given size.
    ///
    /// # Errors
    /// Never fails for a fresh document; the signature follows the builders it uses.
    pub fn html_page(width: f32, height: f32) -> Result<Self> {
        let mut dom = Self::new();
        let viewport = Rect::new(0.0, 0.0, width, height);
        let html = dom.create_element(NodeKey::ROOT, "html")?;
        dom.set_rect(html, viewport)?;
        let body = dom.create_element(html, "body")?;
        dom.set_rect(body, viewport)?;
        Ok(dom)
    }

    pub fn window(&self) -> Option<Window> {
        self.window
    }

    pub fn simulated(&self) -> bool {
        self.simulated
    }

    /// Mark this document as coming from an environment without layout.
    pub fn set_simulated(&mut self, simulated: bool) {
        self.simulated = simulated;
    }

    fn mint_key(&mut self) -> NodeKey {
        while self.keys.contains_key(&NodeKey(self.next_key)) {
            self.next_key += 1;
        }
        let key = NodeKey(self.next_key);
        self.next_key += 1;
        key
    }

    pub(crate) fn id_of(&self, key: NodeKey) -> Result<NodeId> {
        self.keys
            .get(&key)
            .copied()
            .ok_or_else(|| anyhow!("unknown node {key:?}"))
    }

    /// Node data for a key, if the key is live.
    pub fn node(&self, key: NodeKey) -> Option<&DOMNode> {
        let id = self.keys.get(&key)?;
        self.dom.get(*id).map(Node::get)
    }

    pub(crate) fn node_by_id(&self, id: NodeId) -> Option<&DOMNode> {
        self.dom.get(id).map(Node::get)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.keys.contains_key(&key)
    }

    pub fn parent_of(&self, key: NodeKey) -> Option<NodeKey> {
        let id = self.keys.get(&key)?;
        let parent = self.dom.get(*id)?.parent()?;
        self.node_by_id(parent).map(|node| node.key)
    }

    pub fn children_of(&self, key: NodeKey) -> Vec<NodeKey> {
        self.keys.get(&key).map_or_else(Vec::new, |id| {
            id.children(&self.dom)
                .filter_map(|child| self.node_by_id(child).map(|node| node.key))
                .collect()
        })
    }

    /// Append a new element to `parent` and return its key.
    ///
    /// # Errors
    /// Fails if `parent` is unknown or cannot have children.
    pub fn create_element(&mut self, parent: NodeKey, tag: &str) -> Result<NodeKey> {
        let node = self.mint_key();
        let pos = self.child_count(parent)?;
        self.apply_update(DOMUpdate::InsertElement {
            parent,
            node,
            tag: tag.to_owned(),
            pos,
        })?;
        Ok(node)
    }

    /// Append a text node to `parent` and return its key.
    ///
    /// # Errors
    /// Fails if `parent` is unknown or cannot have children.
    pub fn create_text(&mut self, parent: NodeKey, text: &str) -> Result<NodeKey> {
        let node = self.mint_key();
        let pos = self.child_count(parent)?;
        self.apply_update(DOMUpdate::InsertText {
            parent,
            node,
            text: text.to_owned(),
            pos,
        })?;
        Ok(node)
    }

    /// Append a comment node to `parent` and return its key.
    ///
    /// # Errors
    /// Fails if `parent` is unknown or cannot have children.
    pub fn create_comment(&mut self, parent: NodeKey, text: &str) -> Result<NodeKey> {
        let node = self.mint_key();
        let pos = self.child_count(parent)?;
        self.apply_update(DOMUpdate::InsertComment {
            parent,
            node,
            text: text.to_owned(),
            pos,
        })?;
        Ok(node)
    }

    /// # Errors
    /// Fails if `node` is not a live element.
    pub fn set_attr(&mut self, node: NodeKey, name: &str, value: &str) -> Result<()> {
        self.apply_update(DOMUpdate::SetAttr {
            node,
            name: name.to_owned(),
            value: value.to_owned(),
        })
    }

    /// Declare the computed value of one property.
    ///
    /// # Errors
    /// Fails if `node` is not a live element.
    pub fn set_style(&mut self, node: NodeKey, name: &str, value: &str) -> Result<()> {
        self.apply_update(DOMUpdate::SetStyle {
            node,
            name: name.to_owned(),
            value: value.to_owned(),
        })
    }

    /// Declare several properties from `name: value; name: value` text.
    ///
    /// # Errors
    /// Fails if `node` is not a live element or a declaration has no `:`.
    pub fn set_style_text(&mut self, node: NodeKey, text: &str) -> Result<()> {
        for declaration in text.split(';').map(str::trim).filter(|decl| !decl.is_empty()) {
            let (name, value) = declaration
                .split_once(':')
                .ok_or_else(|| anyhow!("malformed declaration `{declaration}`"))?;
            self.set_style(node, name.trim(), value.trim())?;
        }
        Ok(())
    }

    /// # Errors
    /// Fails if `node` is not a live element.
    pub fn set_rect(&mut self, node: NodeKey, rect: Rect) -> Result<()> {
        self.apply_update(DOMUpdate::SetRect { node, rect })
    }

    /// # Errors
    /// Fails if `node` is not a live element.
    pub fn set_scroll(&mut self, node: NodeKey, offset: ScrollOffset) -> Result<()> {
        self.apply_update(DOMUpdate::SetScroll { node, offset })
    }

    /// # Errors
    /// Fails if `node` is not a live element.
    pub fn set_scroll_size(&mut self, node: NodeKey, size: Size) -> Result<()> {
        self.apply_update(DOMUpdate::SetScrollSize { node, size })
    }

    fn child_count(&self, parent: NodeKey) -> Result<usize> {
        let id = self.id_of(parent)?;
        Ok(id.children(&self.dom).count())
    }

    /// The `<html>` element: the document's first element child.
    pub fn root_element(&self) -> Option<NodeKey> {
        self.root
            .children(&self.dom)
            .filter_map(|id| self.node_by_id(id))
            .find(|node| node.tag().is_some())
            .map(|node| node.key)
    }

    /// The first `<body>` child of the `<html>` element.
    pub fn body(&self) -> Option<NodeKey> {
        let html = self.root_element()?;
        let html_id = self.keys.get(&html)?;
        html_id
            .children(&self.dom)
            .filter_map(|id| self.node_by_id(id))
            .find(|node| node.tag().is_some_and(|tag| tag.eq_ignore_ascii_case("body")))
            .map(|node| node.key)
    }

    /// All nodes in tree order, starting with the document.
    pub fn keys_in_order(&self) -> Vec<NodeKey> {
        self.root
            .descendants(&self.dom)
            .filter_map(|id| self.node_by_id(id).map(|node| node.key))
            .collect()
    }

    /// First element, in tree order, whose attribute `name` equals `value`.
    pub fn find_by_attr(&self, name: &str, value: &str) -> Option<NodeKey> {
        self.root
            .descendants(&self.dom)
            .filter_map(|id| self.node_by_id(id))
            .find(|node| node.tag().is_some() && node.attr(name) == Some(value))
            .map(|node| node.key)
    }

    /// Element carrying `data-target="<name>"`.
    pub fn target(&self, name: &str) -> Option<NodeKey> {
        self.find_by_attr("data-target", name)
    }

    /// Elements with the given tag, in tree order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeKey> {
        self.root
            .descendants(&self.dom)
            .filter_map(|id| self.node_by_id(id))
            .filter(|node| node.tag().is_some_and(|name| name.eq_ignore_ascii_case(tag)))
            .map(|node| node.key)
            .collect()
    }
}
