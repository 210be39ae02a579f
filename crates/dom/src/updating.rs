use anyhow::{Result, anyhow, bail};
use indextree::NodeId;
use log::trace;
use smallvec::SmallVec;
use visibility::{Rect, ScrollOffset, Size};

use crate::{DOM, DOMNode, NodeKey, NodeKind, Window};

/// A batchable change to the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum DOMUpdate {
    InsertElement {
        parent: NodeKey,
        node: NodeKey,
        tag: String,
        pos: usize,
    },
    InsertText {
        parent: NodeKey,
        node: NodeKey,
        text: String,
        pos: usize,
    },
    InsertComment {
        parent: NodeKey,
        node: NodeKey,
        text: String,
        pos: usize,
    },
    SetAttr {
        node: NodeKey,
        name: String,
        value: String,
    },
    /// Declare the computed value of a property; an empty value removes it.
    SetStyle {
        node: NodeKey,
        name: String,
        value: String,
    },
    SetRect {
        node: NodeKey,
        rect: Rect,
    },
    SetScroll {
        node: NodeKey,
        offset: ScrollOffset,
    },
    SetScrollSize {
        node: NodeKey,
        size: Size,
    },
    /// Remove a node and its whole subtree.
    RemoveNode {
        node: NodeKey,
    },
    AttachWindow {
        scroll: ScrollOffset,
    },
    DetachWindow,
}

/// Replace the value for `name`, or append it.
fn upsert(entries: &mut SmallVec<(String, String), 4>, name: String, value: String) {
    if let Some(entry) = entries.iter_mut().find(|(key, _)| *key == name) {
        entry.1 = value;
    } else {
        entries.push((name, value));
    }
}

impl DOM {
    /// Apply a batch of updates in order, stopping at the first failure.
    ///
    /// # Errors
    /// Returns the first update's error; earlier updates stay applied.
    pub fn apply_updates<I>(&mut self, updates: I) -> Result<()>
    where
        I: IntoIterator<Item = DOMUpdate>,
    {
        for update in updates {
            self.apply_update(update)?;
        }
        Ok(())
    }

    /// # Errors
    /// Fails on unknown parents or targets, duplicate keys, inserting under a
    /// node that cannot have children, and element-only updates aimed at
    /// other nodes.
    pub fn apply_update(&mut self, update: DOMUpdate) -> Result<()> {
        trace!(target: "dom", "apply {update:?}");
        match update {
            DOMUpdate::InsertElement {
                parent,
                node,
                tag,
                pos,
            } => self.insert(parent, node, NodeKind::Element { tag }, pos),
            DOMUpdate::InsertText {
                parent,
                node,
                text,
                pos,
            } => self.insert(parent, node, NodeKind::Text { text }, pos),
            DOMUpdate::InsertComment {
                parent,
                node,
                text,
                pos,
            } => self.insert(parent, node, NodeKind::Comment { text }, pos),
            DOMUpdate::SetAttr { node, name, value } => {
                let data = self.element_mut(node)?;
                upsert(&mut data.attrs, name.to_ascii_lowercase(), value);
                Ok(())
            }
            DOMUpdate::SetStyle { node, name, value } => {
                let data = self.element_mut(node)?;
                let name = name.trim().to_ascii_lowercase();
                if value.trim().is_empty() {
                    data.style.retain(|(key, _)| *key != name);
                } else {
                    upsert(&mut data.style, name, value.trim().to_owned());
                }
                Ok(())
            }
            DOMUpdate::SetRect { node, rect } => {
                self.element_mut(node)?.layout.rect = rect;
                Ok(())
            }
            DOMUpdate::SetScroll { node, offset } => {
                self.element_mut(node)?.layout.scroll = offset;
                Ok(())
            }
            DOMUpdate::SetScrollSize { node, size } => {
                self.element_mut(node)?.layout.scroll_size = Some(size);
                Ok(())
            }
            DOMUpdate::RemoveNode { node } => self.remove(node),
            DOMUpdate::AttachWindow { scroll } => {
                self.window = Some(Window { scroll });
                Ok(())
            }
            DOMUpdate::DetachWindow => {
                self.window = None;
                Ok(())
            }
        }
    }

    fn insert(&mut self, parent: NodeKey, node: NodeKey, kind: NodeKind, pos: usize) -> Result<()> {
        if self.keys.contains_key(&node) {
            bail!("node {node:?} already exists");
        }
        let parent_id = self.id_of(parent)?;
        let parent_kind = &self.dom[parent_id].get().kind;
        if !matches!(parent_kind, NodeKind::Document | NodeKind::Element { .. }) {
            bail!("node {parent:?} cannot have children");
        }

        let id = self.dom.new_node(DOMNode::new(node, kind));
        let sibling: Option<NodeId> = parent_id.children(&self.dom).nth(pos);
        match sibling {
            Some(next) => next.insert_before(id, &mut self.dom),
            None => parent_id.append(id, &mut self.dom),
        }
        self.keys.insert(node, id);
        Ok(())
    }

    fn remove(&mut self, node: NodeKey) -> Result<()> {
        if node == NodeKey::ROOT {
            bail!("the document node cannot be removed");
        }
        let id = self.id_of(node)?;
        let doomed: Vec<NodeKey> = id
            .descendants(&self.dom)
            .filter_map(|descendant| self.node_by_id(descendant).map(|data| data.key))
            .collect();
        id.remove_subtree(&mut self.dom);
        for key in doomed {
            self.keys.remove(&key);
        }
        Ok(())
    }

    fn element_mut(&mut self, node: NodeKey) -> Result<&mut DOMNode> {
        let id = self.id_of(node)?;
        let data = self
            .dom
            .get_mut(id)
            .ok_or_else(|| anyhow!("node {node:?} was removed"))?
            .get_mut();
        match data.kind {
            NodeKind::Element { .. } => Ok(data),
            NodeKind::Document | NodeKind::Text { .. } | NodeKind::Comment { .. } => {
                bail!("node {node:?} is not an element")
            }
        }
    }
}
