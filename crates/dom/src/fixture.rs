//! JSON page fixtures.
//!
//! A fixture describes a whole document: the window it is shown in, the
//! element tree with attributes and declared computed values, and the layout
//! already resolved for each element.
//!
//! ```json
//! {
//!   "window": { "scroll_x": 0, "scroll_y": 0 },
//!   "root": {
//!     "tag": "html",
//!     "rect": { "left": 0, "top": 0, "width": 800, "height": 600 },
//!     "children": [{ "tag": "body", "children": [{ "text": "hi" }] }]
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use anyhow::{Context as _, Result, anyhow};
use serde::{Deserialize, Serialize};
use visibility::{Rect, ScrollOffset, Size};

use crate::{DOM, NodeKey, NodeKind, Window};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowFixture {
    #[serde(default)]
    pub scroll_x: f32,
    #[serde(default)]
    pub scroll_y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RectFixture {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl From<RectFixture> for Rect {
    fn from(rect: RectFixture) -> Self {
        Self::new(rect.left, rect.top, rect.width, rect.height)
    }
}

impl From<Rect> for RectFixture {
    fn from(rect: Rect) -> Self {
        Self {
            left: rect.left,
            top: rect.top,
            width: rect.width,
            height: rect.height,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementFixture {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    /// Declared computed values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<RectFixture>,
    /// `[scrollLeft, scrollTop]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll: Option<(f32, f32)>,
    /// `[scrollWidth, scrollHeight]`; defaults to the rect size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_size: Option<(f32, f32)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeFixture>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeFixture {
    Text { text: String },
    Comment { comment: String },
    Element(ElementFixture),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentFixture {
    /// `None` describes a document not shown in any window.
    #[serde(default)]
    pub window: Option<WindowFixture>,
    #[serde(default)]
    pub simulated: bool,
    pub root: ElementFixture,
}

impl DOM {
    /// Build a snapshot from a fixture.
    ///
    /// # Errors
    /// Fails if an element in the fixture cannot be inserted or configured.
    pub fn from_fixture(fixture: &DocumentFixture) -> Result<Self> {
        let mut dom = Self::detached();
        dom.window = fixture.window.map(|window| Window {
            scroll: ScrollOffset::new(window.scroll_x, window.scroll_y),
        });
        dom.simulated = fixture.simulated;
        dom.build_element(NodeKey::ROOT, &fixture.root)?;
        Ok(dom)
    }

    /// # Errors
    /// Fails on malformed JSON or a fixture that cannot be built.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let fixture: DocumentFixture =
            serde_json::from_str(json).context("parsing document fixture")?;
        Self::from_fixture(&fixture)
    }

    fn build_element(&mut self, parent: NodeKey, fixture: &ElementFixture) -> Result<NodeKey> {
        let element = self.create_element(parent, &fixture.tag)?;
        for (name, value) in &fixture.attrs {
            self.set_attr(element, name, value)?;
        }
        for (name, value) in &fixture.style {
            self.set_style(element, name, value)?;
        }
        if let Some(rect) = fixture.rect {
            self.set_rect(element, rect.into())?;
        }
        if let Some((scroll_x, scroll_y)) = fixture.scroll {
            self.set_scroll(element, ScrollOffset::new(scroll_x, scroll_y))?;
        }
        if let Some((width, height)) = fixture.scroll_size {
            self.set_scroll_size(element, Size::new(width, height))?;
        }
        for child in &fixture.children {
            match child {
                NodeFixture::Text { text } => {
                    self.create_text(element, text)?;
                }
                NodeFixture::Comment { comment } => {
                    self.create_comment(element, comment)?;
                }
                NodeFixture::Element(nested) => {
                    self.build_element(element, nested).with_context(|| {
                        format!("building <{}> in <{}>", nested.tag, fixture.tag)
                    })?;
                }
            }
        }
        Ok(element)
    }

    /// Describe this snapshot as a fixture.
    ///
    /// # Errors
    /// Fails if the document has no root element.
    pub fn to_fixture(&self) -> Result<DocumentFixture> {
        let root = self
            .root_element()
            .ok_or_else(|| anyhow!("document has no root element"))?;
        Ok(DocumentFixture {
            window: self.window.map(|window| WindowFixture {
                scroll_x: window.scroll.x,
                scroll_y: window.scroll.y,
            }),
            simulated: self.simulated,
            root: self.element_fixture(root)?,
        })
    }

    fn element_fixture(&self, key: NodeKey) -> Result<ElementFixture> {
        let node = self.node(key).ok_or_else(|| anyhow!("unknown node {key:?}"))?;
        let tag = node
            .tag()
            .ok_or_else(|| anyhow!("node {key:?} is not an element"))?;
        let layout = node.layout;
        let mut children = Vec::new();
        for child in self.children_of(key) {
            let Some(data) = self.node(child) else {
                continue;
            };
            children.push(match &data.kind {
                NodeKind::Element { .. } => NodeFixture::Element(self.element_fixture(child)?),
                NodeKind::Text { text } => NodeFixture::Text { text: text.clone() },
                NodeKind::Comment { text } => NodeFixture::Comment {
                    comment: text.clone(),
                },
                NodeKind::Document => continue,
            });
        }
        Ok(ElementFixture {
            tag: tag.to_owned(),
            attrs: node.attrs.iter().cloned().collect(),
            style: node.style.iter().cloned().collect(),
            rect: (layout.rect != Rect::default()).then_some(RectFixture::from(layout.rect)),
            scroll: (layout.scroll != ScrollOffset::default())
                .then_some((layout.scroll.x, layout.scroll.y)),
            scroll_size: layout
                .scroll_size
                .map(|size| (size.width, size.height)),
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "window": { "scroll_y": 20 },
        "root": {
            "tag": "html",
            "rect": { "left": 0, "top": 0, "width": 300, "height": 200 },
            "children": [{
                "tag": "body",
                "style": { "overflow": "hidden" },
                "rect": { "left": 0, "top": 0, "width": 300, "height": 200 },
                "children": [
                    { "comment": "banner" },
                    {
                        "tag": "div",
                        "attrs": { "data-target": "panel" },
                        "scroll": [0, 40],
                        "scroll_size": [300, 900],
                        "children": [{ "text": "hello" }]
                    }
                ]
            }]
        }
    }"#;

    #[test]
    fn json_fixture_builds_the_tree() {
        let dom = DOM::from_json_str(PAGE).unwrap();
        let body = dom.body().unwrap();
        let panel = dom.target("panel").unwrap();

        assert_eq!(dom.parent_of(panel), Some(body));
        assert_eq!(dom.window().map(|window| window.scroll.y), Some(20.0));
        assert!(!dom.simulated());
        assert_eq!(dom.node(body).unwrap().declared("overflow"), Some("hidden"));

        let layout = dom.node(panel).unwrap().layout;
        assert_eq!(layout.scroll, ScrollOffset::new(0.0, 40.0));
        assert_eq!(layout.scroll_size, Some(Size::new(300.0, 900.0)));
        assert_eq!(dom.children_of(body).len(), 2);
    }

    #[test]
    fn fixture_survives_a_trip_through_the_snapshot() {
        let dom = DOM::from_json_str(PAGE).unwrap();
        let fixture = dom.to_fixture().unwrap();
        let rebuilt = DOM::from_fixture(&fixture).unwrap();
        assert_eq!(rebuilt.to_fixture().unwrap(), fixture);
    }

    #[test]
    fn missing_window_means_detached() {
        let dom = DOM::from_json_str(r#"{ "root": { "tag": "html" } }"#).unwrap();
        assert_eq!(dom.window(), None);
        assert!(DOM::from_json_str("{ \"root\": 3 }").is_err());
    }
}
