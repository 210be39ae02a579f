use core::fmt;

use indextree::{NodeEdge, NodeId};
use visibility::{EvaluatorConfig, VisibilityEvaluator};

use crate::{DOM, DOMNode, NodeKind};

/// Spaces per tree level.
const INDENT: usize = 2;

/// `<tag name="value" ...` with attributes in name order. Values are quoted
/// and escaped through their `Debug` form.
fn write_open_tag<W: fmt::Write>(
    out: &mut W,
    depth: usize,
    tag: &str,
    node: &DOMNode,
) -> fmt::Result {
    write!(out, "{:width$}<{}", "", tag.to_lowercase(), width = depth * INDENT)?;
    let mut pairs: Vec<&(String, String)> = node.attrs.iter().collect();
    pairs.sort_by(|left, right| left.0.cmp(&right.0));
    for (name, value) in pairs {
        write!(out, " {name}={value:?}")?;
    }
    Ok(())
}

/// Declared style as one `style="..."` attribute, in declaration order.
fn write_style<W: fmt::Write>(out: &mut W, node: &DOMNode) -> fmt::Result {
    if node.style.is_empty() {
        return Ok(());
    }
    let declarations = node
        .style
        .iter()
        .map(|(name, value)| format!("{name}: {value};"))
        .collect::<Vec<_>>()
        .join(" ");
    write!(out, " style={declarations:?}")
}

fn fmt_node(dom: &DOM, id: NodeId, out: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    let Some(node) = dom.node_by_id(id) else {
        return Ok(());
    };
    match &node.kind {
        NodeKind::Document => {
            writeln!(out, "{:width$}#document", "", width = depth * INDENT)?;
        }
        NodeKind::Element { tag } => {
            write_open_tag(out, depth, tag, node)?;
            write_style(out, node)?;
            let rect = node.layout.rect;
            writeln!(
                out,
                "> @ ({}, {}) {}x{}",
                rect.left, rect.top, rect.width, rect.height
            )?;
        }
        NodeKind::Text { text } => {
            // Whitespace-only text is noise in the outline.
            if text.chars().all(char::is_whitespace) {
                return Ok(());
            }
            writeln!(out, "{:width$}{text:?}", "", width = depth * INDENT)?;
        }
        NodeKind::Comment { text } => {
            writeln!(out, "{:width$}<!--{text}-->", "", width = depth * INDENT)?;
        }
    }
    for child in id.children(&dom.dom) {
        fmt_node(dom, child, out, depth + 1)?;
    }
    Ok(())
}

impl fmt::Debug for DOM {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.window {
            Some(window) => writeln!(
                out,
                "DOM (window scrolled to {}, {})",
                window.scroll.x, window.scroll.y
            )?,
            None => writeln!(out, "DOM (detached)")?,
        }
        fmt_node(self, self.root, out, 0)
    }
}

/// Element outline annotated with verdicts, rendered through `Display`.
struct Outline<'dom> {
    dom: &'dom DOM,
    config: EvaluatorConfig,
}

impl fmt::Display for Outline<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dom = self.dom;
        let evaluator = VisibilityEvaluator::with_config(dom, self.config);
        let Some(root) = dom.root_element().and_then(|key| dom.keys.get(&key).copied()) else {
            return Ok(());
        };
        for edge in root.traverse(&dom.dom) {
            let NodeEdge::Start(id) = edge else {
                continue;
            };
            let Some(node) = dom.node_by_id(id) else {
                continue;
            };
            let Some(tag) = node.tag() else {
                continue;
            };
            // Depth below the document node.
            let depth = id.ancestors(&dom.dom).skip(1).count().saturating_sub(1);
            write_open_tag(out, depth, tag, node)?;
            match evaluator.evaluate(node.key) {
                Ok(verdict) => writeln!(out, "> {verdict}")?,
                Err(err) => writeln!(out, "> {err}")?,
            }
        }
        Ok(())
    }
}

impl DOM {
    /// One line per element with its verdict, indented by depth.
    ///
    /// ```text
    /// <html> visible
    ///   <body> visible
    ///     <div data-target="menu"> hidden (display is none on the element or an ancestor)
    /// ```
    pub fn visibility_outline(&self, config: EvaluatorConfig) -> String {
        Outline { dom: self, config }.to_string()
    }
}

#[cfg(test)]
mod tests {
    use visibility::Rect;

    use super::*;
    use crate::DOMUpdate;

    fn sample() -> DOM {
        let mut dom = DOM::html_page(100.0, 50.0).unwrap();
        let body = dom.body().unwrap();
        let menu = dom.create_element(body, "div").unwrap();
        dom.set_attr(menu, "data-target", "menu").unwrap();
        dom.set_style(menu, "display", "none").unwrap();
        dom.create_text(menu, "Open\n").unwrap();
        let button = dom.create_element(body, "button").unwrap();
        dom.set_rect(button, Rect::new(0.0, 0.0, 20.0, 10.0)).unwrap();
        dom.create_comment(body, "end").unwrap();
        dom
    }

    #[test]
    fn debug_prints_an_indented_tree() {
        let printed = format!("{:?}", sample());
        let expected = [
            "DOM (window scrolled to 0, 0)",
            "#document",
            "  <html> @ (0, 0) 100x50",
            "    <body> @ (0, 0) 100x50",
            "      <div data-target=\"menu\" style=\"display: none;\"> @ (0, 0) 0x0",
            "        \"Open\\n\"",
            "      <button> @ (0, 0) 20x10",
            "      <!--end-->",
            "",
        ]
        .join("\n");
        assert_eq!(printed, expected);
    }

    #[test]
    fn debug_escapes_quotes_in_values() {
        let mut dom = DOM::html_page(100.0, 50.0).unwrap();
        let body = dom.body().unwrap();
        let quote = dom.create_element(body, "q").unwrap();
        dom.set_attr(quote, "title", "say \"hi\"").unwrap();
        dom.create_text(quote, "tab\there").unwrap();

        let printed = format!("{dom:?}");
        assert!(printed.contains("      <q title=\"say \\\"hi\\\"\"> @ (0, 0) 0x0\n"));
        assert!(printed.contains("        \"tab\\there\"\n"));
    }

    #[test]
    fn outline_reports_each_verdict() {
        let outline = sample().visibility_outline(EvaluatorConfig::default());
        let lines: Vec<&str> = outline.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "<html> visible");
        assert_eq!(lines[1], "  <body> visible");
        assert!(lines[2].starts_with("    <div data-target=\"menu\"> hidden"));
        assert_eq!(lines[3], "    <button> visible");
    }

    #[test]
    fn outline_of_a_detached_document_reports_the_error() {
        let mut dom = sample();
        dom.apply_update(DOMUpdate::DetachWindow).unwrap();
        let outline = dom.visibility_outline(EvaluatorConfig::default());
        assert!(outline.lines().all(|line| line.contains("non-attached")));
    }
}
