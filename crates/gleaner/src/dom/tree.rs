// ABOUTME: Owned element tree used for merged article roots, detached from the parsed document.
// ABOUTME: Provides deep copy from scraper elements plus HTML and text serialization.

use ego_tree::iter::Edge;
use scraper::{ElementRef, Node};

/// A node in an owned element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnedNode {
    Element(OwnedElement),
    Text(String),
    Comment(String),
}

/// An element that owns its attributes and children.
///
/// Built either empty (for synthetic wrappers) or as a deep copy of a parsed
/// element; the source document is never touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedElement {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<OwnedNode>,
}

impl OwnedElement {
    /// Create an empty element.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Copy a parsed element, its attributes and all descendants.
    ///
    /// Walks open/close edges with an explicit stack of elements under
    /// construction, so nesting depth is bounded by the heap only.
    pub fn deep_copy(element: &ElementRef) -> Self {
        let mut stack: Vec<OwnedElement> = Vec::new();
        for edge in element.traverse() {
            match edge {
                Edge::Open(node) => match node.value() {
                    Node::Element(value) => stack.push(Self {
                        tag: value.name().to_string(),
                        attrs: value
                            .attrs()
                            .map(|(k, v)| (k.to_string(), v.to_string()))
                            .collect(),
                        children: Vec::new(),
                    }),
                    Node::Text(text) => {
                        if let Some(top) = stack.last_mut() {
                            top.children.push(OwnedNode::Text(String::from(&**text)));
                        }
                    }
                    Node::Comment(comment) => {
                        if let Some(top) = stack.last_mut() {
                            top.children.push(OwnedNode::Comment(String::from(&**comment)));
                        }
                    }
                    _ => {}
                },
                Edge::Close(node) if node.value().is_element() => {
                    let Some(done) = stack.pop() else {
                        break;
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.append_child(done),
                        None => return done,
                    }
                }
                Edge::Close(_) => {}
            }
        }
        // The traversal always closes the element it opened first.
        Self::new(element.value().name())
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map_or(false, |c| c.split_whitespace().any(|c| c == class))
    }

    /// Add a class unless it is already present.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let classes = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attr("class", classes);
    }

    /// Append an element as the last child. The element is moved in; callers
    /// that hold document nodes copy them first with [`OwnedElement::deep_copy`].
    pub fn append_child(&mut self, child: OwnedElement) {
        self.children.push(OwnedNode::Element(child));
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &OwnedElement> {
        self.children.iter().filter_map(|c| match c {
            OwnedNode::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Concatenated descendant text.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Serialize to an HTML string.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        serialize_element(self, &mut out);
        out
    }
}

/// Flattened serialization steps, so output never recurses.
enum Step<'a> {
    Open(&'a OwnedElement),
    Close(&'a str),
    Text(&'a str),
    Comment(&'a str),
}

fn collect_text(element: &OwnedElement, out: &mut String) {
    let mut pending: Vec<&OwnedNode> = element.children.iter().rev().collect();
    while let Some(node) = pending.pop() {
        match node {
            OwnedNode::Text(t) => out.push_str(t),
            OwnedNode::Element(el) => pending.extend(el.children.iter().rev()),
            OwnedNode::Comment(_) => {}
        }
    }
}

fn serialize_element(element: &OwnedElement, out: &mut String) {
    let mut steps = vec![Step::Open(element)];
    while let Some(step) = steps.pop() {
        match step {
            Step::Open(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                if is_void_element(&el.tag) {
                    out.push_str(" />");
                    continue;
                }
                out.push('>');

                steps.push(Step::Close(&el.tag));
                for child in el.children.iter().rev() {
                    steps.push(match child {
                        OwnedNode::Element(child) => Step::Open(child),
                        OwnedNode::Text(t) => Step::Text(t),
                        OwnedNode::Comment(c) => Step::Comment(c),
                    });
                }
            }
            Step::Close(tag) => {
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            Step::Text(t) => out.push_str(&escape_text(t)),
            Step::Comment(c) => {
                out.push_str("<!--");
                out.push_str(c);
                out.push_str("-->");
            }
        }
    }
}

impl Drop for OwnedElement {
    // Detach descendants onto a flat list so a deep chain is freed in a loop.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let OwnedNode::Element(mut el) = node {
                pending.append(&mut el.children);
            }
        }
    }
}

/// Escape attribute value
pub(crate) fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape text content
pub(crate) fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Check if tag is void element
pub(crate) fn is_void_element(tag: &str) -> bool {
    matches!(
        tag.to_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scraper::{Html, Selector};

    #[test]
    fn deep_copy_preserves_structure_and_leaves_source_intact() {
        let html = r#"<div class="post"><p>One &amp; two</p><img src="x.png"><!--c--></div>"#;
        let doc = Html::parse_fragment(html);
        let sel = Selector::parse("div").unwrap();
        let el = doc.select(&sel).next().unwrap();
        let before = el.html();

        let mut copy = OwnedElement::deep_copy(&el);
        copy.add_class("extra");
        copy.append_child(OwnedElement::new("span"));

        assert_eq!(el.html(), before);
        assert_eq!(
            copy.to_html(),
            r#"<div class="post extra"><p>One &amp; two</p><img src="x.png" /><!--c--><span></span></div>"#
        );
    }

    #[test]
    fn add_class_is_idempotent() {
        let mut el = OwnedElement::new("article");
        el.add_class("marker");
        el.add_class("marker");
        assert_eq!(el.attr("class"), Some("marker"));
        assert!(el.has_class("marker"));
    }

    fn nested(depth: usize) -> OwnedElement {
        let mut el = OwnedElement::new("p");
        el.children.push(OwnedNode::Text("deep".to_string()));
        for _ in 0..depth {
            let mut parent = OwnedElement::new("div");
            parent.append_child(el);
            el = parent;
        }
        el
    }

    #[test]
    fn deep_trees_serialize_and_drop_without_recursion() {
        const DEPTH: usize = 200_000;
        let el = nested(DEPTH);

        let html = el.to_html();
        assert!(html.starts_with("<div><div>"));
        assert!(html.contains("<p>deep</p>"));
        assert_eq!(html.matches("</div>").count(), DEPTH);
        assert_eq!(el.text(), "deep");
        drop(el);
    }

    #[test]
    fn deep_copy_handles_deeply_nested_source() {
        const DEPTH: usize = 10_000;
        let html = format!("{}<p>deep</p>{}", "<div>".repeat(DEPTH), "</div>".repeat(DEPTH));
        let doc = Html::parse_fragment(&html);
        let sel = Selector::parse("div").unwrap();
        let copy = OwnedElement::deep_copy(&doc.select(&sel).next().unwrap());

        assert_eq!(copy.text(), "deep");
        assert_eq!(copy.to_html(), nested(DEPTH).to_html());
    }

    #[test]
    fn text_concatenates_descendants() {
        let doc = Html::parse_fragment("<div>Hello <b>bold</b> world</div>");
        let sel = Selector::parse("div").unwrap();
        let copy = OwnedElement::deep_copy(&doc.select(&sel).next().unwrap());
        assert_eq!(copy.text(), "Hello bold world");
        assert_eq!(copy.child_elements().count(), 1);
    }
}
