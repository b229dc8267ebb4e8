use scraper::{ElementRef, Html};
use std::fmt::Write;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeKind {
    Element {
        name: String,
        attrs: Vec<(String, String)>,
        /// Markup as serialised by the parser; `None` for built nodes.
        markup: Option<String>,
    },
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    position: usize,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    pub fn new(root_name: &str) -> Document {
        Document {
            nodes: vec![NodeData {
                kind: NodeKind::Element {
                    name: root_name.to_ascii_lowercase(),
                    attrs: vec![],
                    markup: None,
                },
                parent: None,
                position: 0,
                children: vec![],
            }],
        }
    }

    /// Comments, doctypes and processing instructions are dropped.
    pub fn parse(html: &str) -> Document {
        let html = Html::parse_document(html);
        let root = html.root_element();
        let mut doc = Document::new(root.value().name());
        doc.set_markup(doc.root_id(), root.html());
        doc.import(doc.root_id(), root);
        doc
    }

    fn set_markup(&mut self, id: NodeId, html: String) {
        if let NodeKind::Element { markup, .. } = &mut self.nodes[id.0].kind {
            *markup = Some(html);
        }
    }

    fn import(&mut self, parent: NodeId, el: ElementRef<'_>) {
        for child in el.children() {
            match child.value() {
                scraper::Node::Text(text) => {
                    self.append_text(parent, text);
                }
                scraper::Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        let attrs: Vec<(&str, &str)> = child_el.value().attrs().collect();
                        let id = self.append_element(parent, child_el.value().name(), &attrs);
                        self.set_markup(id, child_el.html());
                        self.import(id, child_el);
                    }
                }
                _ => {}
            }
        }
    }

    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.node(self.root_id())
    }

    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { doc: self, id }
    }

    pub fn append_element(&mut self, parent: NodeId, name: &str, attrs: &[(&str, &str)]) -> NodeId {
        self.push(
            parent,
            NodeKind::Element {
                name: name.to_ascii_lowercase(),
                attrs: attrs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                markup: None,
            },
        )
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeKind::Text(text.to_string()))
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let position = self.nodes[parent.0].children.len();
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            position,
            children: vec![],
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn find_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.root().find_all(tag)
    }

    pub fn find<'a>(&'a self, tag: &'a str) -> Option<NodeRef<'a>> {
        self.find_all(tag).next()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> PartialEq for NodeRef<'a> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl<'a> NodeRef<'a> {
    fn data(&self) -> &'a NodeData {
        &self.doc.nodes[self.id.0]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Tag name for elements, `None` for text.
    pub fn name(&self) -> Option<&'a str> {
        match &self.data().kind {
            NodeKind::Element { name, .. } => Some(name.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn is(&self, tag: &str) -> bool {
        self.name() == Some(tag)
    }

    pub fn as_text(&self) -> Option<&'a str> {
        match &self.data().kind {
            NodeKind::Text(text) => Some(text.as_str()),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn attr(&self, key: &str) -> Option<&'a str> {
        self.attrs().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let attrs: &'a [(String, String)] = match &self.data().kind {
            NodeKind::Element { attrs, .. } => attrs.as_slice(),
            NodeKind::Text(_) => &[],
        };
        attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.data().parent.map(|id| self.doc.node(id))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        self.data().children.iter().map(move |id| doc.node(*id))
    }

    /// Element children only.
    pub fn child_elements(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.children().filter(|c| c.name().is_some())
    }

    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        let parent = self.parent()?;
        parent
            .data()
            .children
            .get(self.data().position + 1)
            .map(|id| self.doc.node(*id))
    }

    /// Siblings after this node, text nodes included.
    pub fn following_siblings(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let (doc, start) = (self.doc, self.data().position + 1);
        let siblings: &'a [NodeId] = match self.parent() {
            Some(parent) => parent.data().children.as_slice(),
            None => &[],
        };
        siblings
            .get(start..)
            .unwrap_or_default()
            .iter()
            .map(move |id| doc.node(*id))
    }

    /// Pre-order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'a> {
        let mut stack = self.data().children.clone();
        stack.reverse();
        Descendants {
            doc: self.doc,
            stack,
        }
    }

    pub fn find_all(&self, tag: &'a str) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.descendants().filter(move |n| n.is(tag))
    }

    pub fn find(&self, tag: &'a str) -> Option<NodeRef<'a>> {
        self.find_all(tag).next()
    }

    pub fn text(&self) -> String {
        if let Some(text) = self.as_text() {
            return text.to_string();
        }
        self.descendants().filter_map(|n| n.as_text()).collect()
    }

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match &self.data().kind {
            NodeKind::Text(text) => out.push_str(&escape(text, false)),
            NodeKind::Element {
                markup: Some(markup),
                ..
            } => out.push_str(markup),
            NodeKind::Element { name, attrs, .. } => {
                out.push('<');
                out.push_str(name);
                for (k, v) in attrs {
                    let _ = write!(out, " {}=\"{}\"", k, escape(v, true));
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&name.as_str()) {
                    return;
                }
                for child in self.children() {
                    child.write_html(out);
                }
                let _ = write!(out, "</{}>", name);
            }
        }
    }
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.doc.node(id);
        self.stack.extend(node.data().children.iter().rev());
        Some(node)
    }
}

fn escape(s: &str, attr: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_keeps_text_and_sibling_order() {
        let doc = Document::parse(
            "<html><body><p><strong>Model</strong><br>Maker, Inc.</p><ul><li>a</li></ul></body></html>",
        );
        let p = doc.find("p").unwrap();
        let names: Vec<Option<&str>> = p.children().map(|c| c.name()).collect();
        assert_eq!(names, vec![Some("strong"), Some("br"), None]);

        let strong = p.find("strong").unwrap();
        assert!(strong.next_sibling().unwrap().is("br"));
        assert_eq!(
            strong.next_sibling().unwrap().next_sibling().unwrap().as_text(),
            Some("Maker, Inc.")
        );
        assert!(p.following_siblings().any(|s| s.is("ul")));
        assert_eq!(p.text(), "ModelMaker, Inc.");
    }

    #[test]
    fn synthetic_tree_navigation() {
        let mut doc = Document::new("html");
        let root = doc.root_id();
        let first = doc.append_element(root, "p", &[]);
        doc.append_text(first, "one");
        let second = doc.append_element(root, "P", &[("class", "x")]);
        doc.append_text(second, "two");

        let ps: Vec<String> = doc.find_all("p").map(|p| p.text()).collect();
        assert_eq!(ps, vec!["one".to_string(), "two".to_string()]);
        assert_eq!(doc.node(second).attr("class"), Some("x"));
        assert_eq!(doc.node(first).next_sibling(), Some(doc.node(second)));
        assert!(doc.node(second).next_sibling().is_none());
    }

    #[test]
    fn built_nodes_are_serialised() {
        let mut doc = Document::new("div");
        let p = doc.append_element(doc.root_id(), "p", &[("title", "a\"b")]);
        doc.append_text(p, "x < y");
        doc.append_element(p, "br", &[]);
        assert_eq!(
            doc.node(p).outer_html(),
            r#"<p title="a&quot;b">x &lt; y<br></p>"#
        );
    }

    #[test]
    fn outer_html_renders_void_and_escapes() {
        let doc = Document::parse(r#"<p>a &amp; b<br><a href="x?y=1&amp;z=2">link</a></p>"#);
        let p = doc.find("p").unwrap();
        assert_eq!(
            p.outer_html(),
            r#"<p>a &amp; b<br><a href="x?y=1&amp;z=2">link</a></p>"#
        );
    }
}
