//! A small owned XML element tree: parsed with `roxmltree`, edited in place,
//! and written back with two-space indentation.

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(Element),
    Text(String),
    Comment(String),
}

impl XmlNode {
    fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(e) => Some(e),
            _ => None,
        }
    }

    fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(e) => Some(e),
            _ => None,
        }
    }

    fn is_blank_text(&self) -> bool {
        matches!(self, Self::Text(t) if t.trim().is_empty())
    }
}

/// An XML element with its (possibly prefixed) name, attributes in document
/// order, and children. Namespace declarations are kept as `xmlns` attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// An element whose only content is `text`.
    pub fn with_text(name: &str, text: &str) -> Self {
        let mut element = Self::new(name);
        element.children.push(XmlNode::Text(text.to_owned()));
        element
    }

    /// Builder method appending a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Child elements, skipping text and comments.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// Child elements called `name`, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |e| e.name == name)
    }

    /// Mutable child elements called `name`, in document order.
    pub fn children_named_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut Element> {
        self.children
            .iter_mut()
            .filter_map(XmlNode::as_element_mut)
            .filter(move |e| e.name == name)
    }

    /// The first child element called `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// The first child element called `name`, mutably.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children
            .iter_mut()
            .filter_map(XmlNode::as_element_mut)
            .find(|e| e.name == name)
    }

    /// Run `edit` on the first child element called `name`.
    ///
    /// When no such child exists, a new empty one is edited and then appended.
    pub fn edit_child<R>(&mut self, name: &str, edit: impl FnOnce(&mut Element) -> R) -> R {
        if let Some(child) = self.child_mut(name) {
            return edit(child);
        }
        let mut child = Element::new(name);
        let result = edit(&mut child);
        self.push(child);
        result
    }

    /// The concatenated, trimmed text content of this element.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                XmlNode::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect::<String>()
            .trim()
            .to_owned()
    }

    /// The trimmed text of the first child called `name`, if present and non-empty.
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name)
            .map(Element::text)
            .filter(|t| !t.is_empty())
    }

    /// Replace all text content with `text`. Comments and child elements are kept.
    pub fn set_text(&mut self, text: &str) {
        self.children.retain(|n| !matches!(n, XmlNode::Text(_)));
        self.children.insert(0, XmlNode::Text(text.to_owned()));
    }

    /// Append a child element.
    pub fn push(&mut self, child: Element) {
        self.children.push(XmlNode::Element(child));
    }

    fn write(&self, out: &mut String, depth: usize) {
        indent(out, depth);
        self.write_open_tag(out);

        let significant: Vec<&XmlNode> = self
            .children
            .iter()
            .filter(|n| !n.is_blank_text())
            .collect();

        if significant.is_empty() {
            out.push_str("/>\n");
            return;
        }

        out.push('>');
        if significant.iter().any(|n| matches!(n, XmlNode::Text(_))) {
            // Text-only or mixed content is written inline so no whitespace is introduced.
            for node in &self.children {
                write_inline(node, out);
            }
        } else {
            out.push('\n');
            for node in significant {
                match node {
                    XmlNode::Element(e) => e.write(out, depth.saturating_add(1)),
                    XmlNode::Comment(c) => {
                        indent(out, depth.saturating_add(1));
                        out.push_str("<!--");
                        out.push_str(c);
                        out.push_str("-->\n");
                    }
                    XmlNode::Text(_) => {}
                }
            }
            indent(out, depth);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push_str(">\n");
    }

    fn write_open_tag(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape(value, true));
            out.push('"');
        }
    }
}

fn write_inline(node: &XmlNode, out: &mut String) {
    match node {
        XmlNode::Text(t) => out.push_str(&escape(t, false)),
        XmlNode::Comment(c) => {
            out.push_str("<!--");
            out.push_str(c);
            out.push_str("-->");
        }
        XmlNode::Element(e) => {
            e.write_open_tag(out);
            if e.children.is_empty() {
                out.push_str("/>");
            } else {
                out.push('>');
                for child in &e.children {
                    write_inline(child, out);
                }
                out.push_str("</");
                out.push_str(&e.name);
                out.push('>');
            }
        }
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn escape(raw: &str, attribute: bool) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if attribute => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// A parsed document: comments before the root element plus the root itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    pub prolog_comments: Vec<String>,
    pub root: Element,
}

impl XmlDocument {
    /// Parse `xml` into an owned tree.
    ///
    /// # Errors
    /// Returns the `roxmltree` error if the input is not well-formed.
    pub fn parse(xml: &str) -> Result<Self, roxmltree::Error> {
        let doc = roxmltree::Document::parse(xml)?;
        let root_node = doc.root_element();

        let prolog_comments = doc
            .root()
            .children()
            .take_while(|n| *n != root_node)
            .filter(roxmltree::Node::is_comment)
            .filter_map(|n| n.text())
            .map(str::to_owned)
            .collect();

        Ok(Self {
            prolog_comments,
            root: convert(root_node),
        })
    }

    /// Serialize with an XML declaration and two-space indentation.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        for comment in &self.prolog_comments {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->\n");
        }
        self.root.write(&mut out, 0);
        out
    }
}

fn convert(node: roxmltree::Node<'_, '_>) -> Element {
    let tag = node.tag_name();
    let name = qualify(node, tag.namespace(), tag.name(), true);

    let mut attributes = Vec::new();
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();
    for ns in node.namespaces() {
        if ns.name() == Some("xml") || inherited.contains(&(ns.name(), ns.uri())) {
            continue;
        }
        let attr_name = match ns.name() {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_owned(),
        };
        attributes.push((attr_name, ns.uri().to_owned()));
    }
    for attr in node.attributes() {
        let attr_name = qualify(node, attr.namespace(), attr.name(), false);
        attributes.push((attr_name, attr.value().to_owned()));
    }

    let children = node
        .children()
        .filter_map(|child| {
            if child.is_element() {
                Some(XmlNode::Element(convert(child)))
            } else if child.is_text() {
                child.text().map(|t| XmlNode::Text(t.to_owned()))
            } else if child.is_comment() {
                child.text().map(|t| XmlNode::Comment(t.to_owned()))
            } else {
                None
            }
        })
        .collect();

    Element {
        name,
        attributes,
        children,
    }
}

/// Rebuild `prefix:local` from a namespace URI using the prefixes in scope at `node`.
/// Elements may use the default namespace; attributes never do.
fn qualify(node: roxmltree::Node<'_, '_>, uri: Option<&str>, local: &str, element: bool) -> String {
    let Some(uri) = uri else {
        return local.to_owned();
    };
    let mut bound = node.namespaces().filter(|ns| ns.uri() == uri);
    let prefix = if element {
        let candidates: Vec<Option<&str>> = bound.map(|ns| ns.name()).collect();
        if candidates.contains(&None) {
            None
        } else {
            candidates.into_iter().flatten().next()
        }
    } else {
        bound.find_map(|ns| ns.name())
    };
    match prefix {
        Some(prefix) => format!("{prefix}:{local}"),
        None => local.to_owned(),
    }
}
