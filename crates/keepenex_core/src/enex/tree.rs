//! Owned output tree and its XML serializer.
//!
//! # Responsibility
//! - Model the export document as `Element | Text | RawText` nodes.
//! - Serialize the tree through an explicit [`TreeWriter`] strategy.
//!
//! # Invariants
//! - `Text` is escaped on output; `RawText` is written verbatim inside a
//!   CDATA block and never re-escaped.
//! - The document preamble is written once by [`write_document`], never by
//!   the tree walk.

use std::io::{self, Write};

use quick_xml::escape::partial_escape;

/// XML declaration line of an export document.
pub const XML_DECLARATION: &str = "<?xml version='1.0' encoding='UTF-8'?>";
/// Document type line of an export document.
pub const EXPORT_DOCTYPE: &str =
    "<!DOCTYPE en-export SYSTEM \"http://xml.evernote.com/pub/evernote-export3.dtd\">";

/// One node of the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Character data, escaped on serialization.
    Text(String),
    /// Pre-built markup, emitted verbatim as CDATA.
    RawText(String),
}

/// Element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Element holding a single text child (or nothing when `text` is empty).
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut element = Self::new(name);
        if !text.is_empty() {
            element.children.push(Node::Text(text));
        }
        element
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    pub fn push_element(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    /// Child elements with the given name, in order.
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter_map(move |node| match node {
            Node::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    /// First child element with the given name.
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    /// Concatenated text of the direct `Text`/`RawText` children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) | Node::RawText(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Value of the named attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Tree-walking serialization strategy.
pub trait TreeWriter {
    /// Writes `element` and its subtree, without any preamble.
    fn write_element(&self, element: &Element, out: &mut dyn Write) -> io::Result<()>;
}

/// Compact XML writer: no indentation, CDATA for raw text.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlTreeWriter;

impl XmlTreeWriter {
    fn write_node(&self, node: &Node, out: &mut dyn Write) -> io::Result<()> {
        match node {
            Node::Element(element) => self.write_element(element, out),
            Node::Text(text) => out.write_all(escape_text(text).as_bytes()),
            Node::RawText(text) => write!(out, "\n<![CDATA[{text}]]>\n"),
        }
    }
}

impl TreeWriter for XmlTreeWriter {
    fn write_element(&self, element: &Element, out: &mut dyn Write) -> io::Result<()> {
        write!(out, "<{}", element.name)?;
        for (name, value) in &element.attributes {
            write!(out, " {}=\"{}\"", name, escape_attribute(value))?;
        }
        if element.children.is_empty() {
            return out.write_all(b" />");
        }
        out.write_all(b">")?;
        for child in &element.children {
            self.write_node(child, out)?;
        }
        write!(out, "</{}>", element.name)
    }
}

/// Writes the fixed two-line preamble followed by the serialized tree.
pub fn write_document(root: &Element, out: &mut dyn Write, writer: &dyn TreeWriter) -> io::Result<()> {
    writeln!(out, "{XML_DECLARATION}")?;
    writeln!(out, "{EXPORT_DOCTYPE}")?;
    writer.write_element(root, out)?;
    out.flush()
}

/// Renders a full document into a string using [`XmlTreeWriter`].
pub fn document_to_string(root: &Element) -> String {
    let mut buffer = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_document(root, &mut buffer, &XmlTreeWriter);
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Escapes character data for element content.
pub fn escape_text(text: &str) -> String {
    partial_escape(text).into_owned()
}

/// Escapes an attribute value for a double-quoted attribute.
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#09;"),
            other => escaped.push(other),
        }
    }
    escaped
}
