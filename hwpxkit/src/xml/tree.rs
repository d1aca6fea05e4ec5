//! Owned, mutable XML element tree
//!
//! Parts are parsed into a tree that keeps everything needed to write them back
//! the way they were read:
//! - element names exactly as written (`hp:tbl`), plus the resolved namespace URI
//! - attributes in source order with their raw (still escaped) values, including
//!   every `xmlns:*` declaration
//! - text, CDATA, comments and processing instructions in document order
//! - whether an element was written as `<x/>` or `<x></x>`
//!
//! Text and attribute values are stored escaped and only unescaped on read, so an
//! untouched node is written back byte for byte.

use super::namespaces::{uri_for_prefix, QName};
use super::XmlError;
use quick_xml::escape::{escape, partial_escape, unescape};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::{NsReader, Writer};
use std::borrow::Cow;

/// One attribute with its value kept in escaped form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub raw_value: String,
}

/// A node in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Escaped character data
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    /// Raw content between `<?` and `?>` of the `<?xml ...?>` declaration
    Declaration(String),
    DocType(String),
}

/// An element with its attributes and ordered children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    namespace: Option<String>,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
    self_closing: bool,
}

/// A parsed XML part: prolog nodes, the root element, trailing nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl Element {
    /// Create an empty element
    ///
    /// # Parameters
    /// * `name` - Qualified name as it should be written (e.g., `hp:t`)
    /// * `namespace` - Namespace URI the prefix is bound to
    pub fn new(name: impl Into<String>, namespace: Option<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: false,
        }
    }

    /// Create a sibling-style element that shares this element's prefix and namespace
    ///
    /// `hp:run` -> `hp:<local>`; an unprefixed element yields an unprefixed name.
    pub fn new_in_namespace_of(&self, local: &str) -> Self {
        let name = match self.prefix() {
            Some(prefix) => format!("{}:{}", prefix, local),
            None => local.to_string(),
        };
        Self::new(name, self.namespace.clone())
    }

    /// Qualified name as written
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prefix part of the qualified name
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Local part of the qualified name
    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    /// Resolved namespace URI
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Whether this element matches a namespace-qualified name
    pub fn is(&self, qname: QName) -> bool {
        self.local_name() == qname.local && self.namespace() == Some(qname.ns)
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Unescaped attribute value, if present
    pub fn attribute(&self, name: &str) -> Option<Cow<'_, str>> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| unescape(&a.raw_value).unwrap_or(Cow::Borrowed(a.raw_value.as_str())))
    }

    /// Set an attribute, replacing an existing value in place or appending a new one
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let raw_value = escape(value).into_owned();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.raw_value = raw_value,
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                raw_value,
            }),
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Child elements in document order
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Child elements matching a qualified name
    pub fn children_named(&self, qname: QName) -> impl Iterator<Item = &Element> {
        self.child_elements().filter(move |e| e.is(qname))
    }

    /// First child element matching a qualified name
    pub fn child(&self, qname: QName) -> Option<&Element> {
        self.children_named(qname).next()
    }

    /// Append a child node
    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Remove every direct child element matching `qname`, returning how many were removed
    pub fn remove_children(&mut self, qname: QName) -> usize {
        let before = self.children.len();
        self.children
            .retain(|node| !matches!(node, Node::Element(e) if e.is(qname)));
        before - self.children.len()
    }

    /// Concatenated, unescaped text of the direct text and CDATA children
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                Node::Text(raw) => match unescape(raw) {
                    Ok(text) => out.push_str(&text),
                    Err(_) => out.push_str(raw),
                },
                Node::CData(data) => out.push_str(data),
                _ => {}
            }
        }
        out
    }

    /// Replace all children with a single escaped text node
    pub fn set_text(&mut self, text: &str) {
        self.children.clear();
        self.children.push(Node::Text(partial_escape(text).into_owned()));
    }

    /// All descendant elements in document order (not including `self`)
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_descendants(self, &mut out);
        out
    }

    /// Child-index paths to every descendant matching `qname`, in document order
    ///
    /// A path is the sequence of indices into `children()` from this element down
    /// to the match, suitable for [`Element::at_path_mut`].
    pub fn descendant_paths(&self, qname: QName) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        let mut prefix = Vec::new();
        collect_paths(self, qname, &mut prefix, &mut out);
        out
    }

    /// Element at a child-index path
    pub fn at_path(&self, path: &[usize]) -> Option<&Element> {
        let mut current = self;
        for &index in path {
            current = match current.children.get(index)? {
                Node::Element(e) => e,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Mutable element at a child-index path
    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for &index in path {
            current = match current.children.get_mut(index)? {
                Node::Element(e) => e,
                _ => return None,
            };
        }
        Some(current)
    }

    fn from_start(start: &BytesStart<'_>, ns: ResolveResult<'_>, self_closing: bool) -> Result<Self, XmlError> {
        let name = std::str::from_utf8(start.name().as_ref())?.to_string();

        let namespace = match ns {
            ResolveResult::Bound(uri) => Some(std::str::from_utf8(uri.as_ref())?.to_string()),
            ResolveResult::Unbound => None,
            ResolveResult::Unknown(prefix) => {
                // Undeclared prefix; fall back to the registry so queries still match
                let prefix = String::from_utf8_lossy(&prefix).into_owned();
                log::warn!("Undeclared namespace prefix '{}' on <{}>", prefix, name);
                uri_for_prefix(&prefix).map(str::to_string)
            }
        };

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            attributes.push(Attribute {
                name: std::str::from_utf8(attr.key.as_ref())?.to_string(),
                raw_value: std::str::from_utf8(&attr.value)?.to_string(),
            });
        }

        Ok(Self {
            name,
            namespace,
            attributes,
            children: Vec::new(),
            self_closing,
        })
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), XmlError> {
        let mut content = self.name.clone();
        for attr in &self.attributes {
            let quote = if attr.raw_value.contains('"') { '\'' } else { '"' };
            content.push(' ');
            content.push_str(&attr.name);
            content.push('=');
            content.push(quote);
            content.push_str(&attr.raw_value);
            content.push(quote);
        }
        let start = BytesStart::from_content(content, self.name.len());

        if self.children.is_empty() && self.self_closing {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            write_node(child, writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

fn collect_descendants<'a>(element: &'a Element, out: &mut Vec<&'a Element>) {
    for child in element.child_elements() {
        out.push(child);
        collect_descendants(child, out);
    }
}

fn collect_paths(element: &Element, qname: QName, prefix: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
    for (index, node) in element.children.iter().enumerate() {
        if let Node::Element(child) = node {
            prefix.push(index);
            if child.is(qname) {
                out.push(prefix.clone());
            }
            collect_paths(child, qname, prefix, out);
            prefix.pop();
        }
    }
}

fn write_node(node: &Node, writer: &mut Writer<Vec<u8>>) -> Result<(), XmlError> {
    match node {
        Node::Element(e) => e.write_to(writer)?,
        Node::Text(raw) => writer.write_event(Event::Text(BytesText::from_escaped(raw.as_str())))?,
        Node::CData(data) => writer.write_event(Event::CData(BytesCData::new(data.as_str())))?,
        Node::Comment(raw) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(raw.as_str())))?
        }
        Node::ProcessingInstruction(raw) => {
            writer.write_event(Event::PI(BytesText::from_escaped(raw.as_str())))?
        }
        Node::Declaration(raw) => writer.write_event(Event::Decl(BytesDecl::from_start(
            BytesStart::from_content(raw.as_str(), 3),
        )))?,
        Node::DocType(raw) => {
            writer.write_event(Event::DocType(BytesText::from_escaped(raw.as_str())))?
        }
    }
    Ok(())
}

fn bytes_to_string(bytes: Cow<'_, [u8]>) -> Result<String, XmlError> {
    Ok(String::from_utf8(bytes.into_owned()).map_err(|e| e.utf8_error())?)
}

impl XmlDocument {
    /// Parse a part from its bytes
    ///
    /// # Returns
    /// * `Ok(XmlDocument)` - The parsed tree
    /// * `Err(XmlError)` - Malformed XML, mismatched tags, invalid UTF-8, or no root element
    pub fn parse(bytes: &[u8]) -> Result<Self, XmlError> {
        let mut reader = NsReader::from_reader(bytes);
        let mut buf = Vec::new();

        let mut stack: Vec<Element> = Vec::new();
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let (ns, event) = reader.read_resolved_event_into(&mut buf)?;
            let node = match event {
                Event::Start(start) => {
                    stack.push(Element::from_start(&start, ns, false)?);
                    None
                }
                Event::Empty(start) => Some(Node::Element(Element::from_start(&start, ns, true)?)),
                Event::End(_) => {
                    let element = stack.pop().ok_or(XmlError::UnbalancedEnd)?;
                    Some(Node::Element(element))
                }
                Event::Text(text) => Some(Node::Text(bytes_to_string(text.into_inner())?)),
                Event::CData(data) => Some(Node::CData(bytes_to_string(data.into_inner())?)),
                Event::Comment(text) => Some(Node::Comment(bytes_to_string(text.into_inner())?)),
                Event::PI(text) => Some(Node::ProcessingInstruction(bytes_to_string(
                    text.into_inner(),
                )?)),
                Event::DocType(text) => Some(Node::DocType(bytes_to_string(text.into_inner())?)),
                Event::Decl(decl) => Some(Node::Declaration(std::str::from_utf8(&decl)?.to_string())),
                Event::Eof => break,
            };

            if let Some(node) = node {
                if let Some(parent) = stack.last_mut() {
                    parent.push(node);
                } else {
                    match node {
                        Node::Element(element) if root.is_none() => root = Some(element),
                        other if root.is_none() => prolog.push(other),
                        other => epilog.push(other),
                    }
                }
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(XmlError::UnclosedElement(stack.remove(0).name));
        }
        let root = root.ok_or(XmlError::NoRootElement)?;

        Ok(Self {
            prolog,
            root,
            epilog,
        })
    }

    /// Serialize the tree back to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, XmlError> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.prolog {
            write_node(node, &mut writer)?;
        }
        self.root.write_to(&mut writer)?;
        for node in &self.epilog {
            write_node(node, &mut writer)?;
        }
        Ok(writer.into_inner())
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }
}
