//! Parse XAML-style markup into an attributed node tree using quick-xml.
//!
//! The tree is stored in an arena ([`MarkupDocument`]) and navigated through
//! borrowed [`MarkupNode`] handles, which gives every node a cheap link back
//! to its parent.

use std::fmt;
use std::io::Read;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use tracing::trace;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const XMLNS: &str = "xmlns";

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("xml: {0}")]
    Xml(String),
    #[error("invalid document: {0}")]
    Invalid(String),
    #[error("encoding: {0}")]
    Encoding(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Element or attribute name split into its optional prefix and local part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub prefix: Option<String>,
    pub local: String,
}

impl QualifiedName {
    /// Split `prefix:Local` at the first colon.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((prefix, local)) => QualifiedName {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
            },
            None => QualifiedName {
                prefix: None,
                local: raw.to_string(),
            },
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn local(&self) -> &str {
        &self.local
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{prefix}:{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QualifiedName,
    pub value: String,
}

impl Attribute {
    /// `xmlns="…"` or `xmlns:p="…"`.
    pub fn is_namespace_declaration(&self) -> bool {
        match self.name.prefix() {
            Some(prefix) => prefix == XMLNS,
            None => self.name.local == XMLNS,
        }
    }

    /// Prefix introduced by a namespace declaration; the default namespace
    /// declares the empty prefix.
    pub fn declared_prefix(&self) -> Option<&str> {
        if !self.is_namespace_declaration() {
            return None;
        }
        match self.name.prefix() {
            Some(_) => Some(self.name.local()),
            None => Some(""),
        }
    }
}

/// Index of a node inside its [`MarkupDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct NodeData {
    name: QualifiedName,
    attributes: Vec<Attribute>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    text: String,
}

/// Parsed markup document. Immutable once built.
#[derive(Debug)]
pub struct MarkupDocument {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl MarkupDocument {
    /// Parse a complete document from text.
    pub fn parse(xml: &str) -> Result<Self, MarkupError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);
        let mut buf = Vec::new();
        let mut nodes: Vec<NodeData> = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut root: Option<NodeId> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let id = push_node(&mut nodes, &e, stack.last().copied(), &mut root)?;
                    stack.push(id);
                }
                Ok(Event::Empty(e)) => {
                    push_node(&mut nodes, &e, stack.last().copied(), &mut root)?;
                }
                Ok(Event::End(_)) => {
                    stack.pop();
                }
                Ok(Event::Text(e)) => {
                    let text = e.unescape().map_err(|err| MarkupError::Xml(err.to_string()))?;
                    append_text(&mut nodes, stack.last().copied(), &text)?;
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8(e.into_inner().into_owned())
                        .map_err(|err| MarkupError::Encoding(err.to_string()))?;
                    append_text(&mut nodes, stack.last().copied(), &text)?;
                }
                Ok(Event::Eof) => break,
                Err(err) => return Err(MarkupError::Xml(err.to_string())),
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(MarkupError::Invalid(format!(
                "element <{}> is never closed",
                nodes[open.0].name
            )));
        }
        let root = root.ok_or_else(|| MarkupError::Invalid("document has no root element".into()))?;
        trace!(nodes = nodes.len(), "parsed markup document");
        Ok(MarkupDocument { nodes, root })
    }

    /// Read the whole stream as UTF-8 text and parse it.
    pub fn load<R: Read>(reader: R) -> Result<Self, MarkupError> {
        let text = read_text(reader)?;
        Self::parse(&text)
    }

    pub fn root(&self) -> MarkupNode<'_> {
        self.node(self.root)
    }

    pub fn node(&self, id: NodeId) -> MarkupNode<'_> {
        MarkupNode { doc: self, id }
    }

    /// Number of element nodes in the document.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Read a byte stream fully as UTF-8 text, dropping a leading byte order mark.
pub fn read_text<R: Read>(mut reader: R) -> Result<String, MarkupError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
    String::from_utf8(body.to_vec()).map_err(|err| MarkupError::Encoding(format!("invalid UTF-8: {err}")))
}

fn push_node(
    nodes: &mut Vec<NodeData>,
    event: &BytesStart<'_>,
    parent: Option<NodeId>,
    root: &mut Option<NodeId>,
) -> Result<NodeId, MarkupError> {
    let name = QualifiedName::parse(&String::from_utf8_lossy(event.name().as_ref()));
    let attributes = read_attributes(event)?;
    let id = NodeId(nodes.len());
    match parent {
        Some(parent) => nodes[parent.0].children.push(id),
        None if root.is_none() => *root = Some(id),
        None => {
            return Err(MarkupError::Invalid(format!(
                "second root element <{name}>"
            )))
        }
    }
    nodes.push(NodeData {
        name,
        attributes,
        children: Vec::new(),
        parent,
        text: String::new(),
    });
    Ok(id)
}

fn read_attributes(event: &BytesStart<'_>) -> Result<Vec<Attribute>, MarkupError> {
    let mut attributes = Vec::new();
    let mut iter = event.attributes();
    // Repeated attributes are kept; the reader applies them in order.
    iter.with_checks(false);
    for attr in iter {
        let attr = attr.map_err(|err| MarkupError::Xml(err.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|err| MarkupError::Xml(err.to_string()))?;
        attributes.push(Attribute {
            name: QualifiedName::parse(&String::from_utf8_lossy(attr.key.as_ref())),
            value: value.into_owned(),
        });
    }
    Ok(attributes)
}

fn append_text(nodes: &mut [NodeData], target: Option<NodeId>, text: &str) -> Result<(), MarkupError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    match target {
        Some(id) => {
            let node = &mut nodes[id.0];
            if !node.text.is_empty() {
                node.text.push(' ');
            }
            node.text.push_str(trimmed);
            Ok(())
        }
        None => Err(MarkupError::Invalid(format!(
            "text outside the root element: '{trimmed}'"
        ))),
    }
}

/// Borrowed handle to one element of a [`MarkupDocument`].
#[derive(Clone, Copy)]
pub struct MarkupNode<'a> {
    doc: &'a MarkupDocument,
    id: NodeId,
}

impl<'a> MarkupNode<'a> {
    fn data(&self) -> &'a NodeData {
        &self.doc.nodes[self.id.0]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &'a QualifiedName {
        &self.data().name
    }

    pub fn local_name(&self) -> &'a str {
        self.data().name.local()
    }

    pub fn prefix(&self) -> Option<&'a str> {
        self.data().name.prefix()
    }

    /// Attributes in document order, namespace declarations included.
    pub fn attributes(&self) -> &'a [Attribute] {
        &self.data().attributes
    }

    /// Value of the last unprefixed attribute with the given local name.
    pub fn attribute(&self, local: &str) -> Option<&'a str> {
        self.data()
            .attributes
            .iter()
            .rev()
            .find(|attr| attr.name.prefix.is_none() && attr.name.local == local)
            .map(|attr| attr.value.as_str())
    }

    pub fn children(&self) -> impl Iterator<Item = MarkupNode<'a>> + 'a {
        let doc = self.doc;
        self.data()
            .children
            .iter()
            .map(move |&id| MarkupNode { doc, id })
    }

    pub fn has_children(&self) -> bool {
        !self.data().children.is_empty()
    }

    pub fn parent(&self) -> Option<MarkupNode<'a>> {
        self.data().parent.map(|id| MarkupNode { doc: self.doc, id })
    }

    /// Non-whitespace text content, trimmed; `None` when the element only
    /// holds whitespace between its children.
    pub fn text(&self) -> Option<&'a str> {
        let text = self.data().text.as_str();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl fmt::Debug for MarkupNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkupNode")
            .field("id", &self.id)
            .field("name", self.name())
            .field("attributes", &self.attributes().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <Window xmlns="http://schemas.microsoft.com/winfx/2006/xaml/presentation"
                xmlns:x="http://schemas.microsoft.com/winfx/2006/xaml"
                Title="Main &amp; only">
            <Window.Resources>
                <SolidColorBrush x:Key="accent" Color="Red" />
            </Window.Resources>
            <TextBlock>
                Hello
            </TextBlock>
        </Window>
    "#;

    #[test]
    fn parse_tree_shape() {
        let doc = MarkupDocument::parse(FIXTURE).expect("parse fixture");
        assert_eq!(doc.len(), 4);
        let root = doc.root();
        assert_eq!(root.local_name(), "Window");
        assert!(root.parent().is_none());
        assert_eq!(root.attribute("Title"), Some("Main & only"));

        let children: Vec<_> = root.children().collect();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].local_name(), "Window.Resources");
        assert_eq!(children[1].text(), Some("Hello"));
        assert!(root.text().is_none(), "whitespace between elements is dropped");

        let brush = children[0].children().next().expect("brush node");
        assert_eq!(brush.parent().map(|p| p.id()), Some(children[0].id()));
        let key = &brush.attributes()[0];
        assert_eq!(key.name.prefix(), Some("x"));
        assert_eq!(key.name.local(), "Key");
        assert!(!key.is_namespace_declaration());
    }

    #[test]
    fn namespace_declarations_are_flagged() {
        let doc = MarkupDocument::parse(FIXTURE).expect("parse fixture");
        let declared: Vec<_> = doc
            .root()
            .attributes()
            .iter()
            .filter_map(Attribute::declared_prefix)
            .collect();
        assert_eq!(declared, vec!["", "x"]);
    }

    #[test]
    fn repeated_attributes_are_preserved_in_order() {
        let doc = MarkupDocument::parse(r#"<Button Width="1" Width="2"/>"#).expect("parse");
        let values: Vec<_> = doc.root().attributes().iter().map(|a| a.value.as_str()).collect();
        assert_eq!(values, vec!["1", "2"]);
        assert_eq!(doc.root().attribute("Width"), Some("2"));
    }

    #[test]
    fn load_strips_byte_order_mark() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"<Root><![CDATA[a < b]]></Root>");
        let doc = MarkupDocument::load(bytes.as_slice()).expect("load");
        assert_eq!(doc.root().text(), Some("a < b"));
    }

    #[test]
    fn malformed_documents_are_rejected() {
        let err = MarkupDocument::parse("<Root><Child></Root>").unwrap_err();
        assert!(matches!(err, MarkupError::Xml(_)), "unexpected error {err:?}");

        let err = MarkupDocument::parse("   ").unwrap_err();
        assert!(matches!(err, MarkupError::Invalid(_)));

        let err = MarkupDocument::parse("<A/><B/>").unwrap_err();
        assert!(matches!(err, MarkupError::Invalid(_)));

        let err = read_text(&[0xFF, 0xFE, 0x00][..]).unwrap_err();
        assert!(matches!(err, MarkupError::Encoding(_)));
    }
}
