//! The wire document model: self-describing trees of elements.
//!
//! Every record on the wire is one document: a tree with a single root
//! [`Element`]. An element has a tag name (which message it is), an
//! ordered set of string attributes (the message's fields), and an
//! ordered sequence of child nodes (nested elements or text).
//!
//! Think of it as the decoded form of one line on the wire. The message
//! taxonomy reads and writes these trees; the connection layer only ever
//! looks at the root tag and the correlation attributes.

use serde::{Deserialize, Serialize};

use crate::WireError;

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// One element in a wire document: tag + attributes + children.
///
/// Attributes are stored as an ordered list of `(name, value)` pairs
/// rather than a map. This keeps the on-the-wire order stable (a map
/// would reorder keys) while [`Element::set_attribute`] preserves the
/// invariant that names are unique: setting an existing name replaces
/// its value instead of appending a duplicate.
///
/// Elements are built either with the `with_*` builder methods:
///
/// ```rust
/// use tradewind_wire::Element;
///
/// let doc = Element::new("spySettlement")
///     .with_attribute("unit", "U-1")
///     .with_attribute("direction", "N");
/// assert_eq!(doc.attribute("unit"), Some("U-1"));
/// ```
///
/// or incrementally with `set_attribute`/`push_child` when the shape is
/// only known at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    tag: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attributes: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
}

impl Element {
    /// Creates an element with the given tag and no attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Returns the tag name identifying this element's message variant.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Sets an attribute, replacing any existing value for the same name.
    pub fn set_attribute(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Builder form of [`set_attribute`](Self::set_attribute).
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Looks up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over `(name, value)` attribute pairs in wire order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Appends a child element.
    pub fn push_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Builder form of [`push_child`](Self::push_child).
    pub fn with_child(mut self, child: Element) -> Self {
        self.push_child(child);
        self
    }

    /// Appends a text node.
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    /// Builder form of [`push_text`](Self::push_text).
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.push_text(text);
        self
    }

    /// Returns the child nodes in wire order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns the first child that is an element, if any.
    ///
    /// Correlation envelopes carry their wrapped message as the first
    /// element child, so this is the envelope-unwrapping primitive.
    pub fn first_child_element(&self) -> Option<&Element> {
        self.children.iter().find_map(Node::as_element)
    }

    /// Consumes the element and returns its first element child.
    pub fn into_first_child_element(self) -> Option<Element> {
        self.children.into_iter().find_map(Node::into_element)
    }

    /// Checks the document invariants: every tag non-empty and every
    /// element's attribute names unique, recursively.
    ///
    /// Locally built elements hold these by construction; this exists for
    /// decoded input, where the bytes may claim anything.
    pub fn check_well_formed(&self) -> Result<(), WireError> {
        if self.tag.is_empty() {
            return Err(WireError::Malformed("empty tag name".into()));
        }
        for (i, (name, _)) in self.attributes.iter().enumerate() {
            if self.attributes[..i].iter().any(|(n, _)| n == name) {
                return Err(WireError::Malformed(format!(
                    "duplicate attribute {name:?} on <{}>",
                    self.tag
                )));
            }
        }
        for child in &self.children {
            if let Node::Element(el) = child {
                el.check_well_formed()?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A child of an [`Element`]: either a nested element or a run of text.
///
/// `#[serde(rename_all = "snake_case")]` keeps the externally tagged JSON
/// lowercase, so a nested element serializes as `{"element": {...}}` and
/// text as `{"text": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// A nested element.
    Element(Element),
    /// A text run.
    Text(String),
}

impl Node {
    /// Returns the element inside this node, if it is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    /// Consumes the node and returns the element inside, if it is one.
    pub fn into_element(self) -> Option<Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    /// Returns the text inside this node, if it is a text run.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Element(_) => None,
            Node::Text(text) => Some(text),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
