//! Arena-backed HTML document.
//!
//! Nodes live in a flat arena and are addressed by [`NodeId`]. Detaching a
//! node never invalidates its handle: the subtree stays in the arena and can
//! be re-inserted anywhere, which is what the engine relies on when it moves
//! nodes around.

use domsweep_core::{HostTree, NodeKind, VOID_ELEMENTS};

/// Elements whose text content is serialized verbatim
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// Serializer work item
enum Step<'a> {
    Open(NodeId),
    /// End tag of an element whose children are written
    Close(&'a str),
}

/// Handle to a node of a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Payload of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// Element with a lowercase tag name and attributes in document order
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    /// Text node
    Text(String),
}

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A mutable document tree.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    root: NodeId,
}

impl Document {
    /// Create an empty document whose root is a `body` element
    pub fn new() -> Self {
        Self::with_root("body")
    }

    /// Create an empty document rooted at an element named `tag`
    pub fn with_root(tag: &str) -> Self {
        let mut document = Self {
            slots: Vec::new(),
            root: NodeId(0),
        };
        document.root = document.create_element(tag);
        document
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes ever allocated, attached or not
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Payload of `node`
    pub fn data(&self, node: NodeId) -> &NodeData {
        &self.slot(node).data
    }

    /// Create a new detached element node
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element {
            name: tag.to_lowercase(),
            attributes: Vec::new(),
        })
    }

    /// Create a new detached element node with attributes
    pub fn element_with_attrs(&mut self, tag: &str, attrs: Vec<(&str, &str)>) -> NodeId {
        let node = self.create_element(tag);
        for (name, value) in attrs {
            self.set_attribute(node, name, value);
        }
        node
    }

    /// Create a new detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.alloc(NodeData::Text(content.to_string()))
    }

    /// Check if this is an element node
    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.slot(node).data, NodeData::Element { .. })
    }

    /// Check if this is a text node
    pub fn is_text(&self, node: NodeId) -> bool {
        matches!(self.slot(node).data, NodeData::Text(_))
    }

    /// Get the tag name (lowercase), `None` for text nodes
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.slot(node).data {
            NodeData::Element { name, .. } => Some(name),
            NodeData::Text(_) => None,
        }
    }

    /// Get an attribute value by name
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.slot(node).data {
            NodeData::Element { attributes, .. } => attributes
                .iter()
                .find(|(attr_name, _)| attr_name.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            NodeData::Text(_) => None,
        }
    }

    /// Check if an attribute exists
    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    /// Set an attribute, replacing an existing value. No-op on text nodes.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let NodeData::Element { attributes, .. } = &mut self.slot_mut(node).data {
            match attributes
                .iter_mut()
                .find(|(attr_name, _)| attr_name.eq_ignore_ascii_case(name))
            {
                Some((_, existing)) => *existing = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    /// Remove an attribute if present
    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let NodeData::Element { attributes, .. } = &mut self.slot_mut(node).data {
            attributes.retain(|(attr_name, _)| !attr_name.eq_ignore_ascii_case(name));
        }
    }

    /// Class tokens of the `class` attribute
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.attr(node, "class")
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Add a class token unless already present
    pub fn add_class(&mut self, node: NodeId, token: &str) {
        let mut tokens = self.classes(node);
        if !tokens.iter().any(|existing| existing == token) {
            tokens.push(token.to_string());
            self.set_attribute(node, "class", &tokens.join(" "));
        }
    }

    /// Remove a class token; the attribute itself stays, possibly empty
    pub fn remove_class_token(&mut self, node: NodeId, token: &str) {
        if !self.has_attr(node, "class") {
            return;
        }
        let tokens: Vec<String> = self
            .classes(node)
            .into_iter()
            .filter(|existing| existing != token)
            .collect();
        self.set_attribute(node, "class", &tokens.join(" "));
    }

    /// Text of a text node
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.slot(node).data {
            NodeData::Text(text) => Some(text),
            NodeData::Element { .. } => None,
        }
    }

    /// Replace the content of a text node. No-op on elements.
    pub fn set_text(&mut self, node: NodeId, content: &str) {
        if let NodeData::Text(text) = &mut self.slot_mut(node).data {
            *text = content.to_string();
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node).parent
    }

    /// Child nodes, in order
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.slot(node).children
    }

    /// Only element children
    pub fn element_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node)
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
    }

    /// Add a child node, moving it out of its current parent
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.remove(child);
        self.slot_mut(parent).children.push(child);
        self.slot_mut(child).parent = Some(parent);
    }

    /// Insert `child` before `reference`; appends if `reference` is not a child
    /// of `parent`
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.remove(child);
        let children = &self.slot(parent).children;
        let position = children
            .iter()
            .position(|existing| *existing == reference)
            .unwrap_or(children.len());
        self.slot_mut(parent).children.insert(position, child);
        self.slot_mut(child).parent = Some(parent);
    }

    /// Detach a node from its parent, keeping its subtree intact
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.slot_mut(node).parent.take() {
            self.slot_mut(parent).children.retain(|child| *child != node);
        }
    }

    /// Get all text content from this node and descendants
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        let mut pending = vec![node];
        while let Some(node) = pending.pop() {
            match &self.slot(node).data {
                NodeData::Text(text) => out.push_str(text),
                NodeData::Element { .. } => pending.extend(self.children(node).iter().rev()),
            }
        }
        out
    }

    /// Serialize a node and its subtree
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    /// Serialize the children of a node
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_node(*child, &mut out);
        }
        out
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        let mut pending = vec![Step::Open(node)];
        while let Some(step) = pending.pop() {
            let node = match step {
                Step::Open(node) => node,
                Step::Close(name) => {
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                    continue;
                }
            };

            match &self.slot(node).data {
                NodeData::Text(text) => {
                    let raw = self
                        .parent(node)
                        .and_then(|parent| self.tag_name(parent))
                        .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));
                    if raw {
                        out.push_str(text);
                    } else {
                        out.push_str(&escape_html_text(text));
                    }
                }
                NodeData::Element { name, attributes } => {
                    out.push('<');
                    out.push_str(name);
                    for (attr_name, value) in attributes {
                        out.push(' ');
                        out.push_str(attr_name);
                        if !value.is_empty() {
                            out.push_str("=\"");
                            out.push_str(&escape_html_attr(value));
                            out.push('"');
                        }
                    }
                    out.push('>');

                    let children = self.children(node);
                    if is_void_element(name) && children.is_empty() {
                        continue;
                    }
                    pending.push(Step::Close(name));
                    pending.extend(children.iter().rev().map(|child| Step::Open(*child)));
                }
            }
        }
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        self.slots.push(Slot {
            data,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.slots.len() - 1)
    }

    fn slot(&self, node: NodeId) -> &Slot {
        &self.slots[node.0]
    }

    fn slot_mut(&mut self, node: NodeId) -> &mut Slot {
        &mut self.slots[node.0]
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl HostTree for Document {
    type Id = NodeId;

    fn contains(&self, node: NodeId) -> bool {
        node.0 < self.slots.len()
    }

    fn kind(&self, node: NodeId) -> NodeKind {
        match self.slot(node).data {
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
        }
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        Document::tag_name(self, node).map(str::to_string)
    }

    fn text(&self, node: NodeId) -> Option<String> {
        Document::text(self, node).map(str::to_string)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Document::parent(self, node)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        Document::children(self, node).to_vec()
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        Document::create_element(self, tag)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.append(parent, child);
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        Document::insert_before(self, parent, child, reference);
    }

    fn detach(&mut self, node: NodeId) {
        self.remove(node);
    }

    fn attribute_names(&self, node: NodeId) -> Vec<String> {
        match &self.slot(node).data {
            NodeData::Element { attributes, .. } => {
                attributes.iter().map(|(name, _)| name.clone()).collect()
            }
            NodeData::Text(_) => Vec::new(),
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        self.remove_attr(node, name);
    }

    fn class_tokens(&self, node: NodeId) -> Vec<String> {
        self.classes(node)
    }

    fn remove_class(&mut self, node: NodeId, token: &str) {
        self.remove_class_token(node, token);
    }
}

fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Escape HTML text content
fn escape_html_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape HTML attribute value
fn escape_html_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
