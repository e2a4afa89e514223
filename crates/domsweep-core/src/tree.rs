//! Host tree abstraction.
//!
//! The engine never owns the tree it walks. Any document model can be processed
//! as long as it exposes the handful of primitives below: element vs. text
//! distinction, ordered children, attributes and class tokens.

use std::fmt::Debug;
use std::hash::Hash;

/// Pseudo tag name used when matching text nodes against rules.
pub const TEXT_TAG: &str = "TEXT";

/// The two node variants the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Element node with a tag name, attributes and children
    Element,
    /// Character data, never has children
    Text,
}

/// Minimal mutable tree capability set consumed by the engine.
///
/// Handles are plain values: keeping one around never keeps the node alive,
/// and a handle to a node that no longer exists must make [`HostTree::contains`]
/// return `false`.
pub trait HostTree {
    /// Opaque node handle
    type Id: Copy + Eq + Hash + Debug;

    /// Whether `node` refers to a live node of this tree.
    fn contains(&self, node: Self::Id) -> bool;

    /// Element or text.
    fn kind(&self, node: Self::Id) -> NodeKind;

    /// Tag name for elements, `None` for text nodes.
    fn tag_name(&self, node: Self::Id) -> Option<String>;

    /// Character content for text nodes, `None` for elements.
    fn text(&self, node: Self::Id) -> Option<String>;

    /// Current parent, if attached.
    fn parent(&self, node: Self::Id) -> Option<Self::Id>;

    /// Snapshot of the current children, in order.
    fn children(&self, node: Self::Id) -> Vec<Self::Id>;

    /// Create a new detached element.
    fn create_element(&mut self, tag: &str) -> Self::Id;

    /// Append `child` as the last child of `parent`, detaching it first.
    fn append_child(&mut self, parent: Self::Id, child: Self::Id);

    /// Insert `child` into `parent` right before `reference`, detaching it first.
    fn insert_before(&mut self, parent: Self::Id, child: Self::Id, reference: Self::Id);

    /// Remove `node` from its parent. The subtree stays intact but unattached.
    fn detach(&mut self, node: Self::Id);

    /// Attribute names in document order.
    fn attribute_names(&self, node: Self::Id) -> Vec<String>;

    fn remove_attribute(&mut self, node: Self::Id, name: &str);

    /// Class tokens in document order.
    fn class_tokens(&self, node: Self::Id) -> Vec<String>;

    fn remove_class(&mut self, node: Self::Id, token: &str);

    /// Tag name used for rule matching: uppercase tag for elements, `TEXT` for
    /// text nodes.
    fn match_name(&self, node: Self::Id) -> String {
        match self.kind(node) {
            NodeKind::Text => TEXT_TAG.to_string(),
            NodeKind::Element => self
                .tag_name(node)
                .map(|tag| tag.to_uppercase())
                .unwrap_or_default(),
        }
    }

    fn is_element(&self, node: Self::Id) -> bool {
        self.kind(node) == NodeKind::Element
    }

    fn is_text(&self, node: Self::Id) -> bool {
        self.kind(node) == NodeKind::Text
    }

    /// Whether this is a text node containing only whitespace.
    fn is_whitespace_text(&self, node: Self::Id) -> bool {
        self.is_text(node)
            && self
                .text(node)
                .map(|text| text.trim().is_empty())
                .unwrap_or(false)
    }
}
