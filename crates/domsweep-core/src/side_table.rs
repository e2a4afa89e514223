//! Identity-keyed transient flags.
//!
//! Flags live next to the tree instead of on the nodes. Every flag is a
//! one-shot signal: the engine clears it the moment it acts on it.

use std::collections::HashMap;
use std::hash::Hash;

/// Per-node transient flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFlags {
    /// Leave the node and its subtree untouched
    pub skip: bool,
    /// `None` when undeclared. Same-tag filter replacements must declare it.
    pub skip_filters: Option<bool>,
    /// Keep all class tokens
    pub skip_classes: bool,
    /// Keep all attributes
    pub skip_attributes: bool,
}

impl NodeFlags {
    fn is_empty(&self) -> bool {
        *self == NodeFlags::default()
    }
}

/// Side table of [`NodeFlags`] keyed by node handle.
#[derive(Debug, Clone)]
pub struct SideTable<Id> {
    entries: HashMap<Id, NodeFlags>,
}

impl<Id: Copy + Eq + Hash> SideTable<Id> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Current flags of `node` without consuming them.
    pub fn flags(&self, node: Id) -> NodeFlags {
        self.entries.get(&node).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Leave `node` and its subtree exactly as they are on the next visit.
    pub fn set_skip(&mut self, node: Id) -> &mut Self {
        self.update(node, |flags| flags.skip = true);
        self
    }

    /// Declare whether filters run on `node` on its next visit.
    pub fn set_skip_filters(&mut self, node: Id, skip: bool) -> &mut Self {
        self.update(node, |flags| flags.skip_filters = Some(skip));
        self
    }

    pub fn set_skip_classes(&mut self, node: Id) -> &mut Self {
        self.update(node, |flags| flags.skip_classes = true);
        self
    }

    pub fn set_skip_attributes(&mut self, node: Id) -> &mut Self {
        self.update(node, |flags| flags.skip_attributes = true);
        self
    }

    /// Whether `skip_filters` has been declared, either way.
    pub fn declares_skip_filters(&self, node: Id) -> bool {
        self.flags(node).skip_filters.is_some()
    }

    /// Read and clear `skip`.
    pub fn take_skip(&mut self, node: Id) -> bool {
        self.take(node, |flags| std::mem::take(&mut flags.skip))
    }

    /// Read and clear `skip_filters`. An explicit `false` reads as `false`.
    pub fn take_skip_filters(&mut self, node: Id) -> bool {
        self.take(node, |flags| flags.skip_filters.take().unwrap_or(false))
    }

    pub fn take_skip_classes(&mut self, node: Id) -> bool {
        self.take(node, |flags| std::mem::take(&mut flags.skip_classes))
    }

    pub fn take_skip_attributes(&mut self, node: Id) -> bool {
        self.take(node, |flags| std::mem::take(&mut flags.skip_attributes))
    }

    /// Drop every flag of `node`.
    pub fn clear(&mut self, node: Id) {
        self.entries.remove(&node);
    }

    fn update(&mut self, node: Id, apply: impl FnOnce(&mut NodeFlags)) {
        apply(self.entries.entry(node).or_default());
    }

    fn take(&mut self, node: Id, read: impl FnOnce(&mut NodeFlags) -> bool) -> bool {
        let Some(flags) = self.entries.get_mut(&node) else {
            return false;
        };
        let value = read(flags);
        if flags.is_empty() {
            self.entries.remove(&node);
        }
        value
    }
}

impl<Id: Copy + Eq + Hash> Default for SideTable<Id> {
    fn default() -> Self {
        Self::new()
    }
}
