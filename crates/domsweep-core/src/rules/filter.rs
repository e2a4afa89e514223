//! Filter callbacks and their results.

use indexmap::IndexMap;

use crate::side_table::SideTable;
use crate::tree::HostTree;

/// Type alias for filter callbacks
pub type FilterFn<T> = Box<
    dyn Fn(
        &mut T,
        <T as HostTree>::Id,
        &FilterContext<'_, <T as HostTree>::Id>,
        &mut SideTable<<T as HostTree>::Id>,
    ) -> FilterOutcome<<T as HostTree>::Id>,
>;

/// What a filter decided to do with the node it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome<Id> {
    /// Keep the node (possibly mutated in place) and run the next filter
    Keep,
    /// Put these nodes where the node was and process them from scratch.
    /// An empty list removes the node.
    Replace(Vec<Id>),
    /// Detach the node and its subtree
    Remove,
}

impl<Id> FilterOutcome<Id> {
    /// Replace with a single node.
    pub fn replace_with(node: Id) -> Self {
        FilterOutcome::Replace(vec![node])
    }
}

/// Where the filtered node sits in the tree.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a, Id> {
    /// Ancestors from the processing root down to the parent
    pub ancestors: &'a [Id],
    /// Uppercase tag names, in lock-step with `ancestors`
    pub ancestor_tags: &'a [String],
    /// 0-based index among the siblings
    pub index: usize,
}

impl<'a, Id: Copy> FilterContext<'a, Id> {
    pub fn parent(&self) -> Option<Id> {
        self.ancestors.last().copied()
    }

    pub fn parent_tag(&self) -> Option<&'a str> {
        self.ancestor_tags.last().map(String::as_str)
    }

    /// Whether any ancestor has this tag name (case-insensitive).
    pub fn has_ancestor(&self, tag: &str) -> bool {
        self.ancestor_tags
            .iter()
            .any(|ancestor| ancestor.eq_ignore_ascii_case(tag))
    }
}

/// A named node callback.
///
/// The name shows up in errors, most notably when a filter trips the
/// infinite-loop guard.
pub struct Filter<T: HostTree> {
    pub name: String,
    apply: FilterFn<T>,
}

impl<T: HostTree> Filter<T> {
    /// Create a new filter
    pub fn new<F>(name: &str, apply: F) -> Self
    where
        F: Fn(&mut T, T::Id, &FilterContext<'_, T::Id>, &mut SideTable<T::Id>) -> FilterOutcome<T::Id>
            + 'static,
    {
        Self {
            name: name.to_string(),
            apply: Box::new(apply),
        }
    }

    /// Create a filter that removes every node it sees
    pub fn remove(name: &str) -> Self {
        Self::new(name, |_, _, _, _| FilterOutcome::Remove)
    }

    /// Run the callback
    pub fn apply(
        &self,
        tree: &mut T,
        node: T::Id,
        context: &FilterContext<'_, T::Id>,
        side_table: &mut SideTable<T::Id>,
    ) -> FilterOutcome<T::Id> {
        (self.apply)(tree, node, context, side_table)
    }
}

impl<T: HostTree> std::fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter").field("name", &self.name).finish()
    }
}

/// Tag pattern → ordered filters.
pub struct FilterSpec<T: HostTree> {
    entries: IndexMap<String, Vec<Filter<T>>>,
}

impl<T: HostTree> FilterSpec<T> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Append a filter under `tag`, after any filter already registered there.
    pub fn add(&mut self, tag: &str, filter: Filter<T>) -> &mut Self {
        self.entries.entry(tag.to_string()).or_default().push(filter);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Filter<T>>)> {
        self.entries.iter()
    }
}

impl<T: HostTree> Default for FilterSpec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HostTree> std::fmt::Debug for FilterSpec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}
