//! Configuration options for a processing run.
//!
//! Rule values accept a single pattern or a list of patterns; both shapes are
//! normalized into [`OneOrMany`] and compiled once per invocation by
//! [`crate::rules::CompiledRules`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::rules::{Filter, FilterSpec};
use crate::tree::HostTree;
use crate::Result;

/// Void (self-closing) HTML elements. Used as the default set of tags exempt
/// from empty-node removal.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

/// One pattern or a list of patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// The patterns as a slice, regardless of shape.
    pub fn patterns(&self) -> &[String] {
        match self {
            OneOrMany::One(pattern) => std::slice::from_ref(pattern),
            OneOrMany::Many(patterns) => patterns,
        }
    }

    fn extend(&mut self, other: OneOrMany) {
        let mut patterns = std::mem::replace(self, OneOrMany::Many(Vec::new()))
            .into_patterns();
        patterns.extend(other.into_patterns());
        *self = OneOrMany::Many(patterns);
    }

    fn into_patterns(self) -> Vec<String> {
        match self {
            OneOrMany::One(pattern) => vec![pattern],
            OneOrMany::Many(patterns) => patterns,
        }
    }
}

impl From<&str> for OneOrMany {
    fn from(pattern: &str) -> Self {
        OneOrMany::One(pattern.to_string())
    }
}

impl From<String> for OneOrMany {
    fn from(pattern: String) -> Self {
        OneOrMany::One(pattern)
    }
}

impl From<Vec<String>> for OneOrMany {
    fn from(patterns: Vec<String>) -> Self {
        OneOrMany::Many(patterns)
    }
}

impl From<Vec<&str>> for OneOrMany {
    fn from(patterns: Vec<&str>) -> Self {
        OneOrMany::Many(patterns.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for OneOrMany {
    fn from(patterns: [&str; N]) -> Self {
        OneOrMany::Many(patterns.iter().map(|p| p.to_string()).collect())
    }
}

/// Tag pattern → value patterns. Key order is preserved.
pub type TagSpec = IndexMap<String, OneOrMany>;

/// Full configuration of a processing run.
///
/// Everything except `filters_by_tag` can be loaded from JSON with
/// [`ProcessingOptions::from_json`].
#[derive(Deserialize)]
#[serde(default, deny_unknown_fields, bound(deserialize = ""))]
pub struct ProcessingOptions<T: HostTree> {
    /// Callbacks keyed by the pattern of the tag they run on
    #[serde(skip)]
    pub filters_by_tag: FilterSpec<T>,

    /// Parent tag pattern → tags removed when directly under it
    pub remove_tags_direct: TagSpec,

    /// Ancestor tag pattern → tags removed anywhere below it
    pub remove_tags_deep: TagSpec,

    /// Parent tag pattern → tags flattened when directly under it
    pub flatten_tags_direct: TagSpec,

    /// Ancestor tag pattern → tags flattened anywhere below it
    pub flatten_tags_deep: TagSpec,

    /// Parent tag pattern → tags kept when directly under it
    pub allow_tags_direct: TagSpec,

    /// Ancestor tag pattern → tags kept anywhere below it
    pub allow_tags_deep: TagSpec,

    /// Tag pattern → attribute names kept on it (`class` excluded)
    pub allow_attributes_by_tag: TagSpec,

    /// Tag pattern → class tokens kept on it
    pub allow_classes_by_tag: TagSpec,

    /// Remove elements left without children
    pub remove_empty: bool,

    /// Tags never removed for being empty
    pub allowed_empty_tags: Vec<String>,

    /// Tags whose adjacent siblings get merged
    pub join_siblings: Vec<String>,
}

impl<T: HostTree> Default for ProcessingOptions<T> {
    fn default() -> Self {
        Self {
            filters_by_tag: FilterSpec::default(),
            remove_tags_direct: TagSpec::new(),
            remove_tags_deep: TagSpec::new(),
            flatten_tags_direct: TagSpec::new(),
            flatten_tags_deep: TagSpec::new(),
            allow_tags_direct: TagSpec::new(),
            allow_tags_deep: TagSpec::new(),
            allow_attributes_by_tag: TagSpec::new(),
            allow_classes_by_tag: TagSpec::new(),
            remove_empty: false,
            allowed_empty_tags: VOID_ELEMENTS.iter().map(|t| t.to_uppercase()).collect(),
            join_siblings: Vec::new(),
        }
    }
}

impl<T: HostTree> std::fmt::Debug for ProcessingOptions<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessingOptions")
            .field("filters_by_tag", &self.filters_by_tag)
            .field("remove_tags_direct", &self.remove_tags_direct)
            .field("remove_tags_deep", &self.remove_tags_deep)
            .field("flatten_tags_direct", &self.flatten_tags_direct)
            .field("flatten_tags_deep", &self.flatten_tags_deep)
            .field("allow_tags_direct", &self.allow_tags_direct)
            .field("allow_tags_deep", &self.allow_tags_deep)
            .field("allow_attributes_by_tag", &self.allow_attributes_by_tag)
            .field("allow_classes_by_tag", &self.allow_classes_by_tag)
            .field("remove_empty", &self.remove_empty)
            .field("allowed_empty_tags", &self.allowed_empty_tags)
            .field("join_siblings", &self.join_siblings)
            .finish()
    }
}

impl<T: HostTree> ProcessingOptions<T> {
    /// Empty options: every element is flattened.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from JSON. Filters cannot be expressed in JSON and start empty.
    ///
    /// ```rust
    /// # use domsweep_core::{ProcessingOptions, tree::HostTree};
    /// # fn load<T: HostTree>() -> domsweep_core::Result<ProcessingOptions<T>> {
    /// ProcessingOptions::from_json(r#"{"allow_tags_deep": {".*": ["p", "b"]}, "remove_empty": true}"#)
    /// # }
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Register a filter for tags matching `tag`.
    pub fn filter(mut self, tag: &str, filter: Filter<T>) -> Self {
        self.filters_by_tag.add(tag, filter);
        self
    }

    pub fn remove_direct(mut self, parent: &str, tags: impl Into<OneOrMany>) -> Self {
        add_to_spec(&mut self.remove_tags_direct, parent, tags.into());
        self
    }

    pub fn remove_deep(mut self, ancestor: &str, tags: impl Into<OneOrMany>) -> Self {
        add_to_spec(&mut self.remove_tags_deep, ancestor, tags.into());
        self
    }

    pub fn flatten_direct(mut self, parent: &str, tags: impl Into<OneOrMany>) -> Self {
        add_to_spec(&mut self.flatten_tags_direct, parent, tags.into());
        self
    }

    pub fn flatten_deep(mut self, ancestor: &str, tags: impl Into<OneOrMany>) -> Self {
        add_to_spec(&mut self.flatten_tags_deep, ancestor, tags.into());
        self
    }

    pub fn allow_direct(mut self, parent: &str, tags: impl Into<OneOrMany>) -> Self {
        add_to_spec(&mut self.allow_tags_direct, parent, tags.into());
        self
    }

    pub fn allow_deep(mut self, ancestor: &str, tags: impl Into<OneOrMany>) -> Self {
        add_to_spec(&mut self.allow_tags_deep, ancestor, tags.into());
        self
    }

    pub fn allow_attributes(mut self, tag: &str, attributes: impl Into<OneOrMany>) -> Self {
        add_to_spec(&mut self.allow_attributes_by_tag, tag, attributes.into());
        self
    }

    pub fn allow_classes(mut self, tag: &str, classes: impl Into<OneOrMany>) -> Self {
        add_to_spec(&mut self.allow_classes_by_tag, tag, classes.into());
        self
    }

    pub fn remove_empty(mut self, remove: bool) -> Self {
        self.remove_empty = remove;
        self
    }

    /// Replace the set of tags exempt from empty-node removal.
    pub fn allowed_empty_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_empty_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn join_siblings<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.join_siblings = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Add patterns under `key`, extending an existing entry.
fn add_to_spec(spec: &mut TagSpec, key: &str, value: OneOrMany) {
    match spec.get_mut(key) {
        Some(existing) => existing.extend(value),
        None => {
            spec.insert(key.to_string(), value);
        }
    }
}
