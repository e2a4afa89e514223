//! Rule matching and compilation.
//!
//! Raw [`ProcessingOptions`] are compiled once per invocation into
//! [`CompiledRules`]; the engine only ever consults the compiled form.

mod filter;

pub use filter::{Filter, FilterContext, FilterFn, FilterOutcome, FilterSpec};

use std::collections::HashSet;

use regex::Regex;

use crate::options::{ProcessingOptions, TagSpec};
use crate::tree::HostTree;
use crate::{Error, Result};

/// Compile a user pattern into a case-insensitive, whole-string regex.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("(?i)^(?:{})$", pattern)).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Compiled tag pattern → values mapping.
///
/// Every key whose regex matches a tag contributes its values; the values of
/// all matching keys are unioned, in key order.
#[derive(Debug, Clone)]
pub struct RuleSet<V> {
    entries: Vec<(Regex, Vec<V>)>,
}

impl<V> RuleSet<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, key: Regex, values: Vec<V>) {
        self.entries.push((key, values));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All values of the keys matching `tag`.
    pub fn collect<'s>(&'s self, tag: &'s str) -> impl Iterator<Item = &'s V> + 's {
        self.entries
            .iter()
            .filter(move |(key, _)| key.is_match(tag))
            .flat_map(|(_, values)| values.iter())
    }
}

impl<V> Default for RuleSet<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleSet<Regex> {
    /// Compile a raw spec.
    pub fn compile(spec: &TagSpec) -> Result<Self> {
        let mut rules = Self::new();
        for (key, value) in spec {
            let values = value
                .patterns()
                .iter()
                .map(|pattern| compile_pattern(pattern))
                .collect::<Result<Vec<_>>>()?;
            rules.push(compile_pattern(key)?, values);
        }
        Ok(rules)
    }

    /// Whether `value` is matched by any value pattern of the keys matching `tag`.
    pub fn matches(&self, tag: &str, value: &str) -> bool {
        self.collect(tag).any(|pattern| pattern.is_match(value))
    }

    /// [`RuleSet::matches`] against any of `tags`.
    pub fn matches_any(&self, tags: &[String], value: &str) -> bool {
        tags.iter().any(|tag| self.matches(tag, value))
    }
}

/// A tag rule pair: one spec consulted against the parent only, one against
/// every ancestor.
#[derive(Debug, Clone, Default)]
pub struct TagRule {
    pub direct: RuleSet<Regex>,
    pub deep: RuleSet<Regex>,
}

impl TagRule {
    pub fn compile(direct: &TagSpec, deep: &TagSpec) -> Result<Self> {
        Ok(Self {
            direct: RuleSet::compile(direct)?,
            deep: RuleSet::compile(deep)?,
        })
    }

    /// `ancestor_tags` runs from the processing root down to the parent.
    pub fn matches(&self, ancestor_tags: &[String], tag: &str) -> bool {
        let direct = ancestor_tags
            .last()
            .is_some_and(|parent| self.direct.matches(parent, tag));
        direct || self.deep.matches_any(ancestor_tags, tag)
    }
}

/// Everything the engine consults, compiled.
pub struct CompiledRules<'o, T: HostTree> {
    pub filters: RuleSet<&'o Filter<T>>,
    pub remove: TagRule,
    pub flatten: TagRule,
    pub allow: TagRule,
    pub allow_attributes: RuleSet<Regex>,
    pub allow_classes: RuleSet<Regex>,
    pub remove_empty: bool,
    /// Uppercase
    pub allowed_empty_tags: HashSet<String>,
    /// Uppercase
    pub join_siblings: HashSet<String>,
}

impl<'o, T: HostTree> CompiledRules<'o, T> {
    /// Compile all options. Fails on the first invalid pattern.
    pub fn compile(options: &'o ProcessingOptions<T>) -> Result<Self> {
        let mut filters = RuleSet::new();
        for (key, list) in options.filters_by_tag.iter() {
            filters.push(compile_pattern(key)?, list.iter().collect());
        }

        Ok(Self {
            filters,
            remove: TagRule::compile(&options.remove_tags_direct, &options.remove_tags_deep)?,
            flatten: TagRule::compile(&options.flatten_tags_direct, &options.flatten_tags_deep)?,
            allow: TagRule::compile(&options.allow_tags_direct, &options.allow_tags_deep)?,
            allow_attributes: RuleSet::compile(&options.allow_attributes_by_tag)?,
            allow_classes: RuleSet::compile(&options.allow_classes_by_tag)?,
            remove_empty: options.remove_empty,
            allowed_empty_tags: uppercase_set(&options.allowed_empty_tags),
            join_siblings: uppercase_set(&options.join_siblings),
        })
    }

    /// Filters applying to `tag`, in registration order.
    pub fn filters_for(&self, tag: &str) -> Vec<&'o Filter<T>> {
        self.filters.collect(tag).copied().collect()
    }

    pub fn should_remove(&self, ancestor_tags: &[String], tag: &str) -> bool {
        self.remove.matches(ancestor_tags, tag)
    }

    pub fn should_flatten(&self, ancestor_tags: &[String], tag: &str) -> bool {
        self.flatten.matches(ancestor_tags, tag)
    }

    pub fn should_allow(&self, ancestor_tags: &[String], tag: &str) -> bool {
        self.allow.matches(ancestor_tags, tag)
    }

    pub fn allows_empty(&self, tag: &str) -> bool {
        self.allowed_empty_tags.contains(&tag.to_uppercase())
    }

    pub fn joins(&self, tag: &str) -> bool {
        self.join_siblings.contains(&tag.to_uppercase())
    }
}

fn uppercase_set(tags: &[String]) -> HashSet<String> {
    tags.iter().map(|tag| tag.to_uppercase()).collect()
}
