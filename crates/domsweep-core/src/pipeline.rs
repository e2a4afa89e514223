//! Filter pipeline - runs the filters matching a node, in order.

use tracing::{debug, trace};

use crate::engine::{Engine, Task};
use crate::rules::{Filter, FilterContext, FilterOutcome};
use crate::tree::HostTree;
use crate::{Error, Result};

/// Whether the node survived its filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Filtered {
    /// Still in place; the remaining rules apply
    Kept,
    /// Removed or replaced; nothing more to do with the original node
    Replaced,
}

impl<'a, T: HostTree> Engine<'a, T> {
    pub(crate) fn run_filters(&mut self, node: T::Id, tag: &str, index: usize) -> Result<Filtered> {
        // Consumed on every visit, whether or not a filter matches.
        if self.side_table.take_skip_filters(node) {
            trace!(%tag, "skip_filters set, not filtering");
            return Ok(Filtered::Kept);
        }

        let filters = self.rules.filters_for(tag);
        for filter in filters {
            let context = FilterContext {
                ancestors: self.ancestors.nodes(),
                ancestor_tags: self.ancestors.tags(),
                index,
            };
            let outcome = filter.apply(&mut *self.tree, node, &context, &mut *self.side_table);

            match outcome {
                FilterOutcome::Replace(replacements) if replacements == [node] => {
                    if self.side_table.take_skip_filters(node) {
                        break;
                    }
                }
                FilterOutcome::Keep => {
                    // The filter may have asked to stop filtering its own node.
                    if self.side_table.take_skip_filters(node) {
                        break;
                    }
                }
                FilterOutcome::Remove => {
                    debug!(filter = %filter.name, %tag, "filter removed node");
                    self.tree.detach(node);
                    return Ok(Filtered::Replaced);
                }
                FilterOutcome::Replace(replacements) => {
                    self.replace(node, tag, index, filter, replacements)?;
                    return Ok(Filtered::Replaced);
                }
            }
        }

        Ok(Filtered::Kept)
    }

    /// Put `replacements` where `node` is and queue each of them as a new node.
    fn replace(
        &mut self,
        node: T::Id,
        tag: &str,
        index: usize,
        filter: &Filter<T>,
        replacements: Vec<T::Id>,
    ) -> Result<()> {
        // Same-tag replacements would hit the very same filters again.
        for &replacement in &replacements {
            if self.tree.match_name(replacement) == tag
                && !self.side_table.declares_skip_filters(replacement)
            {
                return Err(Error::InfiniteLoop {
                    filter: filter.name.clone(),
                    tag: tag.to_string(),
                });
            }
        }

        debug!(
            filter = %filter.name,
            %tag,
            count = replacements.len(),
            "filter replaced node"
        );

        match self.tree.parent(node) {
            Some(parent) => {
                for &replacement in replacements.iter().filter(|r| **r != node) {
                    self.tree.insert_before(parent, replacement, node);
                }
                match replacements.iter().position(|r| *r == node) {
                    // The node stays, but must sit between its neighbours in the list.
                    Some(position) => {
                        if let Some(&next) = replacements.get(position + 1) {
                            self.tree.insert_before(parent, node, next);
                        }
                    }
                    None => self.tree.detach(node),
                }
            }
            None => {
                trace!(%tag, "replaced node has no parent, replacements stay detached");
            }
        }

        // Reversed so the first replacement is visited first.
        for (offset, replacement) in replacements.into_iter().enumerate().rev() {
            let parent = self.tree.parent(replacement);
            self.tasks.push(Task::Visit {
                node: replacement,
                index: index + offset,
                parent,
            });
        }
        Ok(())
    }
}
